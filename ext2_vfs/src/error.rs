//! 错误处理模块，定义了VFS边界上的错误类型和辅助方法。

use core::{
    error::Error,
    fmt::{Debug, Display},
};

/// ext2操作的结果类型（成功或错误）
pub type Ext2Result<T = ()> = Result<T, Ext2Error>;

/// ext2错误类型，包含错误码和上下文信息
#[derive(Clone, PartialEq, Eq)]
pub struct Ext2Error {
    pub code: i32,                     // 正的 POSIX 错误码
    pub context: Option<&'static str>, // 错误上下文（可选）
}

impl Ext2Error {
    /// 创建新的Ext2Error
    pub fn new(code: i32, context: impl Into<Option<&'static str>>) -> Self {
        Ext2Error {
            code,
            context: context.into(),
        }
    }

    /// 系统调用返回的负错误码
    pub fn as_negative(&self) -> i32 {
        -self.code
    }
}

/// 从错误码转换为Ext2Error
impl From<i32> for Ext2Error {
    fn from(code: i32) -> Self {
        Ext2Error::new(code, None)
    }
}

/// 从 ext2_core 的错误转换，错误类别映射为 errno
impl From<ext2_core::Error> for Ext2Error {
    fn from(err: ext2_core::Error) -> Self {
        Ext2Error::new(err.errno(), err.message())
    }
}

/// 实现Display trait，用于格式化错误信息
impl Display for Ext2Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if let Some(context) = self.context {
            write!(f, "ext2 error {}: {context}", self.code)
        } else {
            write!(f, "ext2 error {}", self.code)
        }
    }
}

/// 实现Debug trait，复用Display的实现
impl Debug for Ext2Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Error for Ext2Error {}

/// 为结果类型添加上下文的 trait
pub(crate) trait Context<T> {
    /// 为错误添加上下文信息
    fn context(self, context: &'static str) -> Result<T, Ext2Error>;
}

/// 为 ext2_core 的结果实现Context trait（错误码保留，上下文替换为调用点）
impl<T> Context<T> for ext2_core::Result<T> {
    fn context(self, context: &'static str) -> Result<T, Ext2Error> {
        self.map_err(|e| Ext2Error::new(e.errno(), Some(context)))
    }
}

/// 为Ext2Result实现Context trait（嵌套错误时添加上下文）
impl<T> Context<T> for Ext2Result<T> {
    fn context(self, context: &'static str) -> Result<T, Ext2Error> {
        self.map_err(|e| Ext2Error::new(e.code, Some(context)))
    }
}
