//! 错误处理模块

use core::fmt;

use crate::consts::*;

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 块读写失败或长度不足
    Io,
    /// 所有块组都没有空闲块/inode
    NoSpace,
    /// 磁盘上的元数据不一致
    Corrupted,
    /// 非法参数（inode 0、非法路径分量等）
    InvalidInput,
    /// 目录中不存在该名字
    NotFound,
    NotDirectory,
    IsDirectory,
    AlreadyExists,
    NotEmpty,
    NameTooLong,
    /// 逻辑块号超出二级间接块的寻址范围
    FileTooLarge,
    ReadOnly,
}

impl ErrorKind {
    /// 对应的 POSIX errno（正数）
    pub fn errno(self) -> i32 {
        match self {
            ErrorKind::Io | ErrorKind::Corrupted => EIO,
            ErrorKind::NoSpace => ENOSPC,
            ErrorKind::InvalidInput => EINVAL,
            ErrorKind::NotFound => ENOENT,
            ErrorKind::NotDirectory => ENOTDIR,
            ErrorKind::IsDirectory => EISDIR,
            ErrorKind::AlreadyExists => EEXIST,
            ErrorKind::NotEmpty => ENOTEMPTY,
            ErrorKind::NameTooLong => ENAMETOOLONG,
            ErrorKind::FileTooLarge => EFBIG,
            ErrorKind::ReadOnly => EROFS,
        }
    }
}

/// ext2 错误类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    message: Option<&'static str>,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<Option<&'static str>>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn from_kind(kind: ErrorKind) -> Self {
        Self { kind, message: None }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&'static str> {
        self.message
    }

    /// 对应的 POSIX errno（正数）
    pub fn errno(&self) -> i32 {
        self.kind.errno()
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::from_kind(kind)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(msg) = self.message {
            write!(f, "Ext2Error({:?}, errno={}, msg={})", self.kind, self.errno(), msg)
        } else {
            write!(f, "Ext2Error({:?}, errno={})", self.kind, self.errno())
        }
    }
}

impl core::error::Error for Error {}

/// ext2 Result 类型
pub type Result<T> = core::result::Result<T, Error>;
