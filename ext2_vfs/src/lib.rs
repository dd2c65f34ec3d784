//! 该模块是ext2文件系统VFS边界的主入口，定义了对外暴露的接口和核心组件。

// 禁用标准库，适用于嵌入式或内核环境
#![cfg_attr(not(test), no_std)]

// 引入内存分配库
extern crate alloc;

// 引入日志宏
#[macro_use]
extern crate log;

// 块设备抽象模块
mod blockdev;
// 错误处理模块
mod error;
// 文件系统挂载与全局锁
mod fs;
// 文件节点相关模块
mod inode;
// 工具函数模块
mod util;

// 对外暴露块设备相关类型
pub use blockdev::{BlockDevice, MemDevice, EXT2_DEV_BSIZE};
// 对外暴露错误处理类型
pub use error::{Ext2Error, Ext2Result};
// 对外暴露文件系统相关类型和方法
pub use fs::*;
// 对外暴露节点相关类型
pub use inode::*;
