//! 文件系统句柄与高层操作
//!
//! [`Ext2FileSystem`] 在挂载时创建，持有块设备、superblock 和块组描述符表，
//! 所有操作都显式通过它进行；卸载时写回元数据并交还设备。

mod file;
mod filesystem;
mod namei;

pub use filesystem::{Ext2FileSystem, FsConfig, FsStat};
