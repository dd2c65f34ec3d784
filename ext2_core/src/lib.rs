//! ext2_core: Pure Rust implementation of the ext2 allocation and addressing engine
//!
//! 本 crate 实现 ext2 磁盘格式上的块组簿记、位图块/inode 分配、
//! 多级间接块寻址和变长目录项管理，并在其上提供文件读写与名字空间操作。

#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

// 公共模块
pub mod consts;
pub mod error;
pub mod types;
pub mod bitmap;
pub mod block;
pub mod superblock;
pub mod block_group;
pub mod inode;
pub mod balloc;
pub mod ialloc;
pub mod indirect;
pub mod dir;
pub mod fs;
pub mod mkfs;

// 重新导出常用类型
pub use consts::*;
pub use error::{Error, ErrorKind, Result};

// 重新导出核心API
pub use block::{Block, BlockDev, BlockDevice, MemDevice};
pub use superblock::Superblock;
pub use block_group::{BgdTable, BlockGroup};
pub use inode::{FileType, Inode, InodeAttrs, InodeMode};
pub use dir::DirEntry;
pub use fs::{Ext2FileSystem, FsConfig, FsStat};
pub use mkfs::FormatOptions;
