//! Inode 模式位
//!
//! `mode` 的高 4 位为文件类型，低 12 位为权限（含 suid/sgid/sticky）。

use bitflags::bitflags;

use crate::consts::*;

bitflags! {
    /// 权限位，数值与 POSIX 一致
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InodeMode: u16 {
        const S_IXOTH = 0o0001;
        const S_IWOTH = 0o0002;
        const S_IROTH = 0o0004;
        const S_IXGRP = 0o0010;
        const S_IWGRP = 0o0020;
        const S_IRGRP = 0o0040;
        const S_IXUSR = 0o0100;
        const S_IWUSR = 0o0200;
        const S_IRUSR = 0o0400;
        const S_ISVTX = 0o1000;
        const S_ISGID = 0o2000;
        const S_ISUID = 0o4000;
    }
}

impl InodeMode {
    /// 从完整的 mode 中取出权限部分，忽略类型位
    pub fn from_mode(mode: u16) -> Self {
        Self::from_bits_truncate(mode & EXT2_INODE_MODE_PERM_MASK)
    }
}

/// 文件类型（`mode & 0xF000`）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    Fifo,
    CharDevice,
    Directory,
    BlockDevice,
    RegularFile,
    Symlink,
    Socket,
    Unknown,
}

impl FileType {
    pub fn from_mode(mode: u16) -> Self {
        match mode & EXT2_INODE_MODE_TYPE_MASK {
            EXT2_INODE_MODE_FIFO => FileType::Fifo,
            EXT2_INODE_MODE_CHARDEV => FileType::CharDevice,
            EXT2_INODE_MODE_DIRECTORY => FileType::Directory,
            EXT2_INODE_MODE_BLOCKDEV => FileType::BlockDevice,
            EXT2_INODE_MODE_FILE => FileType::RegularFile,
            EXT2_INODE_MODE_SOFTLINK => FileType::Symlink,
            EXT2_INODE_MODE_SOCKET => FileType::Socket,
            _ => FileType::Unknown,
        }
    }

    /// 对应的 mode 类型位
    pub fn mode_bits(self) -> u16 {
        match self {
            FileType::Fifo => EXT2_INODE_MODE_FIFO,
            FileType::CharDevice => EXT2_INODE_MODE_CHARDEV,
            FileType::Directory => EXT2_INODE_MODE_DIRECTORY,
            FileType::BlockDevice => EXT2_INODE_MODE_BLOCKDEV,
            FileType::RegularFile => EXT2_INODE_MODE_FILE,
            FileType::Symlink => EXT2_INODE_MODE_SOFTLINK,
            FileType::Socket => EXT2_INODE_MODE_SOCKET,
            FileType::Unknown => 0,
        }
    }

    /// 目录项中的类型字段
    pub fn dir_entry_type(self) -> u8 {
        match self {
            FileType::Fifo => EXT2_DE_FIFO,
            FileType::CharDevice => EXT2_DE_CHRDEV,
            FileType::Directory => EXT2_DE_DIR,
            FileType::BlockDevice => EXT2_DE_BLKDEV,
            FileType::RegularFile => EXT2_DE_REG_FILE,
            FileType::Symlink => EXT2_DE_SYMLINK,
            FileType::Socket => EXT2_DE_SOCK,
            FileType::Unknown => EXT2_DE_UNKNOWN,
        }
    }

    /// 由目录项类型字段还原
    pub fn from_dir_entry_type(de_type: u8) -> Self {
        match de_type {
            EXT2_DE_FIFO => FileType::Fifo,
            EXT2_DE_CHRDEV => FileType::CharDevice,
            EXT2_DE_DIR => FileType::Directory,
            EXT2_DE_BLKDEV => FileType::BlockDevice,
            EXT2_DE_REG_FILE => FileType::RegularFile,
            EXT2_DE_SYMLINK => FileType::Symlink,
            EXT2_DE_SOCK => FileType::Socket,
            _ => FileType::Unknown,
        }
    }
}
