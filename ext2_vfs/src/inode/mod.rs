//! 该模块实现文件节点的核心逻辑，包括节点类型和由inode到节点的转换。

// 节点属性子模块
mod attr;
// 目录节点操作子模块
mod dir;
// 文件节点操作子模块
mod file;

use alloc::string::String;
use core::{marker::PhantomData, time::Duration};

pub use attr::{mode_to_mask, FileAttr};
pub use dir::DirEntry;

use ext2_core::{FileType, Inode};

use crate::{fs::SharedFs, util::decode_time, BlockDevice, Ext2Result, SystemHal};

/// inode类型枚举，对应不同的文件系统对象类型
#[repr(u8)]
#[derive(PartialEq, Default, Eq, Clone, Copy, Debug)]
pub enum InodeType {
    #[default]
    Unknown = 0,         // 未知类型
    Fifo = 1,            // 命名管道
    CharacterDevice = 2, // 字符设备
    Directory = 4,       // 目录
    BlockDevice = 6,     // 块设备
    RegularFile = 8,     // 普通文件
    Symlink = 10,        // 符号链接
    Socket = 12,         // 套接字
}

/// 从u8值（mode 的高 4 位）转换为InodeType
impl From<u8> for InodeType {
    fn from(value: u8) -> Self {
        match value {
            1 => InodeType::Fifo,
            2 => InodeType::CharacterDevice,
            4 => InodeType::Directory,
            6 => InodeType::BlockDevice,
            8 => InodeType::RegularFile,
            10 => InodeType::Symlink,
            12 => InodeType::Socket,
            _ => InodeType::Unknown, // 未知类型默认值
        }
    }
}

impl From<FileType> for InodeType {
    fn from(ty: FileType) -> Self {
        ((ty.mode_bits() >> 12) as u8).into()
    }
}

/// 文件系统节点
///
/// 由 inode 和名字转换而来的通用节点表示；所有节点共享同一个
/// 文件系统锁，操作期间持有该锁。
pub struct FsNode<Hal: SystemHal, Dev: BlockDevice> {
    pub name: String,
    pub kind: InodeType,
    pub ino: u32,
    pub length: u64,
    /// POSIX 权限位（含 suid/sgid/sticky）
    pub mask: u32,
    pub uid: u32,
    pub gid: u32,
    pub nlink: u32,
    pub atime: Duration,
    pub mtime: Duration,
    pub ctime: Duration,
    pub(crate) fs: SharedFs<Dev>,
    _phantom: PhantomData<Hal>,
}

impl<Hal: SystemHal, Dev: BlockDevice> FsNode<Hal, Dev> {
    /// 由inode构造节点
    pub(crate) fn from_inode(fs: SharedFs<Dev>, name: &str, inode: &Inode) -> Self {
        let mut node = Self {
            name: String::from(name),
            kind: InodeType::Unknown,
            ino: inode.inode_num(),
            length: 0,
            mask: 0,
            uid: 0,
            gid: 0,
            nlink: 0,
            atime: Duration::ZERO,
            mtime: Duration::ZERO,
            ctime: Duration::ZERO,
            fs,
            _phantom: PhantomData,
        };
        node.apply(inode);
        node
    }

    /// 加载指定inode编号的节点
    pub(crate) fn load(fs: SharedFs<Dev>, ino: u32, name: &str) -> Ext2Result<Self> {
        let inode = fs.lock().read_inode(ino)?;
        Ok(Self::from_inode(fs, name, &inode))
    }

    /// 用inode内容刷新节点字段
    fn apply(&mut self, inode: &Inode) {
        self.kind = inode.file_type().into();
        self.length = inode.file_size();
        self.mask = mode_to_mask(inode.permissions());
        self.uid = inode.uid() as u32;
        self.gid = inode.gid() as u32;
        self.nlink = inode.links_count() as u32;
        self.atime = decode_time(inode.atime());
        self.mtime = decode_time(inode.mtime());
        self.ctime = decode_time(inode.ctime());
    }

    /// 重新读取inode，刷新节点字段
    pub fn refresh(&mut self) -> Ext2Result<()> {
        let inode = self.fs.lock().read_inode(self.ino)?;
        self.apply(&inode);
        Ok(())
    }

    /// 检查节点是否为目录
    pub fn is_dir(&self) -> bool {
        self.kind == InodeType::Directory
    }
}

/// 克隆节点（共享同一个文件系统）
impl<Hal: SystemHal, Dev: BlockDevice> Clone for FsNode<Hal, Dev> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            kind: self.kind,
            ino: self.ino,
            length: self.length,
            mask: self.mask,
            uid: self.uid,
            gid: self.gid,
            nlink: self.nlink,
            atime: self.atime,
            mtime: self.mtime,
            ctime: self.ctime,
            fs: self.fs.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<Hal: SystemHal, Dev: BlockDevice> core::fmt::Debug for FsNode<Hal, Dev> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FsNode")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("ino", &self.ino)
            .field("length", &self.length)
            .field("mask", &format_args!("{:#o}", self.mask))
            .finish()
    }
}
