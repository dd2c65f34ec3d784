//! 该模块实现节点属性（元数据）的读取，如权限、大小、时间戳等。

use core::time::Duration;

use ext2_core::InodeMode;

use crate::{util::decode_time, BlockDevice, Ext2Result, SystemHal};

use super::{FsNode, InodeType};

/// 文件系统节点的元数据（属性）
#[derive(Clone, Debug, Default)]
pub struct FileAttr {
    /// 包含文件的设备ID
    pub device: u64,
    /// inode编号
    pub ino: u32,
    /// 硬链接数量
    pub nlink: u64,
    /// 权限模式（如0o644）
    pub mode: u32,
    /// 节点类型（文件/目录/链接等）
    pub node_type: InodeType,
    /// 所有者用户ID
    pub uid: u32,
    /// 所有者组ID
    pub gid: u32,
    /// 文件大小（字节）
    pub size: u64,
    /// 文件系统I/O块大小
    pub block_size: u64,
    /// 分配的512B块数量
    pub blocks: u64,

    /// 最后访问时间
    pub atime: Duration,
    /// 最后修改时间
    pub mtime: Duration,
    /// 最后状态修改时间
    pub ctime: Duration,
}

/// ext2 权限位与 POSIX 权限位的对应表
const MODE_BITS: [(InodeMode, u32); 12] = [
    (InodeMode::S_ISUID, 0o4000),
    (InodeMode::S_ISGID, 0o2000),
    (InodeMode::S_ISVTX, 0o1000),
    (InodeMode::S_IRUSR, 0o0400),
    (InodeMode::S_IWUSR, 0o0200),
    (InodeMode::S_IXUSR, 0o0100),
    (InodeMode::S_IRGRP, 0o0040),
    (InodeMode::S_IWGRP, 0o0020),
    (InodeMode::S_IXGRP, 0o0010),
    (InodeMode::S_IROTH, 0o0004),
    (InodeMode::S_IWOTH, 0o0002),
    (InodeMode::S_IXOTH, 0o0001),
];

/// 将ext2权限位逐位转换为POSIX权限掩码
pub fn mode_to_mask(perm: InodeMode) -> u32 {
    MODE_BITS
        .iter()
        .filter(|(bit, _)| perm.contains(*bit))
        .fold(0, |mask, (_, posix)| mask | posix)
}

/// 将POSIX权限掩码转换为ext2权限位（忽略类型位）
pub(crate) fn mask_to_mode(mask: u32) -> InodeMode {
    MODE_BITS
        .iter()
        .filter(|(_, posix)| mask & posix != 0)
        .fold(InodeMode::empty(), |mode, (bit, _)| mode | *bit)
}

impl<Hal: SystemHal, Dev: BlockDevice> FsNode<Hal, Dev> {
    /// 读取节点的属性
    pub fn attr(&self) -> Ext2Result<FileAttr> {
        let mut fs = self.fs.lock();
        let inode = fs.read_inode(self.ino)?;
        let block_size = fs.superblock().block_size();

        Ok(FileAttr {
            device: 0, // 未实现设备ID
            ino: self.ino,
            nlink: inode.links_count() as u64,
            mode: mode_to_mask(inode.permissions()),
            node_type: inode.file_type().into(),
            uid: inode.uid() as u32,
            gid: inode.gid() as u32,
            size: inode.file_size(),
            block_size: block_size as u64,
            blocks: inode.sectors() as u64,
            atime: decode_time(inode.atime()),
            mtime: decode_time(inode.mtime()),
            ctime: decode_time(inode.ctime()),
        })
    }
}
