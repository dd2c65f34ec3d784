//! Inode 模块
//!
//! inode 编号从 1 开始：所在块组为 `(n-1) / inodes_per_group`，
//! 组内下标为 `(n-1) % inodes_per_group`，在 inode 表中的字节偏移为 `下标 * inode_size`。

mod mode;
mod read;
mod write;

pub use mode::{FileType, InodeMode};
pub use read::*;
pub use write::*;

use alloc::vec;

use crate::consts::*;
use crate::types::ext2_inode;

/// 新建 inode 的属性
#[derive(Debug, Clone, Copy)]
pub struct InodeAttrs {
    pub perm: InodeMode,
    pub uid: u16,
    pub gid: u16,
    /// 创建时间（秒），用于 atime/ctime/mtime
    pub time: u32,
}

impl InodeAttrs {
    pub fn new(perm: InodeMode) -> Self {
        Self {
            perm,
            uid: 0,
            gid: 0,
            time: 0,
        }
    }
}

/// Inode 包装器，提供高级操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inode {
    inner: ext2_inode,
    inode_num: u32,
}

impl Inode {
    pub fn new(inode_num: u32, inner: ext2_inode) -> Self {
        Self { inner, inode_num }
    }

    /// 构造一个新分配的 inode（尚未写盘）
    ///
    /// `inode_size` 超出 128 字节的部分填 0。
    pub fn create(inode_num: u32, inode_size: u16, ftype: FileType, attrs: &InodeAttrs) -> Self {
        let extra_len = (inode_size as usize).saturating_sub(EXT2_GOOD_OLD_INODE_SIZE as usize);
        let inner = ext2_inode {
            mode: ftype.mode_bits() | attrs.perm.bits(),
            uid: attrs.uid,
            gid: attrs.gid,
            atime: attrs.time,
            ctime: attrs.time,
            mtime: attrs.time,
            links_count: 1,
            extra: vec![0u8; extra_len],
            ..Default::default()
        };
        Self { inner, inode_num }
    }

    /// 获取 inode 编号
    pub fn inode_num(&self) -> u32 {
        self.inode_num
    }

    /// 获取内部 inode 结构的引用
    pub fn inner(&self) -> &ext2_inode {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut ext2_inode {
        &mut self.inner
    }

    /// 获取文件模式（类型 + 权限）
    pub fn mode(&self) -> u16 {
        self.inner.mode
    }

    pub fn file_type(&self) -> FileType {
        FileType::from_mode(self.inner.mode)
    }

    pub fn permissions(&self) -> InodeMode {
        InodeMode::from_mode(self.inner.mode)
    }

    /// 只修改权限位，保留类型
    pub fn set_permissions(&mut self, perm: InodeMode) {
        self.inner.mode = (self.inner.mode & EXT2_INODE_MODE_TYPE_MASK) | perm.bits();
    }

    /// 检查是否是目录
    pub fn is_dir(&self) -> bool {
        self.file_type() == FileType::Directory
    }

    /// 检查是否是普通文件
    pub fn is_file(&self) -> bool {
        self.file_type() == FileType::RegularFile
    }

    /// 获取文件大小
    ///
    /// 普通文件的高 32 位保存在 `size_hi`；目录只使用低 32 位。
    pub fn file_size(&self) -> u64 {
        if self.is_file() {
            self.inner.size_lo as u64 | ((self.inner.size_hi as u64) << 32)
        } else {
            self.inner.size_lo as u64
        }
    }

    pub fn set_file_size(&mut self, size: u64) {
        self.inner.size_lo = size as u32;
        if self.is_file() {
            self.inner.size_hi = (size >> 32) as u32;
        }
    }

    /// 获取链接计数
    pub fn links_count(&self) -> u16 {
        self.inner.links_count
    }

    pub fn set_links_count(&mut self, count: u16) {
        self.inner.links_count = count;
    }

    pub fn inc_links(&mut self) {
        self.inner.links_count = self.inner.links_count.saturating_add(1);
    }

    pub fn dec_links(&mut self) {
        self.inner.links_count = self.inner.links_count.saturating_sub(1);
    }

    /// 获取占用的扇区数（512 字节为单位）
    pub fn sectors(&self) -> u32 {
        self.inner.blocks
    }

    /// 记录新占用了一个文件系统块
    pub fn add_block(&mut self, block_size: u32) {
        self.inner.blocks = self.inner.blocks.saturating_add(block_size / EXT2_INODE_BLOCK_SECTOR);
    }

    /// 记录释放了一个文件系统块
    pub fn sub_block(&mut self, block_size: u32) {
        self.inner.blocks = self.inner.blocks.saturating_sub(block_size / EXT2_INODE_BLOCK_SECTOR);
    }

    /// 读取块指针数组中的第 `index` 项（0 表示未分配）
    pub fn block_ptr(&self, index: usize) -> u32 {
        self.inner.block[index]
    }

    pub fn set_block_ptr(&mut self, index: usize, block: u32) {
        self.inner.block[index] = block;
    }

    pub fn uid(&self) -> u16 {
        self.inner.uid
    }

    pub fn gid(&self) -> u16 {
        self.inner.gid
    }

    pub fn set_owner(&mut self, uid: u16, gid: u16) {
        self.inner.uid = uid;
        self.inner.gid = gid;
    }

    pub fn atime(&self) -> u32 {
        self.inner.atime
    }

    pub fn ctime(&self) -> u32 {
        self.inner.ctime
    }

    pub fn mtime(&self) -> u32 {
        self.inner.mtime
    }

    pub fn dtime(&self) -> u32 {
        self.inner.dtime
    }

    pub fn set_atime(&mut self, time: u32) {
        self.inner.atime = time;
    }

    pub fn set_ctime(&mut self, time: u32) {
        self.inner.ctime = time;
    }

    pub fn set_mtime(&mut self, time: u32) {
        self.inner.mtime = time;
    }

    pub fn set_dtime(&mut self, time: u32) {
        self.inner.dtime = time;
    }

    pub fn generation(&self) -> u32 {
        self.inner.generation
    }
}
