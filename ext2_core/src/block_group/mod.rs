//! 块组描述符模块
//!
//! 挂载时把整张描述符表读入内存（[`BgdTable`]），分配/释放只修改内存副本，
//! 随后由调用者整体写回。

mod read;
mod write;

pub use read::*;

use alloc::vec::Vec;

use crate::error::{Error, ErrorKind, Result};
use crate::types::ext2_group_desc;

/// BlockGroup 包装器，提供高级操作
#[derive(Debug, Clone)]
pub struct BlockGroup {
    pub(super) inner: ext2_group_desc,
    pub(super) group_num: u32,
}

impl BlockGroup {
    pub fn new(group_num: u32, inner: ext2_group_desc) -> Self {
        Self { inner, group_num }
    }

    /// 获取块组编号
    pub fn group_num(&self) -> u32 {
        self.group_num
    }

    /// 获取内部块组描述符结构的引用
    pub fn inner(&self) -> &ext2_group_desc {
        &self.inner
    }

    /// 块位图所在块
    pub fn block_bitmap(&self) -> u64 {
        self.inner.block_bitmap as u64
    }

    /// inode 位图所在块
    pub fn inode_bitmap(&self) -> u64 {
        self.inner.inode_bitmap as u64
    }

    /// inode 表起始块
    pub fn inode_table(&self) -> u64 {
        self.inner.inode_table as u64
    }

    pub fn free_blocks_count(&self) -> u32 {
        self.inner.free_blocks_count as u32
    }

    pub fn free_inodes_count(&self) -> u32 {
        self.inner.free_inodes_count as u32
    }

    pub fn used_dirs_count(&self) -> u32 {
        self.inner.used_dirs_count as u32
    }

    pub fn dec_free_blocks(&mut self) {
        self.inner.free_blocks_count = self.inner.free_blocks_count.saturating_sub(1);
    }

    pub fn inc_free_blocks(&mut self) {
        self.inner.free_blocks_count = self.inner.free_blocks_count.saturating_add(1);
    }

    pub fn dec_free_inodes(&mut self) {
        self.inner.free_inodes_count = self.inner.free_inodes_count.saturating_sub(1);
    }

    pub fn inc_free_inodes(&mut self) {
        self.inner.free_inodes_count = self.inner.free_inodes_count.saturating_add(1);
    }

    pub fn inc_used_dirs(&mut self) {
        self.inner.used_dirs_count = self.inner.used_dirs_count.saturating_add(1);
    }

    pub fn dec_used_dirs(&mut self) {
        self.inner.used_dirs_count = self.inner.used_dirs_count.saturating_sub(1);
    }
}

/// 内存中的块组描述符表
#[derive(Debug, Clone)]
pub struct BgdTable {
    /// 表的起始块号
    start_block: u64,
    /// 表占用的块数
    blocks: u32,
    groups: Vec<BlockGroup>,
}

impl BgdTable {
    /// 以已有描述符构造
    pub fn new(start_block: u64, blocks: u32, descs: Vec<ext2_group_desc>) -> Self {
        let groups = descs
            .into_iter()
            .enumerate()
            .map(|(i, desc)| BlockGroup::new(i as u32, desc))
            .collect();
        Self { start_block, blocks, groups }
    }

    /// 块组数量
    pub fn len(&self) -> u32 {
        self.groups.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn start_block(&self) -> u64 {
        self.start_block
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockGroup> {
        self.groups.iter()
    }

    /// 获取块组
    pub fn group(&self, group_num: u32) -> Result<&BlockGroup> {
        self.groups
            .get(group_num as usize)
            .ok_or(Error::new(ErrorKind::Corrupted, "Block group number out of range"))
    }

    /// 获取可变块组
    pub fn group_mut(&mut self, group_num: u32) -> Result<&mut BlockGroup> {
        self.groups
            .get_mut(group_num as usize)
            .ok_or(Error::new(ErrorKind::Corrupted, "Block group number out of range"))
    }
}
