//! Superblock 操作模块
//!
//! 这个模块提供 ext2 superblock 的读取、验证和计数器维护。
//! 计数器的每次修改都要由调用者紧接着调用 [`Superblock::write`] 写回字节 1024 处。

mod read;
mod write;

pub use read::*;
pub use write::*;

use crate::consts::*;
use crate::types::ext2_sblock;

/// Superblock 包装器，提供高级操作
#[derive(Debug, Clone)]
pub struct Superblock {
    inner: ext2_sblock,
}

impl Superblock {
    /// 以已解码的结构构造（不做校验）
    pub fn new(inner: ext2_sblock) -> Self {
        Self { inner }
    }

    /// 获取内部 superblock 结构的引用
    pub fn inner(&self) -> &ext2_sblock {
        &self.inner
    }

    /// 获取块大小（`1024 << log_block_size`）
    pub fn block_size(&self) -> u32 {
        EXT2_MIN_BLOCK_SIZE << self.inner.log_block_size
    }

    /// 是否带扩展字段（rev_level >= 1）
    pub fn is_dynamic_rev(&self) -> bool {
        self.inner.rev_level >= EXT2_DYNAMIC_REV
    }

    /// 获取 inode 大小
    ///
    /// 原始版本固定为 128；动态版本取扩展字段中的值。
    pub fn inode_size(&self) -> u16 {
        if self.is_dynamic_rev() && self.inner.inode_size != 0 {
            self.inner.inode_size
        } else {
            EXT2_GOOD_OLD_INODE_SIZE
        }
    }

    pub fn blocks_count(&self) -> u32 {
        self.inner.blocks_count
    }

    pub fn free_blocks_count(&self) -> u32 {
        self.inner.free_blocks_count
    }

    pub fn inodes_count(&self) -> u32 {
        self.inner.inodes_count
    }

    pub fn free_inodes_count(&self) -> u32 {
        self.inner.free_inodes_count
    }

    pub fn blocks_per_group(&self) -> u32 {
        self.inner.blocks_per_group
    }

    pub fn inodes_per_group(&self) -> u32 {
        self.inner.inodes_per_group
    }

    pub fn first_data_block(&self) -> u32 {
        self.inner.first_data_block
    }

    /// 获取块组数量（`ceil(blocks_count / blocks_per_group)`）
    pub fn block_group_count(&self) -> u32 {
        self.inner.blocks_count.div_ceil(self.inner.blocks_per_group)
    }

    /// 第 `group` 组实际包含的块数（最后一组可能不满）
    pub fn blocks_in_group(&self, group: u32) -> u32 {
        let base = self.group_first_block(group);
        self.inner
            .blocks_count
            .saturating_sub(base)
            .min(self.inner.blocks_per_group)
    }

    /// 第 `group` 组的第一个块号
    pub fn group_first_block(&self, group: u32) -> u32 {
        self.inner.first_data_block + group * self.inner.blocks_per_group
    }

    /// 块组描述符表的起始块
    ///
    /// 块大小为 1024 时 superblock 占据块 1，描述符表从块 2 开始；否则从块 1 开始。
    pub fn group_desc_table_block(&self) -> u64 {
        if self.block_size() > EXT2_MIN_BLOCK_SIZE { 1 } else { 2 }
    }

    /// 块组描述符表占用的块数
    pub fn group_desc_table_blocks(&self) -> u32 {
        let bytes = self.block_group_count() as usize * EXT2_GROUP_DESC_SIZE;
        bytes.div_ceil(self.block_size() as usize) as u32
    }

    /// 每个间接块容纳的块指针数
    pub fn ptrs_per_block(&self) -> u32 {
        self.block_size() / 4
    }

    /// 检查是否支持某个不兼容特性
    pub fn has_incompat_feature(&self, feature: u32) -> bool {
        self.is_dynamic_rev() && (self.inner.feature_incompat & feature) != 0
    }

    /// 目录项是否携带类型字段
    pub fn has_filetype(&self) -> bool {
        self.has_incompat_feature(EXT2_FEATURE_INCOMPAT_FILETYPE)
    }

    /// 获取卷名称（UTF-8 字符串）
    pub fn volume_name(&self) -> Option<&str> {
        let raw = &self.inner.volume_name;
        let len = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        core::str::from_utf8(&raw[..len]).ok()
    }

    pub fn mount_count(&self) -> u16 {
        self.inner.mnt_count
    }

    pub fn state(&self) -> u16 {
        self.inner.state
    }

    /// 上次卸载时是否干净
    pub fn is_clean(&self) -> bool {
        self.inner.state & EXT2_VALID_FS != 0 && self.inner.state & EXT2_ERROR_FS == 0
    }
}
