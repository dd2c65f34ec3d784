//! 块组描述符表读取

use alloc::vec;
use alloc::vec::Vec;
use log::debug;

use super::BgdTable;
use crate::{
    block::{BlockDev, BlockDevice},
    consts::*,
    error::Result,
    superblock::Superblock,
    types::ext2_group_desc,
};

impl BgdTable {
    /// 从块设备加载整张块组描述符表
    ///
    /// # 参数
    ///
    /// * `bdev` - 块设备引用
    /// * `sb` - superblock 引用
    ///
    /// 表从 [`Superblock::group_desc_table_block`] 开始，占用
    /// `ceil(count * 32 / block_size)` 个块。
    pub fn load<D: BlockDevice>(bdev: &mut BlockDev<D>, sb: &Superblock) -> Result<Self> {
        let count = sb.block_group_count() as usize;
        let start = sb.group_desc_table_block();
        let blocks = sb.group_desc_table_blocks();
        let block_size = sb.block_size() as usize;

        let mut raw = vec![0u8; blocks as usize * block_size];
        for (i, chunk) in raw.chunks_exact_mut(block_size).enumerate() {
            bdev.read_block(start + i as u64, chunk)?;
        }

        let descs: Vec<ext2_group_desc> = raw
            .chunks_exact(EXT2_GROUP_DESC_SIZE)
            .take(count)
            .map(ext2_group_desc::from_bytes)
            .collect();

        for (i, desc) in descs.iter().enumerate() {
            debug!(
                "ext2 group {}: block bitmap {}, inode bitmap {}, inode table {}, free blocks {}, free inodes {}, dirs {}",
                i,
                desc.block_bitmap,
                desc.inode_bitmap,
                desc.inode_table,
                desc.free_blocks_count,
                desc.free_inodes_count,
                desc.used_dirs_count,
            );
        }

        Ok(Self::new(start, blocks, descs))
    }
}
