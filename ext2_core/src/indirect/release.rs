//! 释放 inode 占用的全部块

use log::warn;

use super::nonzero;
use crate::{
    balloc::free_block,
    block::{Block, BlockDev, BlockDevice},
    block_group::BgdTable,
    consts::*,
    error::Result,
    inode::{write_inode, Inode},
    superblock::Superblock,
};

/// 释放一个一级间接块及其指向的数据块
fn release_indirect<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    sb: &mut Superblock,
    bgdt: &mut BgdTable,
    indirect: u32,
) -> Result<u32> {
    let block = Block::read(bdev, indirect as u64)?;
    let mut freed = 0;
    for i in 0..block.ptrs_per_block() {
        if let Some(data) = nonzero(block.ptr(i)) {
            free_block(bdev, sb, bgdt, data)?;
            freed += 1;
        }
    }
    free_block(bdev, sb, bgdt, indirect)?;
    Ok(freed + 1)
}

/// 释放 inode 的所有数据块和间接块
///
/// # 参数
///
/// * `bdev` - 块设备引用
/// * `sb` - superblock 可变引用
/// * `bgdt` - 块组描述符表
/// * `inode` - 目标 inode，完成后指针清零、大小和扇区计数归零并写回
///
/// # 返回
///
/// 释放的块数
pub fn release_blocks<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    sb: &mut Superblock,
    bgdt: &mut BgdTable,
    inode: &mut Inode,
) -> Result<u32> {
    let mut freed = 0;

    for i in 0..EXT2_INODE_DIRECT_BLOCKS {
        if let Some(block) = nonzero(inode.block_ptr(i)) {
            free_block(bdev, sb, bgdt, block)?;
            inode.set_block_ptr(i, 0);
            freed += 1;
        }
    }

    if let Some(ind) = nonzero(inode.block_ptr(EXT2_INODE_INDIRECT_BLOCK)) {
        freed += release_indirect(bdev, sb, bgdt, ind)?;
        inode.set_block_ptr(EXT2_INODE_INDIRECT_BLOCK, 0);
    }

    if let Some(dind) = nonzero(inode.block_ptr(EXT2_INODE_DOUBLE_INDIRECT_BLOCK)) {
        let block = Block::read(bdev, dind as u64)?;
        for i in 0..block.ptrs_per_block() {
            if let Some(ind) = nonzero(block.ptr(i)) {
                freed += release_indirect(bdev, sb, bgdt, ind)?;
            }
        }
        free_block(bdev, sb, bgdt, dind)?;
        inode.set_block_ptr(EXT2_INODE_DOUBLE_INDIRECT_BLOCK, 0);
        freed += 1;
    }

    if inode.block_ptr(EXT2_INODE_TRIPLE_INDIRECT_BLOCK) != 0 {
        warn!(
            "ext2: inode {} has a triple-indirect block, its blocks are not released",
            inode.inode_num()
        );
    }

    inode.set_file_size(0);
    inode.inner_mut().blocks = 0;
    write_inode(bdev, sb, bgdt, inode)?;
    Ok(freed)
}
