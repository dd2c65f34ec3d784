//! Inode 写回

use super::{locate_inode, Inode};
use crate::{
    block::{Block, BlockDev, BlockDevice},
    block_group::BgdTable,
    error::Result,
    superblock::Superblock,
};

/// 将 inode 写回 inode 表
///
/// 读出所在表块，覆盖 `inode_size` 字节的区域后整块写回。
pub fn write_inode<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    sb: &Superblock,
    bgdt: &BgdTable,
    inode: &Inode,
) -> Result<()> {
    let loc = locate_inode(sb, bgdt, inode.inode_num())?;
    let inode_size = sb.inode_size() as usize;

    let mut block = Block::read(bdev, loc.block)?;
    inode
        .inner()
        .to_bytes(&mut block.data_mut()[loc.offset..loc.offset + inode_size]);
    block.write(bdev)
}
