//! Inode 释放功能

use log::{trace, warn};

use super::{get_bgid_of_inode, inode_to_bgidx};
use crate::{
    bitmap,
    block::{Block, BlockDev, BlockDevice},
    block_group::BgdTable,
    error::{Error, ErrorKind, Result},
    superblock::Superblock,
};

/// 释放一个 inode
///
/// # 参数
///
/// * `bdev` - 块设备引用
/// * `sb` - superblock 可变引用
/// * `bgdt` - 块组描述符表
/// * `inode` - 要释放的 inode 编号
/// * `is_dir` - 是否是目录（目录还要减少块组的目录计数）
///
/// 不触碰 inode 本身的内容，数据块需先由调用者释放。
pub fn free_inode<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    sb: &mut Superblock,
    bgdt: &mut BgdTable,
    inode: u32,
    is_dir: bool,
) -> Result<()> {
    if inode == 0 || inode > sb.inodes_count() {
        return Err(Error::new(ErrorKind::InvalidInput, "Inode number out of range"));
    }

    let bgid = get_bgid_of_inode(sb, inode);
    let idx = inode_to_bgidx(sb, inode);

    let mut bitmap_block = Block::read(bdev, bgdt.group(bgid)?.inode_bitmap())?;
    if !bitmap::test_bit(bitmap_block.data(), idx)? {
        warn!("ext2: inode {} is already free", inode);
        return Err(Error::new(ErrorKind::Corrupted, "Freeing an inode that is not in use"));
    }
    bitmap::clear_bit(bitmap_block.data_mut(), idx)?;
    bitmap_block.write(bdev)?;

    let bg = bgdt.group_mut(bgid)?;
    bg.inc_free_inodes();
    if is_dir {
        bg.dec_used_dirs();
    }
    sb.add_free_inodes(1);
    bgdt.flush(bdev)?;
    sb.write(bdev)?;

    trace!("ext2: freed inode {} in group {}", inode, bgid);
    Ok(())
}
