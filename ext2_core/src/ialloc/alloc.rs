//! Inode 分配功能

use log::{trace, warn};

use super::{bgidx_to_inode, first_search_bit};
use crate::{
    bitmap,
    block::{Block, BlockDev, BlockDevice},
    block_group::BgdTable,
    error::{Error, ErrorKind, Result},
    superblock::Superblock,
};

/// 分配一个 inode
///
/// # 参数
///
/// * `bdev` - 块设备引用
/// * `sb` - superblock 可变引用
/// * `bgdt` - 块组描述符表
///
/// # 返回
///
/// 成功返回分配的 inode 编号（`group * inodes_per_group + bit + 1`）
///
/// # 说明
///
/// 与块分配相同：顺序扫描块组，位图已满但计数非零的组记录警告后跳过。
/// 每个组都从第 11 位开始搜索。
/// 目录计数由调用者（mkdir）维护。
pub fn alloc_inode<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    sb: &mut Superblock,
    bgdt: &mut BgdTable,
) -> Result<u32> {
    let inodes_per_group = sb.inodes_per_group();

    for bgid in 0..bgdt.len() {
        let (bitmap_addr, free) = {
            let bg = bgdt.group(bgid)?;
            (bg.inode_bitmap(), bg.free_inodes_count())
        };
        if free == 0 {
            continue;
        }

        let mut bitmap_block = Block::read(bdev, bitmap_addr)?;
        let start = first_search_bit();
        let Some(idx) = bitmap::find_first_zero(bitmap_block.data(), start, inodes_per_group) else {
            warn!(
                "ext2: block group {} reports {} free inodes but its bitmap is full, skipping",
                bgid, free
            );
            continue;
        };

        bitmap::set_bit(bitmap_block.data_mut(), idx)?;
        bitmap_block.write(bdev)?;

        bgdt.group_mut(bgid)?.dec_free_inodes();
        sb.sub_free_inodes(1);
        bgdt.flush(bdev)?;
        sb.write(bdev)?;

        let inode = bgidx_to_inode(sb, idx, bgid);
        trace!("ext2: allocated inode {} in group {}", inode, bgid);
        return Ok(inode);
    }

    Err(Error::new(ErrorKind::NoSpace, "No free inodes available"))
}
