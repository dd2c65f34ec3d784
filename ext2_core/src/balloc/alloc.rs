//! 块分配功能

use log::{trace, warn};

use super::bg_idx_to_addr;
use crate::{
    bitmap,
    block::{Block, BlockDev, BlockDevice},
    block_group::BgdTable,
    error::{Error, ErrorKind, Result},
    superblock::Superblock,
};

/// 在单个块组内尝试分配
///
/// 组内空闲计数非零但位图已满时记录警告并返回 `None`，由调用者继续下一组。
fn try_alloc_in_group<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    sb: &mut Superblock,
    bgdt: &mut BgdTable,
    bgid: u32,
) -> Result<Option<u32>> {
    let (bitmap_addr, free) = {
        let bg = bgdt.group(bgid)?;
        (bg.block_bitmap(), bg.free_blocks_count())
    };

    let mut bitmap_block = Block::read(bdev, bitmap_addr)?;
    let limit = sb.blocks_in_group(bgid);
    let Some(idx) = bitmap::find_first_zero(bitmap_block.data(), 0, limit) else {
        warn!(
            "ext2: block group {} reports {} free blocks but its bitmap is full, skipping",
            bgid, free
        );
        return Ok(None);
    };

    bitmap::set_bit(bitmap_block.data_mut(), idx)?;
    bitmap_block.write(bdev)?;

    bgdt.group_mut(bgid)?.dec_free_blocks();
    sb.sub_free_blocks(1);
    bgdt.flush(bdev)?;
    sb.write(bdev)?;

    Ok(Some(bg_idx_to_addr(sb, idx, bgid)))
}

/// 分配一个块
///
/// # 参数
///
/// * `bdev` - 块设备引用
/// * `sb` - superblock 可变引用
/// * `bgdt` - 块组描述符表
///
/// # 返回
///
/// 成功返回分配的块号；所有块组都没有空闲块时返回 `NoSpace`
///
/// # 说明
///
/// 按块组编号从小到大扫描，跳过空闲计数为 0 的组，取位图中第一个为 0 的位。
/// 位图与两级空闲计数随即写回。本函数不更新 inode 的块计数。
pub fn alloc_block<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    sb: &mut Superblock,
    bgdt: &mut BgdTable,
) -> Result<u32> {
    for bgid in 0..bgdt.len() {
        if bgdt.group(bgid)?.free_blocks_count() == 0 {
            continue;
        }
        if let Some(block) = try_alloc_in_group(bdev, sb, bgdt, bgid)? {
            trace!("ext2: allocated block {} in group {}", block, bgid);
            return Ok(block);
        }
    }

    Err(Error::new(ErrorKind::NoSpace, "No free blocks available"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balloc::free_block;
    use crate::block::MemDevice;
    use crate::mkfs::{self, FormatOptions};
    use alloc::collections::BTreeSet;

    fn setup(blocks_count: u32, blocks_per_group: u32) -> (BlockDev<MemDevice>, Superblock, BgdTable) {
        let mut bdev = BlockDev::new(MemDevice::new(blocks_count as usize * 1024));
        let opts = FormatOptions {
            blocks_count,
            blocks_per_group,
            inodes_count: 64,
            ..Default::default()
        };
        mkfs::format(&mut bdev, &opts).unwrap();
        let sb = Superblock::load(&mut bdev).unwrap();
        let bgdt = BgdTable::load(&mut bdev, &sb).unwrap();
        (bdev, sb, bgdt)
    }

    #[test]
    fn test_alloc_until_exhausted() {
        let (mut bdev, mut sb, mut bgdt) = setup(256, 256);
        let free = sb.free_blocks_count();

        let mut seen = BTreeSet::new();
        for _ in 0..free {
            let block = alloc_block(&mut bdev, &mut sb, &mut bgdt).unwrap();
            assert!(block < sb.blocks_count());
            assert!(seen.insert(block), "block {} handed out twice", block);
        }
        assert_eq!(sb.free_blocks_count(), 0);
        assert_eq!(bgdt.group(0).unwrap().free_blocks_count(), 0);

        let err = alloc_block(&mut bdev, &mut sb, &mut bgdt).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoSpace);
    }

    #[test]
    fn test_alloc_after_free_reuses_block() {
        let (mut bdev, mut sb, mut bgdt) = setup(512, 256);
        let a = alloc_block(&mut bdev, &mut sb, &mut bgdt).unwrap();
        let b = alloc_block(&mut bdev, &mut sb, &mut bgdt).unwrap();
        assert_eq!(b, a + 1);

        free_block(&mut bdev, &mut sb, &mut bgdt, a).unwrap();
        assert_eq!(alloc_block(&mut bdev, &mut sb, &mut bgdt).unwrap(), a);
    }

    #[test]
    fn test_counters_are_persisted() {
        let (mut bdev, mut sb, mut bgdt) = setup(512, 256);
        let before = sb.free_blocks_count();
        alloc_block(&mut bdev, &mut sb, &mut bgdt).unwrap();

        let disk_sb = Superblock::load(&mut bdev).unwrap();
        let disk_bgdt = BgdTable::load(&mut bdev, &disk_sb).unwrap();
        assert_eq!(disk_sb.free_blocks_count(), before - 1);
        assert_eq!(
            disk_bgdt.group(0).unwrap().free_blocks_count(),
            bgdt.group(0).unwrap().free_blocks_count()
        );
    }

    #[test]
    fn test_numbering_with_4k_blocks() {
        let mut bdev = BlockDev::new(MemDevice::new(2048 * 4096));
        let opts = FormatOptions {
            block_size: 4096,
            blocks_count: 2048,
            blocks_per_group: 1024,
            inodes_count: 64,
            ..Default::default()
        };
        mkfs::format(&mut bdev, &opts).unwrap();
        let mut sb = Superblock::load(&mut bdev).unwrap();
        let mut bgdt = BgdTable::load(&mut bdev, &sb).unwrap();

        // 没有引导块偏移：块 0 含 superblock，描述符表在块 1
        assert_eq!(sb.first_data_block(), 0);
        assert_eq!(bgdt.start_block(), 1);
        // 块 2/3 位图，块 4 inode 表，块 5 根目录
        assert_eq!(bgdt.group(0).unwrap().block_bitmap(), 2);
        assert_eq!(bgdt.group(0).unwrap().inode_table(), 4);
        assert_eq!(alloc_block(&mut bdev, &mut sb, &mut bgdt).unwrap(), 6);

        let rest = bgdt.group(0).unwrap().free_blocks_count();
        for _ in 0..rest {
            assert!(alloc_block(&mut bdev, &mut sb, &mut bgdt).unwrap() < 1024);
        }

        // 1 号组从块 1024 开始，元数据占 1024..=1026
        assert_eq!(bgdt.group(1).unwrap().block_bitmap(), 1024);
        let first = alloc_block(&mut bdev, &mut sb, &mut bgdt).unwrap();
        assert_eq!(first, 1027);
        assert_eq!(crate::balloc::get_bgid_of_block(&sb, first), 1);

        let addr = bgdt.group(1).unwrap().block_bitmap();
        let bitmap_block = Block::read(&mut bdev, addr).unwrap();
        assert!(bitmap::test_bit(bitmap_block.data(), 3).unwrap());
        assert!(!bitmap::test_bit(bitmap_block.data(), 4).unwrap());

        free_block(&mut bdev, &mut sb, &mut bgdt, first).unwrap();
        assert_eq!(alloc_block(&mut bdev, &mut sb, &mut bgdt).unwrap(), first);
    }

    #[test]
    fn test_full_bitmap_with_stale_count_is_skipped() {
        let (mut bdev, mut sb, mut bgdt) = setup(512, 256);

        // 把 0 号组的位图填满，但保留非零空闲计数
        let addr = bgdt.group(0).unwrap().block_bitmap();
        let mut bitmap_block = Block::read(&mut bdev, addr).unwrap();
        bitmap_block.data_mut().fill(0xFF);
        bitmap_block.write(&mut bdev).unwrap();

        let block = alloc_block(&mut bdev, &mut sb, &mut bgdt).unwrap();
        assert_eq!(crate::balloc::get_bgid_of_block(&sb, block), 1);
        assert!(bgdt.group(0).unwrap().free_blocks_count() > 0);
    }
}
