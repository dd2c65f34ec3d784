//! 块释放功能

use log::{trace, warn};

use super::{addr_to_idx_bg, get_bgid_of_block};
use crate::{
    bitmap,
    block::{Block, BlockDev, BlockDevice},
    block_group::BgdTable,
    error::{Error, ErrorKind, Result},
    superblock::Superblock,
};

/// 释放一个块
///
/// # 参数
///
/// * `bdev` - 块设备引用
/// * `sb` - superblock 可变引用
/// * `bgdt` - 块组描述符表
/// * `block` - 要释放的块号
///
/// 块号超出数据区返回 `InvalidInput`；位图中该位本来就为 0 返回 `Corrupted`。
pub fn free_block<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    sb: &mut Superblock,
    bgdt: &mut BgdTable,
    block: u32,
) -> Result<()> {
    if block < sb.first_data_block() || block >= sb.blocks_count() {
        return Err(Error::new(ErrorKind::InvalidInput, "Block number out of range"));
    }

    let bgid = get_bgid_of_block(sb, block);
    let idx = addr_to_idx_bg(sb, block);

    let mut bitmap_block = Block::read(bdev, bgdt.group(bgid)?.block_bitmap())?;
    if !bitmap::test_bit(bitmap_block.data(), idx)? {
        warn!("ext2: block {} is already free", block);
        return Err(Error::new(ErrorKind::Corrupted, "Freeing a block that is not in use"));
    }
    bitmap::clear_bit(bitmap_block.data_mut(), idx)?;
    bitmap_block.write(bdev)?;

    bgdt.group_mut(bgid)?.inc_free_blocks();
    sb.add_free_blocks(1);
    bgdt.flush(bdev)?;
    sb.write(bdev)?;

    trace!("ext2: freed block {} in group {}", block, bgid);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balloc::alloc_block;
    use crate::block::MemDevice;
    use crate::mkfs::{self, FormatOptions};

    #[test]
    fn test_free_restores_counters() {
        let mut bdev = BlockDev::new(MemDevice::new(512 * 1024));
        let opts = FormatOptions {
            blocks_count: 512,
            ..Default::default()
        };
        mkfs::format(&mut bdev, &opts).unwrap();
        let mut sb = Superblock::load(&mut bdev).unwrap();
        let mut bgdt = BgdTable::load(&mut bdev, &sb).unwrap();
        let before = sb.free_blocks_count();

        let block = alloc_block(&mut bdev, &mut sb, &mut bgdt).unwrap();
        free_block(&mut bdev, &mut sb, &mut bgdt, block).unwrap();
        assert_eq!(sb.free_blocks_count(), before);
        assert_eq!(bgdt.group(0).unwrap().free_blocks_count(), before);

        let err = free_block(&mut bdev, &mut sb, &mut bgdt, block).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Corrupted);

        let err = free_block(&mut bdev, &mut sb, &mut bgdt, 512).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        let err = free_block(&mut bdev, &mut sb, &mut bgdt, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
