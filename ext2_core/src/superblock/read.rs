//! Superblock 读取和验证

use alloc::vec;
use log::debug;

use super::Superblock;
use crate::{
    block::{BlockDev, BlockDevice},
    consts::*,
    error::{Error, ErrorKind, Result},
    types::ext2_sblock,
};

/// 从块设备读取 superblock
///
/// # 参数
///
/// * `bdev` - 块设备引用
///
/// # 返回
///
/// 成功返回 superblock 结构；魔数不符返回 `InvalidInput`
pub fn read_superblock<D: BlockDevice>(bdev: &mut BlockDev<D>) -> Result<ext2_sblock> {
    let mut sb_buf = vec![0u8; EXT2_SUPERBLOCK_SIZE];

    // 读取 superblock（从偏移 1024 开始）
    bdev.read_bytes(EXT2_SUPERBLOCK_OFFSET, &mut sb_buf)?;

    let sb = ext2_sblock::from_bytes(&sb_buf);
    if sb.magic != EXT2_SUPERBLOCK_MAGIC {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            "Invalid ext2 superblock magic number",
        ));
    }

    Ok(sb)
}

/// 检查几何参数是否可用
fn validate(sb: &ext2_sblock) -> Result<()> {
    if sb.log_block_size > EXT2_MAX_BLOCK_LOG_SIZE {
        return Err(Error::new(ErrorKind::Corrupted, "Unsupported block size"));
    }
    if sb.blocks_per_group == 0 || sb.inodes_per_group == 0 {
        return Err(Error::new(ErrorKind::Corrupted, "Zero blocks or inodes per group"));
    }
    let block_size = EXT2_MIN_BLOCK_SIZE << sb.log_block_size;
    if sb.blocks_per_group > block_size * 8 || sb.inodes_per_group > block_size * 8 {
        return Err(Error::new(ErrorKind::Corrupted, "Group larger than one bitmap block"));
    }
    if sb.rev_level >= EXT2_DYNAMIC_REV && sb.inode_size != 0 {
        let size = sb.inode_size as u32;
        if size < EXT2_GOOD_OLD_INODE_SIZE as u32 || size > block_size || !size.is_power_of_two() {
            return Err(Error::new(ErrorKind::Corrupted, "Invalid inode size"));
        }
    }
    Ok(())
}

impl Superblock {
    /// 从块设备加载并校验 superblock
    pub fn load<D: BlockDevice>(bdev: &mut BlockDev<D>) -> Result<Self> {
        let inner = read_superblock(bdev)?;
        validate(&inner)?;

        let sb = Self::new(inner);
        debug!(
            "ext2 superblock: {} inodes, {} blocks ({} free), block size {}, {} blocks/{} inodes per group, rev {}",
            sb.inodes_count(),
            sb.blocks_count(),
            sb.free_blocks_count(),
            sb.block_size(),
            sb.blocks_per_group(),
            sb.inodes_per_group(),
            sb.inner().rev_level,
        );
        Ok(sb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::MemDevice;
    use byteorder::{ByteOrder, LittleEndian};

    fn raw_image(log_block_size: u32, magic: u16) -> MemDevice {
        let mut image = vec![0u8; 64 * 1024];
        let sb = &mut image[1024..2048];
        LittleEndian::write_u32(&mut sb[0..], 128);
        LittleEndian::write_u32(&mut sb[4..], 64);
        LittleEndian::write_u32(&mut sb[24..], log_block_size);
        LittleEndian::write_u32(&mut sb[32..], 8192);
        LittleEndian::write_u32(&mut sb[40..], 128);
        LittleEndian::write_u16(&mut sb[56..], magic);
        MemDevice::from_vec(image)
    }

    #[test]
    fn test_load_superblock() {
        let mut bdev = BlockDev::new(raw_image(0, EXT2_SUPERBLOCK_MAGIC));
        let sb = Superblock::load(&mut bdev).unwrap();
        assert_eq!(sb.block_size(), 1024);
        assert_eq!(sb.inode_size(), 128);
        assert_eq!(sb.block_group_count(), 1);
        assert_eq!(sb.group_desc_table_block(), 2);
    }

    #[test]
    fn test_bad_magic_is_invalid_input() {
        let mut bdev = BlockDev::new(raw_image(0, 0x1234));
        let err = Superblock::load(&mut bdev).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.errno(), EINVAL);
    }

    #[test]
    fn test_absurd_block_size_is_corrupted() {
        let mut bdev = BlockDev::new(raw_image(12, EXT2_SUPERBLOCK_MAGIC));
        let err = Superblock::load(&mut bdev).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Corrupted);
    }
}
