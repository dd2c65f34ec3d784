//! Superblock 写入和更新

use alloc::vec;

use crate::{
    block::{BlockDev, BlockDevice},
    consts::*,
    error::Result,
    types::ext2_sblock,
};

/// 将 superblock 写回块设备
///
/// # 参数
///
/// * `bdev` - 块设备引用
/// * `sb` - superblock 结构
pub fn write_superblock<D: BlockDevice>(bdev: &mut BlockDev<D>, sb: &ext2_sblock) -> Result<()> {
    let mut sb_buf = vec![0u8; EXT2_SUPERBLOCK_SIZE];
    sb.to_bytes(&mut sb_buf);

    // 写入到设备（偏移 1024 字节）
    bdev.write_bytes(EXT2_SUPERBLOCK_OFFSET, &sb_buf)
}

/// Superblock 更新操作
impl super::Superblock {
    /// 获取可变的内部 superblock 结构
    pub fn inner_mut(&mut self) -> &mut ext2_sblock {
        &mut self.inner
    }

    /// 将 superblock 写回块设备
    pub fn write<D: BlockDevice>(&self, bdev: &mut BlockDev<D>) -> Result<()> {
        write_superblock(bdev, &self.inner)
    }

    /// 增加空闲块数
    pub fn add_free_blocks(&mut self, delta: u32) {
        self.inner.free_blocks_count = self.inner.free_blocks_count.saturating_add(delta);
    }

    /// 减少空闲块数
    pub fn sub_free_blocks(&mut self, delta: u32) {
        self.inner.free_blocks_count = self.inner.free_blocks_count.saturating_sub(delta);
    }

    /// 增加空闲 inode 数
    pub fn add_free_inodes(&mut self, delta: u32) {
        self.inner.free_inodes_count = self.inner.free_inodes_count.saturating_add(delta);
    }

    /// 减少空闲 inode 数
    pub fn sub_free_inodes(&mut self, delta: u32) {
        self.inner.free_inodes_count = self.inner.free_inodes_count.saturating_sub(delta);
    }

    /// 记录一次挂载
    ///
    /// # 参数
    ///
    /// * `now` - 挂载时间（秒），未知时为 0，保持原值
    pub fn record_mount(&mut self, now: u32) {
        self.inner.mnt_count = self.inner.mnt_count.saturating_add(1);
        if now != 0 {
            self.inner.mtime = now;
        }
    }

    /// 更新最后写入时间
    pub fn set_write_time(&mut self, now: u32) {
        self.inner.wtime = now;
    }

    /// 设置文件系统状态
    pub fn set_state(&mut self, state: u16) {
        self.inner.state = state;
    }

    /// 标记为干净卸载
    pub fn mark_clean(&mut self) {
        self.set_state(EXT2_VALID_FS);
    }

    /// 标记为挂载中（未干净卸载）
    pub fn mark_mounted(&mut self) {
        self.inner.state &= !EXT2_VALID_FS;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BlockDev, MemDevice};
    use crate::superblock::Superblock;

    #[test]
    fn test_superblock_counters_persist() {
        let mut bdev = BlockDev::new(MemDevice::new(8 * 1024));

        let mut sb = ext2_sblock::default();
        sb.magic = EXT2_SUPERBLOCK_MAGIC;
        sb.blocks_per_group = 8192;
        sb.inodes_per_group = 64;
        sb.free_blocks_count = 1000;
        sb.free_inodes_count = 500;
        let mut superblock = Superblock::new(sb);

        superblock.add_free_blocks(100);
        superblock.sub_free_blocks(50);
        assert_eq!(superblock.free_blocks_count(), 1050);
        superblock.add_free_inodes(50);
        superblock.sub_free_inodes(100);
        assert_eq!(superblock.free_inodes_count(), 450);
        superblock.sub_free_inodes(1000);
        assert_eq!(superblock.free_inodes_count(), 0);

        superblock.write(&mut bdev).unwrap();
        let loaded = Superblock::load(&mut bdev).unwrap();
        assert_eq!(loaded.free_blocks_count(), 1050);
        assert_eq!(loaded.inner(), superblock.inner());
    }

    #[test]
    fn test_superblock_state() {
        let mut superblock = Superblock::new(ext2_sblock::default());

        superblock.mark_clean();
        assert!(superblock.is_clean());

        superblock.mark_mounted();
        assert!(!superblock.is_clean());

        superblock.record_mount(1_700_000_000);
        assert_eq!(superblock.mount_count(), 1);
        assert_eq!(superblock.inner().mtime, 1_700_000_000);
    }
}
