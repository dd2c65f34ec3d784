//! 内存块设备
//!
//! 以 `Vec<u8>` 作为存储的扇区设备，可用作内存盘，也用于测试。

use alloc::vec;
use alloc::vec::Vec;

use super::BlockDevice;
use crate::consts::EXT2_DEV_BSIZE;
use crate::error::{Error, ErrorKind, Result};

/// 内存块设备
#[derive(Debug, Clone)]
pub struct MemDevice {
    data: Vec<u8>,
    read_only: bool,
}

impl MemDevice {
    /// 创建指定字节数的全零设备（向上取整到扇区）
    pub fn new(size: usize) -> Self {
        let size = size.div_ceil(EXT2_DEV_BSIZE) * EXT2_DEV_BSIZE;
        Self {
            data: vec![0u8; size],
            read_only: false,
        }
    }

    /// 以已有镜像构造
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { data, read_only: false }
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// 镜像内容
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    fn range(&self, lba: u64, count: u32, buf_len: usize) -> Result<core::ops::Range<usize>> {
        let start = lba as usize * EXT2_DEV_BSIZE;
        let len = count as usize * EXT2_DEV_BSIZE;
        if buf_len < len {
            return Err(Error::new(ErrorKind::InvalidInput, "buffer too small"));
        }
        if start + len > self.data.len() {
            return Err(Error::new(ErrorKind::Io, "sector out of device range"));
        }
        Ok(start..start + len)
    }
}

impl BlockDevice for MemDevice {
    fn total_sectors(&self) -> u64 {
        (self.data.len() / EXT2_DEV_BSIZE) as u64
    }

    fn read_blocks(&mut self, lba: u64, count: u32, buf: &mut [u8]) -> Result<usize> {
        let range = self.range(lba, count, buf.len())?;
        let len = range.len();
        buf[..len].copy_from_slice(&self.data[range]);
        Ok(len)
    }

    fn write_blocks(&mut self, lba: u64, count: u32, buf: &[u8]) -> Result<usize> {
        if self.read_only {
            return Err(Error::new(ErrorKind::ReadOnly, "device is read-only"));
        }
        let range = self.range(lba, count, buf.len())?;
        let len = range.len();
        self.data[range].copy_from_slice(&buf[..len]);
        Ok(len)
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{Block, BlockDev};

    /// 每次读取只返回一半数据的设备
    struct ShortReadDevice(MemDevice);

    impl BlockDevice for ShortReadDevice {
        fn total_sectors(&self) -> u64 {
            self.0.total_sectors()
        }

        fn read_blocks(&mut self, lba: u64, count: u32, buf: &mut [u8]) -> Result<usize> {
            let n = self.0.read_blocks(lba, count, buf)?;
            Ok(n / 2)
        }

        fn write_blocks(&mut self, lba: u64, count: u32, buf: &[u8]) -> Result<usize> {
            self.0.write_blocks(lba, count, buf)
        }
    }

    #[test]
    fn test_block_roundtrip() {
        let mut bdev = BlockDev::new(MemDevice::new(8 * 1024));
        let mut block = Block::zeroed(&bdev, 3);
        block.data_mut()[0] = 0x11;
        block.data_mut()[1023] = 0x22;
        block.write(&mut bdev).unwrap();

        let block = Block::read(&mut bdev, 3).unwrap();
        assert_eq!(block.data()[0], 0x11);
        assert_eq!(block.data()[1023], 0x22);
        assert_eq!(&bdev.device().as_bytes()[3 * 1024..3 * 1024 + 1], &[0x11]);
        assert_eq!(bdev.write_count(), 1);
        assert_eq!(bdev.read_count(), 1);
    }

    #[test]
    fn test_bytes_across_blocks() {
        let mut bdev = BlockDev::new(MemDevice::new(8 * 1024));
        bdev.set_block_size(2048).unwrap();
        bdev.write_bytes(2040, b"0123456789abcdef").unwrap();

        let mut buf = [0u8; 16];
        bdev.read_bytes(2040, &mut buf).unwrap();
        assert_eq!(&buf, b"0123456789abcdef");
        assert_eq!(&bdev.device().as_bytes()[2048..2052], b"89ab");
    }

    #[test]
    fn test_out_of_range_is_io_error() {
        let mut bdev = BlockDev::new(MemDevice::new(4 * 1024));
        let err = Block::read(&mut bdev, 4).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_short_read_is_io_error() {
        let mut bdev = BlockDev::new(ShortReadDevice(MemDevice::new(4 * 1024)));
        let err = Block::read(&mut bdev, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_read_only_device() {
        let mut dev = MemDevice::new(4 * 1024);
        dev.set_read_only(true);
        let mut bdev = BlockDev::new(dev);
        let block = Block::zeroed(&bdev, 1);
        assert_eq!(block.write(&mut bdev).unwrap_err().kind(), ErrorKind::ReadOnly);
    }

    #[test]
    fn test_block_size_must_match_sectors() {
        let mut bdev = BlockDev::new(MemDevice::new(4 * 1024));
        assert!(bdev.set_block_size(1000).is_err());
        assert!(bdev.set_block_size(4096).is_ok());
        assert_eq!(bdev.total_blocks(), 1);
    }
}
