//! 块 I/O 操作实现

use alloc::vec;

use super::{BlockDev, BlockDevice};
use crate::error::{Error, ErrorKind, Result};

impl<D: BlockDevice> BlockDev<D> {
    /// 读取单个文件系统块
    ///
    /// # 参数
    ///
    /// * `lba` - 文件系统块号
    /// * `buf` - 目标缓冲区（大小至少为 block_size）
    ///
    /// 设备返回的字节数不足一整块时报告 I/O 错误。
    pub fn read_block(&mut self, lba: u64, buf: &mut [u8]) -> Result<()> {
        let block_size = self.block_size() as usize;
        if buf.len() < block_size {
            return Err(Error::new(ErrorKind::InvalidInput, "buffer too small for block"));
        }

        let sector = self.block_to_sector(lba);
        let count = self.sectors_per_block();

        self.inc_read_count();
        let n = self.device_mut().read_blocks(sector, count, &mut buf[..block_size])?;
        if n < block_size {
            return Err(Error::new(ErrorKind::Io, "short block read"));
        }
        Ok(())
    }

    /// 写入单个文件系统块
    ///
    /// # 参数
    ///
    /// * `lba` - 文件系统块号
    /// * `buf` - 源数据缓冲区（大小至少为 block_size）
    pub fn write_block(&mut self, lba: u64, buf: &[u8]) -> Result<()> {
        let block_size = self.block_size() as usize;
        if buf.len() < block_size {
            return Err(Error::new(ErrorKind::InvalidInput, "buffer too small for block"));
        }
        if self.is_read_only() {
            return Err(Error::new(ErrorKind::ReadOnly, "device is read-only"));
        }

        let sector = self.block_to_sector(lba);
        let count = self.sectors_per_block();

        self.inc_write_count();
        let n = self.device_mut().write_blocks(sector, count, &buf[..block_size])?;
        if n < block_size {
            return Err(Error::new(ErrorKind::Io, "short block write"));
        }
        Ok(())
    }

    /// 从任意字节偏移读取，按整块访问设备
    ///
    /// superblock 位于字节 1024，与块大小无关，通过这里读写。
    pub fn read_bytes(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        if buf.is_empty() {
            return Ok(());
        }
        let block_size = self.block_size() as u64;
        let start_block = offset / block_size;
        let head = (offset % block_size) as usize;
        let block_count = (head as u64 + buf.len() as u64).div_ceil(block_size) as usize;

        let bs = block_size as usize;
        let mut temp = vec![0u8; block_count * bs];
        for (i, chunk) in temp.chunks_exact_mut(bs).enumerate() {
            self.read_block(start_block + i as u64, chunk)?;
        }

        buf.copy_from_slice(&temp[head..head + buf.len()]);
        Ok(())
    }

    /// 向任意字节偏移写入
    ///
    /// 首尾不完整的块先读出再整块写回。
    pub fn write_bytes(&mut self, offset: u64, buf: &[u8]) -> Result<()> {
        if buf.is_empty() {
            return Ok(());
        }
        let block_size = self.block_size() as u64;
        let start_block = offset / block_size;
        let head = (offset % block_size) as usize;
        let block_count = (head as u64 + buf.len() as u64).div_ceil(block_size) as usize;

        let bs = block_size as usize;
        let mut temp = vec![0u8; block_count * bs];

        if head != 0 || (head + buf.len()) % bs != 0 {
            let last = block_count - 1;
            self.read_block(start_block, &mut temp[..bs])?;
            if last > 0 {
                self.read_block(start_block + last as u64, &mut temp[last * bs..])?;
            }
        }

        temp[head..head + buf.len()].copy_from_slice(buf);

        for (i, chunk) in temp.chunks_exact(bs).enumerate() {
            self.write_block(start_block + i as u64, chunk)?;
        }
        Ok(())
    }

    /// 刷新底层设备
    pub fn flush(&mut self) -> Result<()> {
        self.device_mut().flush()
    }
}
