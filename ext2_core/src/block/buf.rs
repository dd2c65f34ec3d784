//! 块缓冲区
//!
//! 每次读取都返回一个独占的 [`Block`]，离开作用域即释放；
//! 修改后需显式调用 [`Block::write`] 写回。没有缓存，也不共享。

use alloc::vec;
use alloc::vec::Vec;
use byteorder::{ByteOrder, LittleEndian};

use super::{BlockDev, BlockDevice};
use crate::error::Result;

/// 一个文件系统块的内容
#[derive(Debug, Clone)]
pub struct Block {
    lba: u64,
    data: Vec<u8>,
}

impl Block {
    /// 从设备读取一个块
    pub fn read<D: BlockDevice>(bdev: &mut BlockDev<D>, lba: u64) -> Result<Self> {
        let mut data = vec![0u8; bdev.block_size() as usize];
        bdev.read_block(lba, &mut data)?;
        Ok(Self { lba, data })
    }

    /// 构造一个全零块（不访问设备）
    pub fn zeroed<D: BlockDevice>(bdev: &BlockDev<D>, lba: u64) -> Self {
        Self {
            lba,
            data: vec![0u8; bdev.block_size() as usize],
        }
    }

    /// 块号
    pub fn lba(&self) -> u64 {
        self.lba
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// 写回设备
    pub fn write<D: BlockDevice>(&self, bdev: &mut BlockDev<D>) -> Result<()> {
        bdev.write_block(self.lba, &self.data)
    }

    /// 每块可容纳的块指针数（间接块）
    pub fn ptrs_per_block(&self) -> usize {
        self.data.len() / 4
    }

    /// 将本块视为块指针数组，读取第 `idx` 项
    pub fn ptr(&self, idx: usize) -> u32 {
        LittleEndian::read_u32(&self.data[idx * 4..])
    }

    /// 将本块视为块指针数组，设置第 `idx` 项
    pub fn set_ptr(&mut self, idx: usize, value: u32) {
        LittleEndian::write_u32(&mut self.data[idx * 4..], value);
    }
}
