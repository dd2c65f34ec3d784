//! 块设备核心类型

use crate::consts::{EXT2_DEV_BSIZE, EXT2_MIN_BLOCK_SIZE};
use crate::error::{Error, ErrorKind, Result};

/// 块设备接口
///
/// 底层设备以扇区为单位寻址，文件系统块到扇区的换算由 [`BlockDev`] 完成。
///
/// # 示例
///
/// ```rust,ignore
/// use ext2_core::{BlockDevice, Result};
///
/// struct MyDevice {
///     // ...
/// }
///
/// impl BlockDevice for MyDevice {
///     fn total_sectors(&self) -> u64 {
///         2048
///     }
///
///     fn read_blocks(&mut self, lba: u64, count: u32, buf: &mut [u8]) -> Result<usize> {
///         // 实现扇区读取
///         Ok(count as usize * self.sector_size() as usize)
///     }
///
///     fn write_blocks(&mut self, lba: u64, count: u32, buf: &[u8]) -> Result<usize> {
///         // 实现扇区写入
///         Ok(count as usize * self.sector_size() as usize)
///     }
/// }
/// ```
pub trait BlockDevice {
    /// 物理扇区大小（通常 512）
    fn sector_size(&self) -> u32 {
        EXT2_DEV_BSIZE as u32
    }

    /// 总扇区数
    fn total_sectors(&self) -> u64;

    /// 读取扇区
    ///
    /// # 参数
    ///
    /// * `lba` - 起始扇区号
    /// * `count` - 要读取的扇区数
    /// * `buf` - 目标缓冲区（大小至少为 count * sector_size）
    ///
    /// # 返回
    ///
    /// 成功返回实际读取的字节数
    fn read_blocks(&mut self, lba: u64, count: u32, buf: &mut [u8]) -> Result<usize>;

    /// 写入扇区
    ///
    /// # 参数
    ///
    /// * `lba` - 起始扇区号
    /// * `count` - 要写入的扇区数
    /// * `buf` - 源缓冲区（大小至少为 count * sector_size）
    ///
    /// # 返回
    ///
    /// 成功返回实际写入的字节数
    fn write_blocks(&mut self, lba: u64, count: u32, buf: &[u8]) -> Result<usize>;

    /// 刷新缓存
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// 是否只读
    fn is_read_only(&self) -> bool {
        false
    }
}

/// 块设备包装器
///
/// 以文件系统块为单位访问底层设备。挂载前块大小为 1024，
/// 读出 superblock 后由 [`BlockDev::set_block_size`] 调整。
pub struct BlockDev<D> {
    /// 底层设备
    device: D,
    /// 文件系统块大小（字节）
    block_size: u32,
    /// 读取次数
    read_count: u64,
    /// 写入次数
    write_count: u64,
}

impl<D: BlockDevice> BlockDev<D> {
    /// 创建新的块设备包装器
    pub fn new(device: D) -> Self {
        Self {
            device,
            block_size: EXT2_MIN_BLOCK_SIZE,
            read_count: 0,
            write_count: 0,
        }
    }

    /// 取回底层设备
    pub fn into_inner(self) -> D {
        self.device
    }

    /// 获取底层设备的引用
    pub fn device(&self) -> &D {
        &self.device
    }

    /// 获取底层设备的可变引用
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// 获取文件系统块大小
    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    /// 设置文件系统块大小
    ///
    /// 块大小必须是扇区大小的整数倍。
    pub fn set_block_size(&mut self, block_size: u32) -> Result<()> {
        let sector = self.device.sector_size();
        if sector == 0 || block_size < sector || block_size % sector != 0 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Block size is not a multiple of the sector size",
            ));
        }
        self.block_size = block_size;
        Ok(())
    }

    /// 设备可容纳的文件系统块数
    pub fn total_blocks(&self) -> u64 {
        self.device.total_sectors() * self.device.sector_size() as u64 / self.block_size as u64
    }

    /// 获取读取次数
    pub fn read_count(&self) -> u64 {
        self.read_count
    }

    /// 获取写入次数
    pub fn write_count(&self) -> u64 {
        self.write_count
    }

    /// 底层设备是否只读
    pub fn is_read_only(&self) -> bool {
        self.device.is_read_only()
    }

    /// 将文件系统块号转换为扇区号
    pub(super) fn block_to_sector(&self, lba: u64) -> u64 {
        lba * self.sectors_per_block() as u64
    }

    /// 每个文件系统块包含的扇区数
    pub(super) fn sectors_per_block(&self) -> u32 {
        self.block_size / self.device.sector_size()
    }

    pub(super) fn inc_read_count(&mut self) {
        self.read_count += 1;
    }

    pub(super) fn inc_write_count(&mut self) {
        self.write_count += 1;
    }
}
