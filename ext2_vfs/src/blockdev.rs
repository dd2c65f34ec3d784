//! 块设备抽象模块
//!
//! 文件系统只依赖两个原语：按扇区读、按扇区写。块大小换算和
//! 部分块读写都在 ext2_core 内部完成。

/// 设备的物理扇区大小（512 字节）
pub use ext2_core::EXT2_DEV_BSIZE;

/// 块设备接口，定义了块设备的基本操作
///
/// 在内核中，需要有一个实现了 BlockDevice trait 的结构体，
/// 在其中调用块设备驱动的方法与磁盘交互。
///
/// # 示例
///
/// ```ignore
/// struct MyBlockDevice {
///     // ... 底层设备字段
/// }
///
/// impl BlockDevice for MyBlockDevice {
///     fn total_sectors(&self) -> u64 {
///         // 返回总扇区数
///     }
///
///     fn read_blocks(&mut self, lba: u64, count: u32, buf: &mut [u8]) -> ext2_core::Result<usize> {
///         // 实现扇区读取
///     }
///
///     fn write_blocks(&mut self, lba: u64, count: u32, buf: &[u8]) -> ext2_core::Result<usize> {
///         // 实现扇区写入
///     }
/// }
/// ```
pub use ext2_core::BlockDevice;

/// 内存盘
pub use ext2_core::MemDevice;
