//! Ext2 文件系统核心结构

use alloc::vec::Vec;
use log::info;

use crate::{
    balloc,
    block::{BlockDev, BlockDevice},
    block_group::BgdTable,
    consts::*,
    dir::{self, DirEntry},
    error::{Error, ErrorKind, Result},
    ialloc,
    inode::{self, Inode},
    superblock::Superblock,
};

/// 挂载配置
#[derive(Debug, Clone, Copy, Default)]
pub struct FsConfig {
    /// 只读挂载：所有修改操作返回 `ReadOnly`
    pub read_only: bool,
}

/// 文件系统统计信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsStat {
    pub block_size: u32,
    pub blocks_count: u32,
    pub free_blocks_count: u32,
    pub inodes_count: u32,
    pub free_inodes_count: u32,
}

/// Ext2 文件系统
///
/// # 示例
///
/// ```rust,ignore
/// use ext2_core::{Ext2FileSystem, FsConfig, MemDevice};
///
/// let mut fs = Ext2FileSystem::mount(device, FsConfig::default(), 0)?;
/// let ino = fs.lookup_path("/etc/passwd")?;
/// let mut buf = vec![0u8; 1024];
/// let n = fs.read_at(ino, 0, &mut buf)?;
/// let device = fs.unmount()?;
/// ```
pub struct Ext2FileSystem<D: BlockDevice> {
    pub(crate) bdev: BlockDev<D>,
    pub(crate) sb: Superblock,
    pub(crate) bgdt: BgdTable,
    config: FsConfig,
}

impl<D: BlockDevice> Ext2FileSystem<D> {
    /// 挂载文件系统
    ///
    /// # 参数
    ///
    /// * `device` - 底层块设备
    /// * `config` - 挂载配置
    /// * `now` - 当前时间（秒），未知时传 0
    ///
    /// # 错误
    ///
    /// - `ErrorKind::InvalidInput` - 魔数不符，不是 ext2
    /// - `ErrorKind::Corrupted` - 几何参数非法或根 inode 不是目录
    /// - `ErrorKind::Io` - 设备读取失败
    pub fn mount(device: D, config: FsConfig, now: u32) -> Result<Self> {
        let mut bdev = BlockDev::new(device);
        let sb = Superblock::load(&mut bdev)?;
        bdev.set_block_size(sb.block_size())?;
        let bgdt = BgdTable::load(&mut bdev, &sb)?;

        let root = inode::read_inode(&mut bdev, &sb, &bgdt, EXT2_ROOT_INO)?;
        if !root.is_dir() {
            return Err(Error::new(ErrorKind::Corrupted, "Root inode is not a directory"));
        }

        let mut fs = Self { bdev, sb, bgdt, config };
        if !fs.is_read_only() {
            fs.sb.record_mount(now);
            fs.sb.mark_mounted();
            fs.sb.write(&mut fs.bdev)?;
        }

        info!(
            "ext2: mounted {} blocks of {} bytes ({} free), {} groups{}",
            fs.sb.blocks_count(),
            fs.sb.block_size(),
            fs.sb.free_blocks_count(),
            fs.bgdt.len(),
            if fs.is_read_only() { ", read-only" } else { "" }
        );
        Ok(fs)
    }

    /// 卸载文件系统，写回元数据并交还设备
    pub fn unmount(mut self) -> Result<D> {
        if !self.is_read_only() {
            self.sb.mark_clean();
        }
        self.sync()?;
        Ok(self.bdev.into_inner())
    }

    /// 写回 superblock 和块组描述符表并刷新设备
    pub fn sync(&mut self) -> Result<()> {
        if self.is_read_only() {
            return Ok(());
        }
        self.sb.write(&mut self.bdev)?;
        self.bgdt.flush(&mut self.bdev)?;
        self.bdev.flush()
    }

    /// 是否只读（配置为只读或设备只读）
    pub fn is_read_only(&self) -> bool {
        self.config.read_only || self.bdev.is_read_only()
    }

    pub(crate) fn check_writable(&self) -> Result<()> {
        if self.is_read_only() {
            Err(ErrorKind::ReadOnly.into())
        } else {
            Ok(())
        }
    }

    /// 获取 superblock 引用
    pub fn superblock(&self) -> &Superblock {
        &self.sb
    }

    /// 获取块组描述符表引用
    pub fn group_descs(&self) -> &BgdTable {
        &self.bgdt
    }

    /// 获取块设备引用
    pub fn block_device(&self) -> &BlockDev<D> {
        &self.bdev
    }

    /// 获取可变块设备引用
    pub fn block_device_mut(&mut self) -> &mut BlockDev<D> {
        &mut self.bdev
    }

    pub fn config(&self) -> &FsConfig {
        &self.config
    }

    /// 统计信息
    pub fn stat(&self) -> FsStat {
        FsStat {
            block_size: self.sb.block_size(),
            blocks_count: self.sb.blocks_count(),
            free_blocks_count: self.sb.free_blocks_count(),
            inodes_count: self.sb.inodes_count(),
            free_inodes_count: self.sb.free_inodes_count(),
        }
    }

    /// 分配一个数据块
    pub fn alloc_block(&mut self) -> Result<u32> {
        self.check_writable()?;
        balloc::alloc_block(&mut self.bdev, &mut self.sb, &mut self.bgdt)
    }

    /// 释放一个数据块
    pub fn free_block(&mut self, block: u32) -> Result<()> {
        self.check_writable()?;
        balloc::free_block(&mut self.bdev, &mut self.sb, &mut self.bgdt, block)
    }

    /// 分配一个 inode 号（不初始化 inode 内容）
    pub fn alloc_inode(&mut self) -> Result<u32> {
        self.check_writable()?;
        ialloc::alloc_inode(&mut self.bdev, &mut self.sb, &mut self.bgdt)
    }

    /// 读取 inode
    pub fn read_inode(&mut self, ino: u32) -> Result<Inode> {
        inode::read_inode(&mut self.bdev, &self.sb, &self.bgdt, ino)
    }

    /// 写回 inode
    pub fn write_inode(&mut self, inode: &Inode) -> Result<()> {
        self.check_writable()?;
        inode::write_inode(&mut self.bdev, &self.sb, &self.bgdt, inode)
    }

    /// 读取 inode，用闭包修改后写回
    ///
    /// # 返回
    ///
    /// 写回后的 inode
    pub fn modify_inode(&mut self, ino: u32, f: impl FnOnce(&mut Inode)) -> Result<Inode> {
        self.check_writable()?;
        let mut inode = self.read_inode(ino)?;
        f(&mut inode);
        self.write_inode(&inode)?;
        Ok(inode)
    }

    /// 在目录中查找名字
    pub fn find(&mut self, dir: u32, name: &str) -> Result<Option<DirEntry>> {
        let dir = self.read_inode(dir)?;
        dir::find_entry(&mut self.bdev, &dir, name.as_bytes())
    }

    /// 取目录中第 `index` 个有效目录项
    pub fn read_dir_entry(&mut self, dir: u32, index: usize) -> Result<Option<DirEntry>> {
        let dir = self.read_inode(dir)?;
        dir::read_dir_entry(&mut self.bdev, &dir, index)
    }

    /// 列出目录内容
    pub fn read_dir(&mut self, dir: u32) -> Result<Vec<DirEntry>> {
        let dir = self.read_inode(dir)?;
        dir::read_dir(&mut self.bdev, &dir)
    }

    /// 从根目录解析绝对路径，返回 inode 号
    pub fn lookup_path(&mut self, path: &str) -> Result<u32> {
        dir::lookup_path(&mut self.bdev, &self.sb, &self.bgdt, path)
    }
}
