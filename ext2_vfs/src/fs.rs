//! 文件系统挂载模块：挂载引导、全局锁和文件系统级操作。

use core::{
    marker::PhantomData,
    ops::{Deref, DerefMut},
    time::Duration,
};

use alloc::sync::Arc;
use ext2_core::{Ext2FileSystem, EXT2_ROOT_INO};
use spin::Mutex;

use crate::{blockdev::BlockDevice, error::Context, util::now_secs, Ext2Error, Ext2Result, FsNode};

pub use ext2_core::FsConfig;

/// 系统硬件抽象层（HAL）接口，提供时间和身份相关功能
pub trait SystemHal {
    /// 获取当前时间（可选，用于更新文件的访问/修改时间）
    fn now() -> Option<Duration>;

    /// 新建节点的属主 (uid, gid)，默认为 root
    fn credentials() -> (u16, u16) {
        (0, 0)
    }
}

/// 默认的硬件抽象层实现（不提供时间）
pub struct DummyHal;
impl SystemHal for DummyHal {
    fn now() -> Option<Duration> {
        None
    }
}

/// 文件系统状态信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatFs {
    pub inodes_count: u32,      // 总inode数
    pub free_inodes_count: u32, // 空闲inode数
    pub blocks_count: u64,      // 总块数
    pub free_blocks_count: u64, // 空闲块数
    pub block_size: u32,        // 块大小
}

/// 被锁保护的已挂载文件系统
///
/// 最后一个引用释放时写回元数据。
pub struct MountedFs<Dev: BlockDevice> {
    inner: Ext2FileSystem<Dev>,
}

impl<Dev: BlockDevice> Deref for MountedFs<Dev> {
    type Target = Ext2FileSystem<Dev>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<Dev: BlockDevice> DerefMut for MountedFs<Dev> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

/// 当文件系统实例被销毁时，写回superblock和块组描述符
impl<Dev: BlockDevice> Drop for MountedFs<Dev> {
    fn drop(&mut self) {
        if let Err(e) = self.inner.sync() {
            error!("ext2 sync on release failed: {}", Ext2Error::from(e));
        }
    }
}

/// 文件系统范围的单一互斥锁，所有节点共享
pub(crate) type SharedFs<Dev> = Arc<Mutex<MountedFs<Dev>>>;

/// ext2文件系统实例结构体
/// 泛型参数：Hal（硬件抽象层）、Dev（块设备）
pub struct Ext2Filesystem<Hal: SystemHal, Dev: BlockDevice> {
    inner: SharedFs<Dev>,
    _phantom: PhantomData<Hal>, // 泛型标记
}

impl<Hal: SystemHal, Dev: BlockDevice> Ext2Filesystem<Hal, Dev> {
    /// 挂载设备上的ext2文件系统
    pub fn new(dev: Dev, config: FsConfig) -> Ext2Result<Self> {
        let fs = Ext2FileSystem::mount(dev, config, now_secs::<Hal>()).map_err(Ext2Error::from)?;
        Ok(Self {
            inner: Arc::new(Mutex::new(MountedFs { inner: fs })),
            _phantom: PhantomData,
        })
    }

    /// 根目录节点
    pub fn root(&self) -> Ext2Result<FsNode<Hal, Dev>> {
        FsNode::load(self.inner.clone(), EXT2_ROOT_INO, "/")
    }

    /// 对底层文件系统执行操作（持有全局锁）
    pub fn with_fs<R>(&self, f: impl FnOnce(&mut Ext2FileSystem<Dev>) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }

    /// 获取文件系统状态信息
    pub fn stat(&self) -> StatFs {
        let stat = self.inner.lock().stat();
        StatFs {
            inodes_count: stat.inodes_count,
            free_inodes_count: stat.free_inodes_count,
            blocks_count: stat.blocks_count as u64,
            free_blocks_count: stat.free_blocks_count as u64,
            block_size: stat.block_size,
        }
    }

    /// 写回元数据并刷新设备
    pub fn flush(&self) -> Ext2Result<()> {
        self.inner.lock().sync().context("ext2 sync")
    }
}

/// 挂载设备并返回根目录节点 `/`
pub fn mount<Hal: SystemHal, Dev: BlockDevice>(dev: Dev, config: FsConfig) -> Ext2Result<FsNode<Hal, Dev>> {
    Ext2Filesystem::<Hal, Dev>::new(dev, config)?.root()
}
