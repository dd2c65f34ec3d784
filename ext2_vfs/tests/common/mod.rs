//! 集成测试公共工具

#![allow(dead_code)]

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use ext2_core::{mkfs, BlockDev, FormatOptions};
use ext2_vfs::{MemDevice, SystemHal};

/// 提供宿主机时间和固定身份的 HAL
pub struct HostHal;

impl SystemHal for HostHal {
    fn now() -> Option<Duration> {
        SystemTime::now().duration_since(UNIX_EPOCH).ok()
    }

    fn credentials() -> (u16, u16) {
        (1000, 1000)
    }
}

/// 格式化好的内存盘：1024 个 1 KiB 块，128 个 inode
pub fn fresh_device() -> MemDevice {
    let opts = FormatOptions {
        blocks_count: 1024,
        inodes_count: 128,
        ..Default::default()
    };
    let mut bdev = BlockDev::new(MemDevice::new(1024 * 1024));
    mkfs::format(&mut bdev, &opts).expect("format image");
    bdev.into_inner()
}
