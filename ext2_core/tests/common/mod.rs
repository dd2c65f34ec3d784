//! 集成测试公共工具

#![allow(dead_code)]

use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

use ext2_core::{mkfs, BlockDev, BlockDevice, Error, ErrorKind, FormatOptions, Result};

/// 扇区大小
const SECTOR_SIZE: u64 = 512;

/// 以宿主文件为存储的块设备
pub struct FileBlockDevice {
    file: File,
    path: PathBuf,
    sectors: u64,
}

impl FileBlockDevice {
    /// 在临时目录创建指定大小的镜像文件
    pub fn create(name: &str, size: u64) -> std::io::Result<Self> {
        let path = std::env::temp_dir().join(format!("ext2_core_{}_{}.img", name, std::process::id()));
        let file = File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        file.set_len(size)?;
        Ok(Self {
            file,
            path,
            sectors: size / SECTOR_SIZE,
        })
    }

    fn seek(&mut self, lba: u64) -> Result<()> {
        self.file
            .seek(SeekFrom::Start(lba * SECTOR_SIZE))
            .map(|_| ())
            .map_err(|_| Error::new(ErrorKind::Io, "seek failed"))
    }
}

impl Drop for FileBlockDevice {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

impl BlockDevice for FileBlockDevice {
    fn total_sectors(&self) -> u64 {
        self.sectors
    }

    fn read_blocks(&mut self, lba: u64, count: u32, buf: &mut [u8]) -> Result<usize> {
        let size = count as usize * SECTOR_SIZE as usize;
        self.seek(lba)?;
        self.file
            .read_exact(&mut buf[..size])
            .map_err(|_| Error::new(ErrorKind::Io, "read failed"))?;
        Ok(size)
    }

    fn write_blocks(&mut self, lba: u64, count: u32, buf: &[u8]) -> Result<usize> {
        let size = count as usize * SECTOR_SIZE as usize;
        self.seek(lba)?;
        self.file
            .write_all(&buf[..size])
            .map_err(|_| Error::new(ErrorKind::Io, "write failed"))?;
        Ok(size)
    }

    fn flush(&mut self) -> Result<()> {
        self.file
            .sync_data()
            .map_err(|_| Error::new(ErrorKind::Io, "sync failed"))
    }
}

/// 创建并格式化一个镜像文件
pub fn fresh_image(name: &str, opts: &FormatOptions) -> FileBlockDevice {
    let size = opts.blocks_count as u64 * opts.block_size as u64;
    let device = FileBlockDevice::create(name, size).expect("create image file");
    let mut bdev = BlockDev::new(device);
    mkfs::format(&mut bdev, opts).expect("format image");
    bdev.into_inner()
}

/// 单块组小镜像：1024 个 1 KiB 块，128 个 inode
pub fn small_opts() -> FormatOptions {
    FormatOptions {
        blocks_count: 1024,
        inodes_count: 128,
        blocks_per_group: 1024,
        ..Default::default()
    }
}
