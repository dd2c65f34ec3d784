//! 文件数据读写

use super::filesystem::Ext2FileSystem;
use crate::{
    block::{Block, BlockDevice},
    error::{Error, ErrorKind, Result},
    indirect::{resolve, resolve_or_alloc},
};

/// 字节位置对应的逻辑块号
fn logical_block(pos: u64, block_size: u64) -> Result<u32> {
    u32::try_from(pos / block_size).map_err(|_| ErrorKind::FileTooLarge.into())
}

impl<D: BlockDevice> Ext2FileSystem<D> {
    /// 从文件 `offset` 处读取数据
    ///
    /// # 参数
    ///
    /// * `ino` - 文件 inode 号
    /// * `offset` - 起始字节偏移
    /// * `buf` - 目标缓冲区
    ///
    /// # 返回
    ///
    /// 实际读取的字节数，超过文件大小的部分不读；空洞读出为 0
    pub fn read_at(&mut self, ino: u32, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let inode = self.read_inode(ino)?;
        if inode.is_dir() {
            return Err(ErrorKind::IsDirectory.into());
        }

        let size = inode.file_size();
        if offset >= size {
            return Ok(0);
        }
        let len = buf.len().min((size - offset) as usize);
        let block_size = self.sb.block_size() as u64;

        let mut done = 0;
        while done < len {
            let pos = offset + done as u64;
            let within = (pos % block_size) as usize;
            let n = (block_size as usize - within).min(len - done);
            let dst = &mut buf[done..done + n];

            match resolve(&mut self.bdev, &inode, logical_block(pos, block_size)?)? {
                Some(phys) => {
                    let block = Block::read(&mut self.bdev, phys as u64)?;
                    dst.copy_from_slice(&block.data()[within..within + n]);
                }
                None => dst.fill(0),
            }
            done += n;
        }
        Ok(len)
    }

    /// 向文件 `offset` 处写入数据
    ///
    /// 缺失的块按需分配，部分覆盖的块先读后写；
    /// 写入结束位置超过文件大小时扩展文件。
    ///
    /// # 返回
    ///
    /// 写入的字节数
    pub fn write_at(&mut self, ino: u32, offset: u64, data: &[u8]) -> Result<usize> {
        self.check_writable()?;
        let mut inode = self.read_inode(ino)?;
        if inode.is_dir() {
            return Err(ErrorKind::IsDirectory.into());
        }
        if data.is_empty() {
            return Ok(0);
        }
        let end = offset
            .checked_add(data.len() as u64)
            .ok_or_else(|| Error::new(ErrorKind::FileTooLarge, "Write past the maximum file offset"))?;
        let block_size = self.sb.block_size() as u64;

        let mut done = 0;
        while done < data.len() {
            let pos = offset + done as u64;
            let within = (pos % block_size) as usize;
            let n = (block_size as usize - within).min(data.len() - done);
            let logical = logical_block(pos, block_size)?;

            let (phys, fresh) =
                resolve_or_alloc(&mut self.bdev, &mut self.sb, &mut self.bgdt, &mut inode, logical)?;
            let mut block = if fresh || n == block_size as usize {
                Block::zeroed(&self.bdev, phys as u64)
            } else {
                Block::read(&mut self.bdev, phys as u64)?
            };
            block.data_mut()[within..within + n].copy_from_slice(&data[done..done + n]);
            block.write(&mut self.bdev)?;
            done += n;
        }

        if end > inode.file_size() {
            inode.set_file_size(end);
        }
        self.write_inode(&inode)?;
        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use crate::block::MemDevice;
    use crate::error::ErrorKind;
    use crate::fs::{Ext2FileSystem, FsConfig};
    use crate::inode::{InodeAttrs, InodeMode};
    use crate::mkfs::{self, FormatOptions};
    use crate::block::BlockDev;
    use crate::consts::EXT2_ROOT_INO;

    fn mounted() -> Ext2FileSystem<MemDevice> {
        let mut bdev = BlockDev::new(MemDevice::new(1024 * 1024));
        let opts = FormatOptions {
            blocks_count: 1024,
            inodes_count: 128,
            ..Default::default()
        };
        mkfs::format(&mut bdev, &opts).unwrap();
        Ext2FileSystem::mount(bdev.into_inner(), FsConfig::default(), 0).unwrap()
    }

    fn new_file(fs: &mut Ext2FileSystem<MemDevice>) -> u32 {
        let attrs = InodeAttrs::new(InodeMode::from_bits_truncate(0o644));
        fs.create(EXT2_ROOT_INO, "data", &attrs).unwrap()
    }

    #[test]
    fn test_multi_block_roundtrip() {
        let mut fs = mounted();
        let ino = new_file(&mut fs);
        let data: Vec<u8> = (0..3 * 1024 + 37).map(|i| (i * 7 % 251) as u8).collect();

        assert_eq!(fs.write_at(ino, 5, &data).unwrap(), data.len());
        assert_eq!(fs.read_inode(ino).unwrap().file_size(), 5 + data.len() as u64);

        let mut back = vec![0u8; data.len()];
        assert_eq!(fs.read_at(ino, 5, &mut back).unwrap(), data.len());
        assert_eq!(back, data);

        // 前 5 字节从未写过
        let mut head = [0xFFu8; 5];
        fs.read_at(ino, 0, &mut head).unwrap();
        assert_eq!(head, [0; 5]);
    }

    #[test]
    fn test_read_clamps_and_holes() {
        let mut fs = mounted();
        let ino = new_file(&mut fs);
        fs.write_at(ino, 5000, b"tail").unwrap();

        let mut buf = vec![0xAAu8; 8192];
        assert_eq!(fs.read_at(ino, 0, &mut buf).unwrap(), 5004);
        assert!(buf[..5000].iter().all(|&b| b == 0));
        assert_eq!(&buf[5000..5004], b"tail");
        assert_eq!(fs.read_at(ino, 5004, &mut buf).unwrap(), 0);

        // 只分配了最后一个块
        assert_eq!(fs.read_inode(ino).unwrap().sectors(), 2);
    }

    #[test]
    fn test_overwrite_keeps_neighbours() {
        let mut fs = mounted();
        let ino = new_file(&mut fs);
        fs.write_at(ino, 0, &[b'a'; 2048]).unwrap();
        fs.write_at(ino, 1020, b"XXXXXXXX").unwrap();

        let mut buf = vec![0u8; 2048];
        fs.read_at(ino, 0, &mut buf).unwrap();
        assert!(buf[..1020].iter().all(|&b| b == b'a'));
        assert_eq!(&buf[1020..1028], b"XXXXXXXX");
        assert!(buf[1028..].iter().all(|&b| b == b'a'));
        assert_eq!(fs.read_inode(ino).unwrap().file_size(), 2048);
    }

    #[test]
    fn test_write_near_max_offset() {
        let mut fs = mounted();
        let ino = new_file(&mut fs);
        let before = fs.stat();

        let err = fs.write_at(ino, u64::MAX - 1, b"xyz").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileTooLarge);
        let err = fs.write_at(ino, u64::MAX - 10, b"x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileTooLarge);

        let inode = fs.read_inode(ino).unwrap();
        assert_eq!(inode.file_size(), 0);
        assert_eq!(inode.sectors(), 0);
        assert_eq!(fs.stat(), before);
    }

    #[test]
    fn test_directory_io_rejected() {
        let mut fs = mounted();
        let mut buf = [0u8; 4];
        assert_eq!(fs.read_at(EXT2_ROOT_INO, 0, &mut buf).unwrap_err().kind(), ErrorKind::IsDirectory);
        assert_eq!(fs.write_at(EXT2_ROOT_INO, 0, b"x").unwrap_err().kind(), ErrorKind::IsDirectory);
    }
}
