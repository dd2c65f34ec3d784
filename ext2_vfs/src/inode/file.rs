//! 该模块实现文件节点的数据读写。

use ext2_core::EISDIR;

use crate::{error::Context, util::now_secs, BlockDevice, Ext2Error, Ext2Result, SystemHal};

use super::FsNode;

impl<Hal: SystemHal, Dev: BlockDevice> FsNode<Hal, Dev> {
    /// 从偏移量 `offset` 处读取数据
    ///
    /// 返回实际读取的字节数，到达文件末尾时为 0。
    pub fn read(&self, offset: u64, buf: &mut [u8]) -> Ext2Result<usize> {
        if self.is_dir() {
            return Err(Ext2Error::new(EISDIR, "read"));
        }
        self.fs.lock().read_at(self.ino, offset, buf).context("read")
    }

    /// 向偏移量 `offset` 处写入数据
    ///
    /// 写入后根据系统时间更新修改时间和状态修改时间。
    pub fn write(&mut self, offset: u64, data: &[u8]) -> Ext2Result<usize> {
        if self.is_dir() {
            return Err(Ext2Error::new(EISDIR, "write"));
        }
        let now = now_secs::<Hal>();
        let inode = {
            let mut fs = self.fs.lock();
            let written = fs.write_at(self.ino, offset, data).context("write")?;
            if written == 0 || now == 0 {
                fs.read_inode(self.ino).context("write")?
            } else {
                fs.modify_inode(self.ino, |inode| {
                    inode.set_mtime(now);
                    inode.set_ctime(now);
                })
                .context("write")?
            }
        };
        self.apply(&inode);
        Ok(data.len())
    }
}
