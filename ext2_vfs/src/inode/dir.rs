//! 该模块实现目录节点的操作，包括目录条目查找、读取、创建和删除。

use alloc::string::String;

use ext2_core::{InodeAttrs, ENOENT, ENOTDIR, EXT2_ROOT_INO};

use crate::{error::Context, util::now_secs, BlockDevice, Ext2Error, Ext2Result, SystemHal};

use super::{attr::mask_to_mode, FsNode, InodeType};

/// 目录条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub ino: u32,
    pub name: String,
    pub kind: InodeType,
}

impl<Hal: SystemHal, Dev: BlockDevice> FsNode<Hal, Dev> {
    /// 非目录节点返回 ENOTDIR
    fn ensure_dir(&self) -> Ext2Result<()> {
        if self.is_dir() {
            Ok(())
        } else {
            Err(Ext2Error::new(ENOTDIR, "not a directory"))
        }
    }

    /// 新节点的属性：权限来自 mode，属主和时间来自 HAL
    fn new_attrs(mode: u32) -> InodeAttrs {
        let (uid, gid) = Hal::credentials();
        InodeAttrs {
            perm: mask_to_mode(mode),
            uid,
            gid,
            time: now_secs::<Hal>(),
        }
    }

    /// 在目录中查找指定名称的条目
    pub fn finddir(&self, name: &str) -> Ext2Result<FsNode<Hal, Dev>> {
        self.ensure_dir()?;
        let inode = {
            let mut fs = self.fs.lock();
            let entry = fs
                .find(self.ino, name)
                .context("finddir")?
                .ok_or_else(|| Ext2Error::new(ENOENT, "finddir"))?;
            fs.read_inode(entry.inode).context("finddir")?
        };
        Ok(FsNode::from_inode(self.fs.clone(), name, &inode))
    }

    /// 读取目录中第 `index` 个条目，越界返回 `None`
    pub fn readdir(&self, index: usize) -> Ext2Result<Option<DirEntry>> {
        self.ensure_dir()?;
        let entry = self.fs.lock().read_dir_entry(self.ino, index).context("readdir")?;
        Ok(entry.map(|e| DirEntry {
            ino: e.inode,
            name: String::from_utf8_lossy(&e.name).into_owned(),
            kind: e.kind().into(),
        }))
    }

    /// 在目录中创建普通文件
    pub fn create(&mut self, name: &str, mode: u32) -> Ext2Result<FsNode<Hal, Dev>> {
        self.ensure_dir()?;
        let attrs = Self::new_attrs(mode);
        let ino = self.fs.lock().create(self.ino, name, &attrs).context("create")?;
        self.refresh()?;
        FsNode::load(self.fs.clone(), ino, name)
    }

    /// 创建子目录
    pub fn mkdir(&mut self, name: &str, mode: u32) -> Ext2Result<FsNode<Hal, Dev>> {
        self.ensure_dir()?;
        let attrs = Self::new_attrs(mode);
        let ino = self.fs.lock().mkdir(self.ino, name, &attrs).context("mkdir")?;
        self.refresh()?;
        FsNode::load(self.fs.clone(), ino, name)
    }

    /// 删除目录中的文件
    pub fn unlink(&mut self, name: &str) -> Ext2Result<()> {
        self.ensure_dir()?;
        self.fs
            .lock()
            .unlink(self.ino, name, now_secs::<Hal>())
            .context("unlink")?;
        self.refresh()
    }

    /// 删除空子目录
    pub fn rmdir(&mut self, name: &str) -> Ext2Result<()> {
        self.ensure_dir()?;
        self.fs
            .lock()
            .rmdir(self.ino, name, now_secs::<Hal>())
            .context("rmdir")?;
        self.refresh()
    }

    /// 解析路径
    ///
    /// 以 `/` 开头时从根目录开始，否则从当前节点开始。
    pub fn lookup(&self, path: &str) -> Ext2Result<FsNode<Hal, Dev>> {
        let mut node = if path.starts_with('/') {
            FsNode::load(self.fs.clone(), EXT2_ROOT_INO, "/")?
        } else {
            self.clone()
        };
        for component in path.split('/').filter(|c| !c.is_empty()) {
            node = node.finddir(component)?;
        }
        Ok(node)
    }
}
