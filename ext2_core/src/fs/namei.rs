//! 名字空间操作：创建、建目录、删除

use log::debug;

use super::filesystem::Ext2FileSystem;
use crate::{
    block::{Block, BlockDevice},
    dir,
    error::{Error, ErrorKind, Result},
    ialloc,
    indirect::release_blocks,
    inode::{self, FileType, Inode, InodeAttrs},
};

impl<D: BlockDevice> Ext2FileSystem<D> {
    /// 读取父目录并确认新名字可用
    fn prepare_new_entry(&mut self, parent: u32, name: &str) -> Result<Inode> {
        self.check_writable()?;
        dir::validate_name(name.as_bytes())?;
        let dir = self.read_inode(parent)?;
        if dir::find_entry(&mut self.bdev, &dir, name.as_bytes())?.is_some() {
            return Err(Error::new(ErrorKind::AlreadyExists, "Directory entry already exists"));
        }
        Ok(dir)
    }

    /// 把子节点链接进父目录并更新父目录时间
    fn link_child(&mut self, parent: &mut Inode, name: &str, child: u32, ftype: FileType, time: u32) -> Result<()> {
        dir::add_entry(
            &mut self.bdev,
            &mut self.sb,
            &mut self.bgdt,
            parent,
            name.as_bytes(),
            child,
            ftype,
        )?;
        parent.set_mtime(time);
        parent.set_ctime(time);
        self.write_inode(parent)
    }

    /// 在目录中创建普通文件
    ///
    /// # 参数
    ///
    /// * `parent` - 父目录 inode 号
    /// * `name` - 文件名
    /// * `attrs` - 权限、属主和时间
    ///
    /// # 返回
    ///
    /// 新文件的 inode 号。新 inode 链接数为 1，大小为 0。
    pub fn create(&mut self, parent: u32, name: &str, attrs: &InodeAttrs) -> Result<u32> {
        let mut dir = self.prepare_new_entry(parent, name)?;

        let ino = self.alloc_inode()?;
        let child = Inode::create(ino, self.sb.inode_size(), FileType::RegularFile, attrs);
        self.write_inode(&child)?;
        self.link_child(&mut dir, name, ino, FileType::RegularFile, attrs.time)?;

        debug!("ext2: created {:?} as inode {} in dir {}", name, ino, parent);
        Ok(ino)
    }

    /// 创建子目录
    ///
    /// 先完整构建新目录（inode、`.` 与 `..` 数据块、块组目录计数），
    /// 再把它链接进父目录并增加父目录的链接数。
    ///
    /// # 返回
    ///
    /// 新目录的 inode 号
    pub fn mkdir(&mut self, parent: u32, name: &str, attrs: &InodeAttrs) -> Result<u32> {
        let mut dir = self.prepare_new_entry(parent, name)?;

        let ino = self.alloc_inode()?;
        let block_size = self.sb.block_size();
        let data_block = self.alloc_block()?;
        let mut block = Block::zeroed(&self.bdev, data_block as u64);
        dir::init_dir_block(block.data_mut(), ino, parent, self.sb.has_filetype());
        block.write(&mut self.bdev)?;

        let mut child = Inode::create(ino, self.sb.inode_size(), FileType::Directory, attrs);
        child.set_links_count(2);
        child.set_block_ptr(0, data_block);
        child.add_block(block_size);
        child.set_file_size(block_size as u64);
        self.write_inode(&child)?;

        self.bgdt.group_mut(ialloc::get_bgid_of_inode(&self.sb, ino))?.inc_used_dirs();
        self.bgdt.flush(&mut self.bdev)?;

        dir.inc_links();
        self.link_child(&mut dir, name, ino, FileType::Directory, attrs.time)?;

        debug!("ext2: mkdir {:?} as inode {} in dir {}", name, ino, parent);
        Ok(ino)
    }

    /// 查找并读取目录中的子节点
    fn child_of(&mut self, parent: u32, name: &str) -> Result<(Inode, Inode)> {
        self.check_writable()?;
        if name == "." || name == ".." {
            return Err(Error::new(ErrorKind::InvalidInput, "Cannot remove dot entries"));
        }
        let dir = self.read_inode(parent)?;
        let entry = dir::find_entry(&mut self.bdev, &dir, name.as_bytes())?
            .ok_or_else(|| Error::new(ErrorKind::NotFound, "Directory entry not found"))?;
        let child = self.read_inode(entry.inode)?;
        Ok((dir, child))
    }

    /// 释放 inode 的数据块并归还 inode 号
    fn destroy_inode(&mut self, mut child: Inode, now: u32) -> Result<()> {
        let is_dir = child.is_dir();
        release_blocks(&mut self.bdev, &mut self.sb, &mut self.bgdt, &mut child)?;
        child.set_links_count(0);
        child.set_dtime(now);
        inode::write_inode(&mut self.bdev, &self.sb, &self.bgdt, &child)?;
        ialloc::free_inode(&mut self.bdev, &mut self.sb, &mut self.bgdt, child.inode_num(), is_dir)
    }

    /// 删除目录中的非目录项
    ///
    /// 链接数减一，降到 0 时释放数据块和 inode。
    pub fn unlink(&mut self, parent: u32, name: &str, now: u32) -> Result<()> {
        let (mut dir, mut child) = self.child_of(parent, name)?;
        if child.is_dir() {
            return Err(ErrorKind::IsDirectory.into());
        }

        dir::remove_entry(&mut self.bdev, &dir, name.as_bytes())?;
        dir.set_mtime(now);
        dir.set_ctime(now);
        self.write_inode(&dir)?;

        child.dec_links();
        child.set_ctime(now);
        if child.links_count() == 0 {
            self.destroy_inode(child, now)?;
        } else {
            self.write_inode(&child)?;
        }
        debug!("ext2: unlinked {:?} from dir {}", name, parent);
        Ok(())
    }

    /// 删除空目录
    pub fn rmdir(&mut self, parent: u32, name: &str, now: u32) -> Result<()> {
        let (mut dir, child) = self.child_of(parent, name)?;
        if !child.is_dir() {
            return Err(ErrorKind::NotDirectory.into());
        }
        if !dir::is_dir_empty(&mut self.bdev, &child)? {
            return Err(ErrorKind::NotEmpty.into());
        }

        dir::remove_entry(&mut self.bdev, &dir, name.as_bytes())?;
        dir.dec_links();
        dir.set_mtime(now);
        dir.set_ctime(now);
        self.write_inode(&dir)?;

        self.destroy_inode(child, now)?;
        debug!("ext2: removed directory {:?} from dir {}", name, parent);
        Ok(())
    }
}
