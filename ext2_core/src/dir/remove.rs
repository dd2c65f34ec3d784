//! 目录项删除

use super::{entry::DirEntry, lookup::{find_record, walk}};
use crate::{
    block::{Block, BlockDev, BlockDevice},
    error::{Error, ErrorKind, Result},
    inode::Inode,
};

/// 从目录中删除一条记录
///
/// 记录的 inode 字段原地清零，`rec_len` 保持不变，
/// 因此块仍然铺满，该槽位之后可被插入复用。
///
/// # 返回
///
/// 被删除的目录项；名字不存在返回 `NotFound`
pub fn remove_entry<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    dir: &Inode,
    name: &[u8],
) -> Result<DirEntry> {
    if name == b"." || name == b".." {
        return Err(Error::new(ErrorKind::InvalidInput, "Cannot remove dot entries"));
    }
    let (pos, mut rec) = find_record(bdev, dir, name)?
        .ok_or_else(|| Error::new(ErrorKind::NotFound, "Directory entry not found"))?;

    let removed = DirEntry::from_raw(rec.clone());
    let mut block = Block::read(bdev, pos.block as u64)?;
    rec.inode = 0;
    rec.encode(block.data_mut(), pos.offset);
    block.write(bdev)?;
    Ok(removed)
}

/// 目录是否只剩 `.` 和 `..`
pub fn is_dir_empty<D: BlockDevice>(bdev: &mut BlockDev<D>, dir: &Inode) -> Result<bool> {
    let other = walk(bdev, dir, |_, rec| {
        let dot = rec.name == b"." || rec.name == b"..";
        (rec.inode != 0 && !dot).then_some(())
    })?;
    Ok(other.is_none())
}
