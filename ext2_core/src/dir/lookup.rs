//! 目录查找与枚举

use alloc::vec::Vec;
use log::warn;

use super::entry::{DirBlockIter, DirEntry};
use crate::{
    block::{Block, BlockDev, BlockDevice},
    block_group::BgdTable,
    consts::*,
    error::{Error, ErrorKind, Result},
    indirect::resolve,
    inode::{read_inode, Inode},
    superblock::Superblock,
    types::ext2_dir_en,
};

/// 一条记录在磁盘上的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RecordPos {
    /// 逻辑块号
    pub logical: u32,
    /// 物理块号
    pub block: u32,
    /// 块内偏移
    pub offset: usize,
}

/// 目录占用的数据块数
pub(crate) fn dir_block_count(dir: &Inode, block_size: u32) -> u32 {
    dir.file_size().div_ceil(block_size as u64) as u32
}

fn ensure_dir(dir: &Inode) -> Result<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(ErrorKind::NotDirectory.into())
    }
}

/// 按顺序遍历目录的每条记录（含空闲槽位）
///
/// 回调返回 `Some` 时停止遍历并返回该值。空洞块跳过；
/// 块内记录不能恰好铺满块时报告 `Corrupted`。
pub(crate) fn walk<D, T, F>(bdev: &mut BlockDev<D>, dir: &Inode, mut f: F) -> Result<Option<T>>
where
    D: BlockDevice,
    F: FnMut(RecordPos, &ext2_dir_en) -> Option<T>,
{
    ensure_dir(dir)?;
    let count = dir_block_count(dir, bdev.block_size());

    for logical in 0..count {
        let Some(phys) = resolve(bdev, dir, logical)? else {
            continue;
        };
        let block = Block::read(bdev, phys as u64)?;
        for item in DirBlockIter::new(block.data()) {
            let (offset, rec) = item.map_err(|e| {
                warn!(
                    "ext2: directory inode {} block {} is not tiled correctly",
                    dir.inode_num(),
                    phys
                );
                e
            })?;
            let pos = RecordPos {
                logical,
                block: phys,
                offset,
            };
            if let Some(v) = f(pos, &rec) {
                return Ok(Some(v));
            }
        }
    }
    Ok(None)
}

/// 在目录中按名字查找
///
/// # 参数
///
/// * `bdev` - 块设备引用
/// * `dir` - 目录 inode
/// * `name` - 名字（先比较长度再比较字节）
///
/// # 返回
///
/// 找到返回 `Some(DirEntry)`，不存在返回 `None`；
/// `dir` 不是目录时返回 `NotDirectory`
pub fn find_entry<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    dir: &Inode,
    name: &[u8],
) -> Result<Option<DirEntry>> {
    Ok(find_record(bdev, dir, name)?.map(|(_, rec)| DirEntry::from_raw(rec)))
}

pub(crate) fn find_record<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    dir: &Inode,
    name: &[u8],
) -> Result<Option<(RecordPos, ext2_dir_en)>> {
    walk(bdev, dir, |pos, rec| {
        let hit = rec.inode != 0 && rec.name.len() == name.len() && rec.name == name;
        hit.then(|| (pos, rec.clone()))
    })
}

/// 取目录中第 `index` 个有效目录项
///
/// 只计数 inode 非 0 的记录；越界返回 `None`。
pub fn read_dir_entry<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    dir: &Inode,
    index: usize,
) -> Result<Option<DirEntry>> {
    let mut seen = 0;
    walk(bdev, dir, |_, rec| {
        if rec.inode == 0 {
            return None;
        }
        if seen == index {
            return Some(DirEntry::from_raw(rec.clone()));
        }
        seen += 1;
        None
    })
}

/// 列出目录中的全部有效目录项
pub fn read_dir<D: BlockDevice>(bdev: &mut BlockDev<D>, dir: &Inode) -> Result<Vec<DirEntry>> {
    let mut entries = Vec::new();
    walk(bdev, dir, |_, rec| {
        if rec.inode != 0 {
            entries.push(DirEntry::from_raw(rec.clone()));
        }
        None::<()>
    })?;
    Ok(entries)
}

/// 从根目录解析绝对路径
///
/// 空的路径分量（连续的 `/`）被忽略，`/` 本身解析为根目录。
///
/// # 返回
///
/// 目标 inode 号
pub fn lookup_path<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    sb: &Superblock,
    bgdt: &BgdTable,
    path: &str,
) -> Result<u32> {
    let mut ino = EXT2_ROOT_INO;
    for component in path.split('/').filter(|c| !c.is_empty()) {
        if component.len() > EXT2_NAME_LEN {
            return Err(ErrorKind::NameTooLong.into());
        }
        let dir = read_inode(bdev, sb, bgdt, ino)?;
        let entry = find_entry(bdev, &dir, component.as_bytes())?
            .ok_or_else(|| Error::new(ErrorKind::NotFound, "Path component not found"))?;
        ino = entry.inode;
    }
    Ok(ino)
}
