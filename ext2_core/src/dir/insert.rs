//! 目录项插入
//!
//! 插入分两步：先扫描目录得到 [`InsertSlot`]，再按槽位类型落盘。

use log::trace;

use super::{
    entry::validate_name,
    lookup::{dir_block_count, walk, RecordPos},
};
use crate::{
    block::{Block, BlockDev, BlockDevice},
    block_group::BgdTable,
    error::{Error, ErrorKind, Result},
    indirect::resolve_or_alloc,
    inode::{write_inode, FileType, Inode},
    superblock::Superblock,
    types::ext2_dir_en,
};

/// 扫描得到的插入位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertSlot {
    /// 复用一个 inode 为 0 且足够大的记录
    FreeSlot { block: u32, offset: usize },
    /// 收缩目录最后一条记录，用剩余空间放新记录
    SplitLast { block: u32, offset: usize },
    /// 目录末尾追加一个新块
    AppendBlock,
}

/// 扫描目录，选出新名字的插入位置
///
/// 优先使用遇到的第一个足够大的空闲记录；否则看最后一条记录
/// 收缩到最小长度后余下的空间是否够用；都不行则追加新块。
/// 名字已存在时返回 `AlreadyExists`。
pub fn find_insert_slot<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    dir: &Inode,
    name: &[u8],
) -> Result<InsertSlot> {
    let required = ext2_dir_en::min_rec_len(name.len());
    let mut free: Option<RecordPos> = None;
    let mut last: Option<(RecordPos, usize)> = None;

    let dup = walk(bdev, dir, |pos, rec| {
        if rec.inode != 0 && rec.name == name {
            return Some(());
        }
        if rec.inode == 0 && free.is_none() && rec.rec_len as usize >= required {
            free = Some(pos);
        }
        let used = if rec.inode == 0 { 0 } else { rec.required_len() };
        last = Some((pos, rec.rec_len as usize - used));
        None
    })?;
    if dup.is_some() {
        return Err(Error::new(ErrorKind::AlreadyExists, "Directory entry already exists"));
    }

    if let Some(pos) = free {
        return Ok(InsertSlot::FreeSlot {
            block: pos.block,
            offset: pos.offset,
        });
    }
    match last {
        Some((pos, slack)) if slack >= required => Ok(InsertSlot::SplitLast {
            block: pos.block,
            offset: pos.offset,
        }),
        _ => Ok(InsertSlot::AppendBlock),
    }
}

/// 向目录插入一条记录
///
/// # 参数
///
/// * `bdev` - 块设备引用
/// * `sb` - superblock 可变引用
/// * `bgdt` - 块组描述符表
/// * `dir` - 目录 inode（追加块时会修改并写回）
/// * `name` - 新名字
/// * `child` - 新记录指向的 inode 号
/// * `ftype` - 新记录的文件类型，仅在启用 FILETYPE 时写入
///
/// # 说明
///
/// 完成后被修改的块仍满足铺满规则，且恰好多出一条有效记录。
pub fn add_entry<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    sb: &mut Superblock,
    bgdt: &mut BgdTable,
    dir: &mut Inode,
    name: &[u8],
    child: u32,
    ftype: FileType,
) -> Result<()> {
    validate_name(name)?;
    if child == 0 {
        return Err(Error::new(ErrorKind::InvalidInput, "Directory entry needs a nonzero inode"));
    }
    let de_type = if sb.has_filetype() { ftype.dir_entry_type() } else { 0 };

    let slot = find_insert_slot(bdev, dir, name)?;
    trace!("ext2: insert {:?} into dir {} via {:?}", name, dir.inode_num(), slot);

    match slot {
        InsertSlot::FreeSlot { block, offset } => {
            let mut buf = Block::read(bdev, block as u64)?;
            let old = ext2_dir_en::decode(buf.data(), offset)?;
            ext2_dir_en::new(child, old.rec_len, name, de_type).encode(buf.data_mut(), offset);
            buf.write(bdev)
        }
        InsertSlot::SplitLast { block, offset } => {
            let mut buf = Block::read(bdev, block as u64)?;
            let mut last = ext2_dir_en::decode(buf.data(), offset)?;
            let keep = if last.inode == 0 { 0 } else { last.required_len() };
            let rest = last.rec_len as usize - keep;
            if keep > 0 {
                last.rec_len = keep as u32;
                last.encode(buf.data_mut(), offset);
            }
            ext2_dir_en::new(child, rest as u32, name, de_type).encode(buf.data_mut(), offset + keep);
            buf.write(bdev)
        }
        InsertSlot::AppendBlock => {
            let block_size = sb.block_size();
            let logical = dir_block_count(dir, block_size);
            let (phys, _) = resolve_or_alloc(bdev, sb, bgdt, dir, logical)?;

            let mut buf = Block::zeroed(bdev, phys as u64);
            ext2_dir_en::new(child, block_size, name, de_type).encode(buf.data_mut(), 0);
            buf.write(bdev)?;

            dir.set_file_size((logical as u64 + 1) * block_size as u64);
            write_inode(bdev, sb, bgdt, dir)
        }
    }
}
