//! 逻辑块解析与映射

use super::{block_path, nonzero, BlockPath};
use crate::{
    balloc::alloc_block,
    block::{Block, BlockDev, BlockDevice},
    block_group::BgdTable,
    consts::*,
    error::Result,
    inode::{write_inode, Inode},
    superblock::Superblock,
};

/// 解析逻辑块号对应的物理块
///
/// # 参数
///
/// * `bdev` - 块设备引用
/// * `inode` - 文件 inode
/// * `logical` - 逻辑块号
///
/// # 返回
///
/// 已映射返回 `Some(物理块号)`；空洞（指针链上任一级为 0）返回 `None`。
/// 不分配任何块。
pub fn resolve<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    inode: &Inode,
    logical: u32,
) -> Result<Option<u32>> {
    let ptrs_per_block = bdev.block_size() / 4;

    match block_path(ptrs_per_block, logical)? {
        BlockPath::Direct(i) => Ok(nonzero(inode.block_ptr(i))),
        BlockPath::Indirect(i) => {
            let Some(ind) = nonzero(inode.block_ptr(EXT2_INODE_INDIRECT_BLOCK)) else {
                return Ok(None);
            };
            let block = Block::read(bdev, ind as u64)?;
            Ok(nonzero(block.ptr(i)))
        }
        BlockPath::DoubleIndirect(outer, inner) => {
            let Some(dind) = nonzero(inode.block_ptr(EXT2_INODE_DOUBLE_INDIRECT_BLOCK)) else {
                return Ok(None);
            };
            let block = Block::read(bdev, dind as u64)?;
            let Some(ind) = nonzero(block.ptr(outer)) else {
                return Ok(None);
            };
            let block = Block::read(bdev, ind as u64)?;
            Ok(nonzero(block.ptr(inner)))
        }
    }
}

/// 分配一个块并清零
fn alloc_zeroed_block<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    sb: &mut Superblock,
    bgdt: &mut BgdTable,
) -> Result<u32> {
    let block = alloc_block(bdev, sb, bgdt)?;
    Block::zeroed(bdev, block as u64).write(bdev)?;
    Ok(block)
}

/// 取得 inode 中第 `slot` 个指针指向的间接块，不存在则分配
///
/// 新分配的间接块先清零，再写入 inode 并立即持久化 inode。
fn ensure_inode_child<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    sb: &mut Superblock,
    bgdt: &mut BgdTable,
    inode: &mut Inode,
    slot: usize,
) -> Result<u32> {
    if let Some(block) = nonzero(inode.block_ptr(slot)) {
        return Ok(block);
    }
    let block = alloc_zeroed_block(bdev, sb, bgdt)?;
    inode.set_block_ptr(slot, block);
    inode.add_block(sb.block_size());
    write_inode(bdev, sb, bgdt, inode)?;
    Ok(block)
}

/// 在间接块的第 `idx` 项写入 `phys`，同步维护 inode 的扇区计数
fn store_in_indirect<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    sb: &Superblock,
    inode: &mut Inode,
    indirect: u32,
    idx: usize,
    phys: u32,
) -> Result<()> {
    let mut block = Block::read(bdev, indirect as u64)?;
    account(inode, sb.block_size(), block.ptr(idx), phys);
    block.set_ptr(idx, phys);
    block.write(bdev)
}

/// 指针从 0 变为非 0 记一块，反之减一块
fn account(inode: &mut Inode, block_size: u32, old: u32, new: u32) {
    match (old, new) {
        (0, n) if n != 0 => inode.add_block(block_size),
        (o, 0) if o != 0 => inode.sub_block(block_size),
        _ => {}
    }
}

/// 设置逻辑块号对应的物理块
///
/// # 参数
///
/// * `bdev` - 块设备引用
/// * `sb` - superblock 可变引用
/// * `bgdt` - 块组描述符表
/// * `inode` - 文件 inode（会被修改并写回）
/// * `logical` - 逻辑块号
/// * `phys` - 物理块号，0 表示解除映射（不释放原块）
///
/// # 说明
///
/// 途经的间接块不存在时按需分配：分配、清零、写入父结构并持久化父结构，
/// 然后才操作子块。二级间接块中的新指针写入后立即写回二级间接块。
pub fn set_block<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    sb: &mut Superblock,
    bgdt: &mut BgdTable,
    inode: &mut Inode,
    logical: u32,
    phys: u32,
) -> Result<()> {
    let block_size = sb.block_size();

    match block_path(sb.ptrs_per_block(), logical)? {
        BlockPath::Direct(i) => {
            let old = inode.block_ptr(i);
            account(inode, block_size, old, phys);
            inode.set_block_ptr(i, phys);
        }
        BlockPath::Indirect(i) => {
            let ind = ensure_inode_child(bdev, sb, bgdt, inode, EXT2_INODE_INDIRECT_BLOCK)?;
            store_in_indirect(bdev, sb, inode, ind, i, phys)?;
        }
        BlockPath::DoubleIndirect(outer, inner) => {
            let dind = ensure_inode_child(bdev, sb, bgdt, inode, EXT2_INODE_DOUBLE_INDIRECT_BLOCK)?;
            let mut dblock = Block::read(bdev, dind as u64)?;
            let ind = match nonzero(dblock.ptr(outer)) {
                Some(ind) => ind,
                None => {
                    let ind = alloc_zeroed_block(bdev, sb, bgdt)?;
                    dblock.set_ptr(outer, ind);
                    dblock.write(bdev)?;
                    inode.add_block(block_size);
                    ind
                }
            };
            store_in_indirect(bdev, sb, inode, ind, inner, phys)?;
        }
    }

    write_inode(bdev, sb, bgdt, inode)
}

/// 解析逻辑块，未映射时分配一个清零的数据块并建立映射
///
/// 返回物理块号和是否为新分配。
pub fn resolve_or_alloc<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    sb: &mut Superblock,
    bgdt: &mut BgdTable,
    inode: &mut Inode,
    logical: u32,
) -> Result<(u32, bool)> {
    if let Some(phys) = resolve(bdev, inode, logical)? {
        return Ok((phys, false));
    }
    let phys = alloc_zeroed_block(bdev, sb, bgdt)?;
    set_block(bdev, sb, bgdt, inode, logical, phys)?;
    Ok((phys, true))
}
