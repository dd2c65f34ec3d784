//! Inode 定位与读取

use alloc::vec;

use super::Inode;
use crate::{
    block::{BlockDev, BlockDevice},
    block_group::BgdTable,
    error::{Error, ErrorKind, Result},
    superblock::Superblock,
    types::ext2_inode,
};

/// inode 在磁盘上的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InodeLocation {
    /// 所在块组
    pub group: u32,
    /// 组内下标
    pub index: u32,
    /// 所在 inode 表块
    pub block: u64,
    /// 块内字节偏移
    pub offset: usize,
}

/// 计算 inode 所在的表块和块内偏移
///
/// # 参数
///
/// * `sb` - superblock 引用
/// * `bgdt` - 块组描述符表
/// * `inode_num` - inode 编号（从 1 开始）
///
/// # 说明
///
/// inode 编号从 1 开始，0 表示无效 inode
pub fn locate_inode(sb: &Superblock, bgdt: &BgdTable, inode_num: u32) -> Result<InodeLocation> {
    if inode_num == 0 {
        return Err(Error::new(ErrorKind::InvalidInput, "Invalid inode number (0)"));
    }
    if inode_num > sb.inodes_count() {
        return Err(Error::new(ErrorKind::InvalidInput, "Inode number out of range"));
    }

    let inodes_per_group = sb.inodes_per_group();
    let group = (inode_num - 1) / inodes_per_group;
    let index = (inode_num - 1) % inodes_per_group;

    let block_size = sb.block_size() as u64;
    let byte_offset = index as u64 * sb.inode_size() as u64;
    let table = bgdt.group(group)?.inode_table();

    Ok(InodeLocation {
        group,
        index,
        block: table + byte_offset / block_size,
        offset: (byte_offset % block_size) as usize,
    })
}

/// 从块设备读取 inode
///
/// 读取 inode 所在的整个表块，再从中复制出 `inode_size` 字节。
pub fn read_inode<D: BlockDevice>(
    bdev: &mut BlockDev<D>,
    sb: &Superblock,
    bgdt: &BgdTable,
    inode_num: u32,
) -> Result<Inode> {
    let loc = locate_inode(sb, bgdt, inode_num)?;
    let inode_size = sb.inode_size() as usize;

    let mut block = vec![0u8; sb.block_size() as usize];
    bdev.read_block(loc.block, &mut block)?;

    let inner = ext2_inode::from_bytes(&block[loc.offset..loc.offset + inode_size]);
    Ok(Inode::new(inode_num, inner))
}
