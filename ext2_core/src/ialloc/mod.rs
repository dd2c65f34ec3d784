//! Inode 分配模块

mod alloc;
mod free;

pub use self::alloc::*;
pub use free::*;

use crate::consts::EXT2_INODE_BITMAP_FIRST_BIT;
use crate::superblock::Superblock;

/// inode 所在的块组
pub fn get_bgid_of_inode(sb: &Superblock, inode: u32) -> u32 {
    (inode - 1) / sb.inodes_per_group()
}

/// inode 在所属块组位图中的下标
pub fn inode_to_bgidx(sb: &Superblock, inode: u32) -> u32 {
    (inode - 1) % sb.inodes_per_group()
}

/// 块组位图下标转换为 inode 编号
pub fn bgidx_to_inode(sb: &Superblock, index: u32, bgid: u32) -> u32 {
    bgid * sb.inodes_per_group() + index + 1
}

/// 块组内开始搜索的位
///
/// 每个块组的前 11 位都不参与分配，0 号组中对应保留 inode 1..=11。
pub fn first_search_bit() -> u32 {
    EXT2_INODE_BITMAP_FIRST_BIT
}
