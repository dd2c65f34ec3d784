//! 块分配模块
//!
//! 块号与块组内位下标的换算：`block = first_data_block + group * blocks_per_group + bit`。

mod alloc;
mod free;

pub use self::alloc::*;
pub use free::*;

use crate::superblock::Superblock;

/// 块所在的块组
pub fn get_bgid_of_block(sb: &Superblock, block: u32) -> u32 {
    (block - sb.first_data_block()) / sb.blocks_per_group()
}

/// 块在所属块组位图中的下标
pub fn addr_to_idx_bg(sb: &Superblock, block: u32) -> u32 {
    (block - sb.first_data_block()) % sb.blocks_per_group()
}

/// 块组位图下标转换为块号
pub fn bg_idx_to_addr(sb: &Superblock, idx: u32, bgid: u32) -> u32 {
    sb.group_first_block(bgid) + idx
}
