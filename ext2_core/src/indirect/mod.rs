//! 间接块寻址
//!
//! 把文件内的逻辑块号映射为物理块号：
//!
//! - `0..12`：inode 中的直接指针
//! - `12..12+P`：一级间接块（P = block_size / 4）
//! - `12+P..12+P+P²`：二级间接块，外层下标 `(n-12-P)/P`，内层下标 `(n-12-P)%P`
//!
//! 更大的逻辑块号需要三级间接块，未实现，报告 `FileTooLarge`。
//! 块指针 0 表示未分配，对外统一以 `Option<u32>` 表示。

mod map;
mod release;

pub use map::*;
pub use release::*;

use crate::consts::EXT2_INODE_DIRECT_BLOCKS;
use crate::error::{Error, ErrorKind, Result};

/// 逻辑块在指针树中的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockPath {
    /// 直接指针下标
    Direct(usize),
    /// 一级间接块内的下标
    Indirect(usize),
    /// 二级间接块内的（外层, 内层）下标
    DoubleIndirect(usize, usize),
}

/// 计算逻辑块号对应的位置
///
/// # 参数
///
/// * `ptrs_per_block` - 每个间接块容纳的指针数
/// * `logical` - 逻辑块号
pub fn block_path(ptrs_per_block: u32, logical: u32) -> Result<BlockPath> {
    let p = ptrs_per_block as u64;
    let direct = EXT2_INODE_DIRECT_BLOCKS as u64;
    let n = logical as u64;

    if n < direct {
        return Ok(BlockPath::Direct(n as usize));
    }
    let n = n - direct;
    if n < p {
        return Ok(BlockPath::Indirect(n as usize));
    }
    let n = n - p;
    if n < p * p {
        return Ok(BlockPath::DoubleIndirect((n / p) as usize, (n % p) as usize));
    }

    Err(Error::new(
        ErrorKind::FileTooLarge,
        "Logical block beyond double-indirect range",
    ))
}

/// 块指针 0 表示未分配
pub(crate) fn nonzero(ptr: u32) -> Option<u32> {
    (ptr != 0).then_some(ptr)
}
