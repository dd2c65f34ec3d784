//! 位图操作
//!
//! 块位图和 inode 位图共用的位操作，位序与 ext2 一致：
//! 第 `i` 位位于字节 `i / 8` 的第 `i % 8` 位（低位在前）。

use crate::error::{Error, ErrorKind, Result};

fn locate(bitmap: &[u8], idx: u32) -> Result<(usize, u8)> {
    let byte = (idx / 8) as usize;
    if byte >= bitmap.len() {
        return Err(Error::new(ErrorKind::InvalidInput, "Bitmap index out of range"));
    }
    Ok((byte, 1u8 << (idx % 8)))
}

/// 检查某一位是否被置位
pub fn test_bit(bitmap: &[u8], idx: u32) -> Result<bool> {
    let (byte, mask) = locate(bitmap, idx)?;
    Ok(bitmap[byte] & mask != 0)
}

/// 置位
pub fn set_bit(bitmap: &mut [u8], idx: u32) -> Result<()> {
    let (byte, mask) = locate(bitmap, idx)?;
    bitmap[byte] |= mask;
    Ok(())
}

/// 清位
pub fn clear_bit(bitmap: &mut [u8], idx: u32) -> Result<()> {
    let (byte, mask) = locate(bitmap, idx)?;
    bitmap[byte] &= !mask;
    Ok(())
}

/// 在 `[start, end)` 范围内查找第一个为 0 的位
///
/// `end` 会被截断到位图的实际位数。整字节为 0xFF 时直接跳过。
pub fn find_first_zero(bitmap: &[u8], start: u32, end: u32) -> Option<u32> {
    let end = end.min((bitmap.len() * 8) as u32);
    let mut idx = start;
    while idx < end {
        let byte = bitmap[(idx / 8) as usize];
        if idx % 8 == 0 && byte == 0xFF {
            idx += 8;
            continue;
        }
        if byte & (1 << (idx % 8)) == 0 {
            return Some(idx);
        }
        idx += 1;
    }
    None
}
