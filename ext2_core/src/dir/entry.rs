//! 目录记录的解码视图与块内遍历

use alloc::vec::Vec;

use crate::{
    consts::*,
    error::{Error, ErrorKind, Result},
    inode::FileType,
    types::ext2_dir_en,
};

/// 一条有效目录项（inode 非 0）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// 指向的 inode 号
    pub inode: u32,
    /// 名字字节，不含结尾 NUL
    pub name: Vec<u8>,
    /// 原始类型字节，未启用 FILETYPE 时为 0
    pub file_type: u8,
}

impl DirEntry {
    pub(crate) fn from_raw(raw: ext2_dir_en) -> Self {
        Self {
            inode: raw.inode,
            name: raw.name,
            file_type: raw.file_type,
        }
    }

    /// 名字的 UTF-8 视图
    pub fn name_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.name).ok()
    }

    /// 类型字段对应的文件类型
    pub fn kind(&self) -> FileType {
        FileType::from_dir_entry_type(self.file_type)
    }

    /// 是否为 `.` 或 `..`
    pub fn is_dot(&self) -> bool {
        self.name == b"." || self.name == b".."
    }
}

/// 块内记录迭代器
///
/// 以 `rec_len` 为步长前进，产出 `(块内偏移, 记录)`。
/// 遇到损坏的记录时产出一次错误后结束。
pub struct DirBlockIter<'a> {
    data: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> DirBlockIter<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            failed: false,
        }
    }
}

impl Iterator for DirBlockIter<'_> {
    type Item = Result<(usize, ext2_dir_en)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.data.len() {
            return None;
        }
        match ext2_dir_en::decode(self.data, self.offset) {
            Ok(rec) => {
                let offset = self.offset;
                self.offset += rec.rec_len as usize;
                Some(Ok((offset, rec)))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// 初始化新目录的第一个数据块：`.` 占 12 字节，`..` 占余下全部
///
/// # 参数
///
/// * `data` - 块数据（长度为块大小）
/// * `self_ino` - 目录自身的 inode 号
/// * `parent_ino` - 父目录的 inode 号
/// * `filetype` - 是否写入类型字段
pub fn init_dir_block(data: &mut [u8], self_ino: u32, parent_ino: u32, filetype: bool) {
    let de_type = if filetype { EXT2_DE_DIR } else { EXT2_DE_UNKNOWN };
    let dot_len = ext2_dir_en::min_rec_len(1);

    data.fill(0);
    ext2_dir_en::new(self_ino, dot_len as u32, b".", de_type).encode(data, 0);
    ext2_dir_en::new(parent_ino, (data.len() - dot_len) as u32, b"..", de_type).encode(data, dot_len);
}

/// 检查目录项名字是否合法
///
/// 名字不能为空，不能含 `/` 或 NUL，长度不超过 255 字节。
pub fn validate_name(name: &[u8]) -> Result<()> {
    if name.is_empty() || name.contains(&b'/') || name.contains(&0) {
        return Err(Error::new(ErrorKind::InvalidInput, "Invalid directory entry name"));
    }
    if name.len() > EXT2_NAME_LEN {
        return Err(ErrorKind::NameTooLong.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_dir_block_tiles() {
        let mut data = vec![0xAAu8; 1024];
        init_dir_block(&mut data, 12, 2, true);

        let recs: Vec<_> = DirBlockIter::new(&data).map(|r| r.unwrap()).collect();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].0, 0);
        assert_eq!(recs[0].1.name, b".");
        assert_eq!(recs[0].1.rec_len, 12);
        assert_eq!(recs[0].1.inode, 12);
        assert_eq!(recs[1].0, 12);
        assert_eq!(recs[1].1.name, b"..");
        assert_eq!(recs[1].1.rec_len, 1012);
        assert_eq!(recs[1].1.inode, 2);
        assert_eq!(recs[1].1.file_type, EXT2_DE_DIR);
    }

    #[test]
    fn test_iter_stops_on_corruption() {
        let mut data = vec![0u8; 1024];
        init_dir_block(&mut data, 2, 2, false);
        // `..` 的 rec_len 改为越过块尾
        data[12 + 4] = 0xFC;
        data[12 + 5] = 0x0F;

        let items: Vec<_> = DirBlockIter::new(&data).collect();
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert_eq!(items[1].as_ref().unwrap_err().kind(), ErrorKind::Corrupted);
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name(b"foo").is_ok());
        assert_eq!(validate_name(b"").unwrap_err().kind(), ErrorKind::InvalidInput);
        assert_eq!(validate_name(b"a/b").unwrap_err().kind(), ErrorKind::InvalidInput);
        assert_eq!(validate_name(b"a\0").unwrap_err().kind(), ErrorKind::InvalidInput);
        assert!(validate_name(&[b'x'; 255]).is_ok());
        assert_eq!(validate_name(&[b'x'; 256]).unwrap_err().kind(), ErrorKind::NameTooLong);
    }
}
