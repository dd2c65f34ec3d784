//! ext2 磁盘数据结构
//!
//! 结构体名与字段名沿用 C 的 ext2 定义（`struct ext2_super_block` 等），
//! 但不把结构体直接覆盖在字节缓冲区上：每个结构都通过 `from_bytes` 解码成
//! 自有的值，再通过 `to_bytes` 按固定偏移以小端编码写回。

// 允许C风格命名，便于对照磁盘格式
#![allow(non_camel_case_types)]

use alloc::vec::Vec;
use byteorder::{ByteOrder, LittleEndian};

use crate::consts::*;
use crate::error::{Error, ErrorKind, Result};

/// 已解析字段之后 superblock 中保留原样的区域起点
const SBLOCK_TAIL_OFFSET: usize = 264;

fn copy_array<const N: usize>(src: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&src[..N]);
    out
}

/// Superblock 结构
///
/// 对应C定义: struct ext2_super_block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ext2_sblock {
    pub inodes_count: u32,           // 0: 总 inode 数
    pub blocks_count: u32,           // 4: 总块数
    pub r_blocks_count: u32,         // 8: 保留块数
    pub free_blocks_count: u32,      // 12: 空闲块数
    pub free_inodes_count: u32,      // 16: 空闲 inode 数
    pub first_data_block: u32,       // 20: 第一个数据块
    pub log_block_size: u32,         // 24: 块大小（1024 << log_block_size）
    pub log_frag_size: u32,          // 28: 片段大小
    pub blocks_per_group: u32,       // 32: 每组块数
    pub frags_per_group: u32,        // 36: 每组片段数
    pub inodes_per_group: u32,       // 40: 每组 inode 数
    pub mtime: u32,                  // 44: 挂载时间
    pub wtime: u32,                  // 48: 写入时间
    pub mnt_count: u16,              // 52: 挂载次数
    pub max_mnt_count: u16,          // 54: 最大挂载次数
    pub magic: u16,                  // 56: 魔数 (0xEF53)
    pub state: u16,                  // 58: 文件系统状态
    pub errors: u16,                 // 60: 错误处理方式
    pub minor_rev_level: u16,        // 62: 次版本号
    pub lastcheck: u32,              // 64: 最后检查时间
    pub checkinterval: u32,          // 68: 检查间隔
    pub creator_os: u32,             // 72: 创建者操作系统
    pub rev_level: u32,              // 76: 主版本号

    // 以下字段仅在 rev_level >= 1 时有效
    pub def_resuid: u16,             // 80
    pub def_resgid: u16,             // 82
    pub first_ino: u32,              // 84: 第一个非保留 inode
    pub inode_size: u16,             // 88: inode 结构大小
    pub block_group_nr: u16,         // 90: 本 superblock 所在块组
    pub feature_compat: u32,         // 92
    pub feature_incompat: u32,       // 96
    pub feature_ro_compat: u32,      // 100
    pub uuid: [u8; 16],              // 104
    pub volume_name: [u8; 16],       // 120
    pub last_mounted: [u8; 64],      // 136
    pub algorithm_usage_bitmap: u32, // 200
    pub prealloc_blocks: u8,         // 204
    pub prealloc_dir_blocks: u8,     // 205
    pub padding1: u16,               // 206
    pub journal_uuid: [u8; 16],      // 208
    pub journal_inum: u32,           // 224
    pub journal_dev: u32,            // 228
    pub last_orphan: u32,            // 232
    pub hash_seed: [u32; 4],         // 236
    pub def_hash_version: u8,        // 252
    pub padding2: [u8; 3],           // 253
    pub default_mount_opts: u32,     // 256
    pub first_meta_bg: u32,          // 260
    /// 264..1024，原样保留
    pub reserved: Vec<u8>,
}

impl Default for ext2_sblock {
    fn default() -> Self {
        Self::from_bytes(&[0u8; EXT2_SUPERBLOCK_SIZE])
    }
}

impl ext2_sblock {
    /// 从 1024 字节的原始数据解码
    pub fn from_bytes(buf: &[u8]) -> Self {
        let u16_at = |off: usize| LittleEndian::read_u16(&buf[off..]);
        let u32_at = |off: usize| LittleEndian::read_u32(&buf[off..]);

        let mut hash_seed = [0u32; 4];
        LittleEndian::read_u32_into(&buf[236..252], &mut hash_seed);

        Self {
            inodes_count: u32_at(0),
            blocks_count: u32_at(4),
            r_blocks_count: u32_at(8),
            free_blocks_count: u32_at(12),
            free_inodes_count: u32_at(16),
            first_data_block: u32_at(20),
            log_block_size: u32_at(24),
            log_frag_size: u32_at(28),
            blocks_per_group: u32_at(32),
            frags_per_group: u32_at(36),
            inodes_per_group: u32_at(40),
            mtime: u32_at(44),
            wtime: u32_at(48),
            mnt_count: u16_at(52),
            max_mnt_count: u16_at(54),
            magic: u16_at(56),
            state: u16_at(58),
            errors: u16_at(60),
            minor_rev_level: u16_at(62),
            lastcheck: u32_at(64),
            checkinterval: u32_at(68),
            creator_os: u32_at(72),
            rev_level: u32_at(76),
            def_resuid: u16_at(80),
            def_resgid: u16_at(82),
            first_ino: u32_at(84),
            inode_size: u16_at(88),
            block_group_nr: u16_at(90),
            feature_compat: u32_at(92),
            feature_incompat: u32_at(96),
            feature_ro_compat: u32_at(100),
            uuid: copy_array(&buf[104..]),
            volume_name: copy_array(&buf[120..]),
            last_mounted: copy_array(&buf[136..]),
            algorithm_usage_bitmap: u32_at(200),
            prealloc_blocks: buf[204],
            prealloc_dir_blocks: buf[205],
            padding1: u16_at(206),
            journal_uuid: copy_array(&buf[208..]),
            journal_inum: u32_at(224),
            journal_dev: u32_at(228),
            last_orphan: u32_at(232),
            hash_seed,
            def_hash_version: buf[252],
            padding2: copy_array(&buf[253..]),
            default_mount_opts: u32_at(256),
            first_meta_bg: u32_at(260),
            reserved: buf[SBLOCK_TAIL_OFFSET..EXT2_SUPERBLOCK_SIZE].to_vec(),
        }
    }

    /// 编码到 1024 字节的缓冲区
    pub fn to_bytes(&self, buf: &mut [u8]) {
        LittleEndian::write_u32(&mut buf[0..], self.inodes_count);
        LittleEndian::write_u32(&mut buf[4..], self.blocks_count);
        LittleEndian::write_u32(&mut buf[8..], self.r_blocks_count);
        LittleEndian::write_u32(&mut buf[12..], self.free_blocks_count);
        LittleEndian::write_u32(&mut buf[16..], self.free_inodes_count);
        LittleEndian::write_u32(&mut buf[20..], self.first_data_block);
        LittleEndian::write_u32(&mut buf[24..], self.log_block_size);
        LittleEndian::write_u32(&mut buf[28..], self.log_frag_size);
        LittleEndian::write_u32(&mut buf[32..], self.blocks_per_group);
        LittleEndian::write_u32(&mut buf[36..], self.frags_per_group);
        LittleEndian::write_u32(&mut buf[40..], self.inodes_per_group);
        LittleEndian::write_u32(&mut buf[44..], self.mtime);
        LittleEndian::write_u32(&mut buf[48..], self.wtime);
        LittleEndian::write_u16(&mut buf[52..], self.mnt_count);
        LittleEndian::write_u16(&mut buf[54..], self.max_mnt_count);
        LittleEndian::write_u16(&mut buf[56..], self.magic);
        LittleEndian::write_u16(&mut buf[58..], self.state);
        LittleEndian::write_u16(&mut buf[60..], self.errors);
        LittleEndian::write_u16(&mut buf[62..], self.minor_rev_level);
        LittleEndian::write_u32(&mut buf[64..], self.lastcheck);
        LittleEndian::write_u32(&mut buf[68..], self.checkinterval);
        LittleEndian::write_u32(&mut buf[72..], self.creator_os);
        LittleEndian::write_u32(&mut buf[76..], self.rev_level);
        LittleEndian::write_u16(&mut buf[80..], self.def_resuid);
        LittleEndian::write_u16(&mut buf[82..], self.def_resgid);
        LittleEndian::write_u32(&mut buf[84..], self.first_ino);
        LittleEndian::write_u16(&mut buf[88..], self.inode_size);
        LittleEndian::write_u16(&mut buf[90..], self.block_group_nr);
        LittleEndian::write_u32(&mut buf[92..], self.feature_compat);
        LittleEndian::write_u32(&mut buf[96..], self.feature_incompat);
        LittleEndian::write_u32(&mut buf[100..], self.feature_ro_compat);
        buf[104..120].copy_from_slice(&self.uuid);
        buf[120..136].copy_from_slice(&self.volume_name);
        buf[136..200].copy_from_slice(&self.last_mounted);
        LittleEndian::write_u32(&mut buf[200..], self.algorithm_usage_bitmap);
        buf[204] = self.prealloc_blocks;
        buf[205] = self.prealloc_dir_blocks;
        LittleEndian::write_u16(&mut buf[206..], self.padding1);
        buf[208..224].copy_from_slice(&self.journal_uuid);
        LittleEndian::write_u32(&mut buf[224..], self.journal_inum);
        LittleEndian::write_u32(&mut buf[228..], self.journal_dev);
        LittleEndian::write_u32(&mut buf[232..], self.last_orphan);
        LittleEndian::write_u32_into(&self.hash_seed, &mut buf[236..252]);
        buf[252] = self.def_hash_version;
        buf[253..256].copy_from_slice(&self.padding2);
        LittleEndian::write_u32(&mut buf[256..], self.default_mount_opts);
        LittleEndian::write_u32(&mut buf[260..], self.first_meta_bg);
        buf[SBLOCK_TAIL_OFFSET..EXT2_SUPERBLOCK_SIZE].copy_from_slice(&self.reserved);
    }
}

/// 块组描述符
///
/// 对应C定义: struct ext2_group_desc（32 字节，无隐式填充）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ext2_group_desc {
    pub block_bitmap: u32,      // 0: 块位图所在块
    pub inode_bitmap: u32,      // 4: inode 位图所在块
    pub inode_table: u32,       // 8: inode 表起始块
    pub free_blocks_count: u16, // 12
    pub free_inodes_count: u16, // 14
    pub used_dirs_count: u16,   // 16
    pub pad: u16,               // 18
    pub reserved: [u8; 12],     // 20
}

impl ext2_group_desc {
    pub fn from_bytes(buf: &[u8]) -> Self {
        Self {
            block_bitmap: LittleEndian::read_u32(&buf[0..]),
            inode_bitmap: LittleEndian::read_u32(&buf[4..]),
            inode_table: LittleEndian::read_u32(&buf[8..]),
            free_blocks_count: LittleEndian::read_u16(&buf[12..]),
            free_inodes_count: LittleEndian::read_u16(&buf[14..]),
            used_dirs_count: LittleEndian::read_u16(&buf[16..]),
            pad: LittleEndian::read_u16(&buf[18..]),
            reserved: copy_array(&buf[20..]),
        }
    }

    pub fn to_bytes(&self, buf: &mut [u8]) {
        LittleEndian::write_u32(&mut buf[0..], self.block_bitmap);
        LittleEndian::write_u32(&mut buf[4..], self.inode_bitmap);
        LittleEndian::write_u32(&mut buf[8..], self.inode_table);
        LittleEndian::write_u16(&mut buf[12..], self.free_blocks_count);
        LittleEndian::write_u16(&mut buf[14..], self.free_inodes_count);
        LittleEndian::write_u16(&mut buf[16..], self.used_dirs_count);
        LittleEndian::write_u16(&mut buf[18..], self.pad);
        buf[20..32].copy_from_slice(&self.reserved);
    }
}

/// Inode 结构
///
/// 对应C定义: struct ext2_inode。前 128 字节按字段解码，
/// `inode_size` 超出 128 的部分保存在 `extra` 中原样写回。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ext2_inode {
    pub mode: u16,                        // 0: 类型和权限
    pub uid: u16,                         // 2
    pub size_lo: u32,                     // 4: 文件大小（低32位）
    pub atime: u32,                       // 8
    pub ctime: u32,                       // 12
    pub mtime: u32,                       // 16
    pub dtime: u32,                       // 20: 删除时间
    pub gid: u16,                         // 24
    pub links_count: u16,                 // 26
    pub blocks: u32,                      // 28: 占用的 512 字节扇区数
    pub flags: u32,                       // 32
    pub osd1: u32,                        // 36
    pub block: [u32; EXT2_INODE_BLOCKS],  // 40: 12 直接 + 一级/二级/三级间接
    pub generation: u32,                  // 100
    pub file_acl: u32,                    // 104: 扩展属性块
    pub size_hi: u32,                     // 108: 文件大小（高32位）
    pub faddr: u32,                       // 112
    pub osd2: [u8; 12],                   // 116
    /// 128..inode_size
    pub extra: Vec<u8>,
}

impl ext2_inode {
    /// 从 `inode_size` 字节的原始数据解码
    pub fn from_bytes(buf: &[u8]) -> Self {
        let u16_at = |off: usize| LittleEndian::read_u16(&buf[off..]);
        let u32_at = |off: usize| LittleEndian::read_u32(&buf[off..]);

        let mut block = [0u32; EXT2_INODE_BLOCKS];
        LittleEndian::read_u32_into(&buf[40..100], &mut block);

        let base = EXT2_GOOD_OLD_INODE_SIZE as usize;
        Self {
            mode: u16_at(0),
            uid: u16_at(2),
            size_lo: u32_at(4),
            atime: u32_at(8),
            ctime: u32_at(12),
            mtime: u32_at(16),
            dtime: u32_at(20),
            gid: u16_at(24),
            links_count: u16_at(26),
            blocks: u32_at(28),
            flags: u32_at(32),
            osd1: u32_at(36),
            block,
            generation: u32_at(100),
            file_acl: u32_at(104),
            size_hi: u32_at(108),
            faddr: u32_at(112),
            osd2: copy_array(&buf[116..]),
            extra: buf.get(base..).map(<[u8]>::to_vec).unwrap_or_default(),
        }
    }

    /// 编码到 `inode_size` 字节的缓冲区
    pub fn to_bytes(&self, buf: &mut [u8]) {
        LittleEndian::write_u16(&mut buf[0..], self.mode);
        LittleEndian::write_u16(&mut buf[2..], self.uid);
        LittleEndian::write_u32(&mut buf[4..], self.size_lo);
        LittleEndian::write_u32(&mut buf[8..], self.atime);
        LittleEndian::write_u32(&mut buf[12..], self.ctime);
        LittleEndian::write_u32(&mut buf[16..], self.mtime);
        LittleEndian::write_u32(&mut buf[20..], self.dtime);
        LittleEndian::write_u16(&mut buf[24..], self.gid);
        LittleEndian::write_u16(&mut buf[26..], self.links_count);
        LittleEndian::write_u32(&mut buf[28..], self.blocks);
        LittleEndian::write_u32(&mut buf[32..], self.flags);
        LittleEndian::write_u32(&mut buf[36..], self.osd1);
        LittleEndian::write_u32_into(&self.block, &mut buf[40..100]);
        LittleEndian::write_u32(&mut buf[100..], self.generation);
        LittleEndian::write_u32(&mut buf[104..], self.file_acl);
        LittleEndian::write_u32(&mut buf[108..], self.size_hi);
        LittleEndian::write_u32(&mut buf[112..], self.faddr);
        buf[116..128].copy_from_slice(&self.osd2);

        let base = EXT2_GOOD_OLD_INODE_SIZE as usize;
        let tail = &mut buf[base..];
        let n = tail.len().min(self.extra.len());
        tail[..n].copy_from_slice(&self.extra[..n]);
        tail[n..].fill(0);
    }
}

/// 目录项
///
/// 对应C定义: struct ext2_dir_entry_2。名字解码为自有的字节序列，
/// 不以 NUL 结尾。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ext2_dir_en {
    pub inode: u32,     // 0: 0 表示空闲槽位
    pub rec_len: u32,   // 4: 记录总长度（4 字节对齐），磁盘上为 u16
    pub name_len: u8,   // 6
    pub file_type: u8,  // 7
    pub name: Vec<u8>,  // 8..8+name_len
}

impl ext2_dir_en {
    pub fn new(inode: u32, rec_len: u32, name: &[u8], file_type: u8) -> Self {
        Self {
            inode,
            rec_len,
            name_len: name.len() as u8,
            file_type,
            name: name.to_vec(),
        }
    }

    /// 容纳指定长度名字所需的最小记录长度（头部 + 名字，4 字节对齐）
    pub fn min_rec_len(name_len: usize) -> usize {
        (EXT2_DIR_ENTRY_HEADER_SIZE + name_len + 3) & !3
    }

    /// 当前记录的最小长度
    pub fn required_len(&self) -> usize {
        Self::min_rec_len(self.name_len as usize)
    }

    /// 磁盘上的 rec_len 转换为字节数
    ///
    /// 64 KiB 的整块记录存为 0 或 0xFFFF。
    pub fn rec_len_from_disk(raw: u16) -> u32 {
        match raw {
            0 | EXT2_MAX_REC_LEN => 1 << 16,
            len => len as u32,
        }
    }

    /// 字节数转换为磁盘上的 rec_len
    pub fn rec_len_to_disk(len: u32) -> u16 {
        if len >= 1 << 16 {
            EXT2_MAX_REC_LEN
        } else {
            len as u16
        }
    }

    /// 从块数据 `offset` 处解码一条记录
    ///
    /// 校验 rec_len 对齐、不越过块尾、且能容纳名字。
    pub fn decode(block: &[u8], offset: usize) -> Result<Self> {
        if offset + EXT2_DIR_ENTRY_HEADER_SIZE > block.len() {
            return Err(Error::new(ErrorKind::Corrupted, "Directory entry header crosses block end"));
        }
        let inode = LittleEndian::read_u32(&block[offset..]);
        let rec_len = Self::rec_len_from_disk(LittleEndian::read_u16(&block[offset + 4..]));
        let name_len = block[offset + 6];
        let file_type = block[offset + 7];

        let len = rec_len as usize;
        if len < EXT2_DIR_ENTRY_HEADER_SIZE || len % 4 != 0 || offset + len > block.len() {
            return Err(Error::new(ErrorKind::Corrupted, "Invalid directory entry rec_len"));
        }
        let name_end = offset + EXT2_DIR_ENTRY_HEADER_SIZE + name_len as usize;
        if name_end > offset + len {
            return Err(Error::new(ErrorKind::Corrupted, "Directory entry name exceeds rec_len"));
        }

        Ok(Self {
            inode,
            rec_len,
            name_len,
            file_type,
            name: block[offset + EXT2_DIR_ENTRY_HEADER_SIZE..name_end].to_vec(),
        })
    }

    /// 在块数据 `offset` 处编码本记录（只写头部和名字）
    pub fn encode(&self, block: &mut [u8], offset: usize) {
        LittleEndian::write_u32(&mut block[offset..], self.inode);
        LittleEndian::write_u16(&mut block[offset + 4..], Self::rec_len_to_disk(self.rec_len));
        block[offset + 6] = self.name_len;
        block[offset + 7] = self.file_type;
        let start = offset + EXT2_DIR_ENTRY_HEADER_SIZE;
        block[start..start + self.name.len()].copy_from_slice(&self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sblock_field_offsets() {
        let mut raw = [0u8; EXT2_SUPERBLOCK_SIZE];
        LittleEndian::write_u32(&mut raw[0..], 128);
        LittleEndian::write_u32(&mut raw[4..], 1024);
        LittleEndian::write_u32(&mut raw[24..], 2);
        LittleEndian::write_u16(&mut raw[56..], EXT2_SUPERBLOCK_MAGIC);
        LittleEndian::write_u16(&mut raw[88..], 256);
        raw[120..124].copy_from_slice(b"root");
        raw[1000] = 0xAB;

        let sb = ext2_sblock::from_bytes(&raw);
        assert_eq!(sb.inodes_count, 128);
        assert_eq!(sb.blocks_count, 1024);
        assert_eq!(sb.log_block_size, 2);
        assert_eq!(sb.magic, EXT2_SUPERBLOCK_MAGIC);
        assert_eq!(sb.inode_size, 256);
        assert_eq!(&sb.volume_name[..4], b"root");

        let mut out = [0u8; EXT2_SUPERBLOCK_SIZE];
        sb.to_bytes(&mut out);
        assert_eq!(&out[..], &raw[..]);
    }

    #[test]
    fn test_group_desc_layout() {
        let desc = ext2_group_desc {
            block_bitmap: 3,
            inode_bitmap: 4,
            inode_table: 5,
            free_blocks_count: 100,
            free_inodes_count: 20,
            used_dirs_count: 1,
            ..Default::default()
        };
        let mut raw = [0u8; EXT2_GROUP_DESC_SIZE];
        desc.to_bytes(&mut raw);
        assert_eq!(LittleEndian::read_u32(&raw[8..]), 5);
        assert_eq!(LittleEndian::read_u16(&raw[12..]), 100);
        assert_eq!(LittleEndian::read_u16(&raw[16..]), 1);
        assert_eq!(ext2_group_desc::from_bytes(&raw), desc);
    }

    #[test]
    fn test_inode_keeps_extra_bytes() {
        let mut raw = [0u8; 256];
        LittleEndian::write_u16(&mut raw[0..], EXT2_INODE_MODE_FILE | 0o644);
        LittleEndian::write_u32(&mut raw[40..], 77);
        LittleEndian::write_u32(&mut raw[96..], 99);
        raw[200] = 0x5A;

        let inode = ext2_inode::from_bytes(&raw);
        assert_eq!(inode.block[0], 77);
        assert_eq!(inode.block[EXT2_INODE_TRIPLE_INDIRECT_BLOCK], 99);
        assert_eq!(inode.extra.len(), 128);

        let mut out = [0u8; 256];
        inode.to_bytes(&mut out);
        assert_eq!(&out[..], &raw[..]);
    }

    #[test]
    fn test_dir_entry_min_len() {
        assert_eq!(ext2_dir_en::min_rec_len(1), 12);
        assert_eq!(ext2_dir_en::min_rec_len(2), 12);
        assert_eq!(ext2_dir_en::min_rec_len(4), 12);
        assert_eq!(ext2_dir_en::min_rec_len(5), 16);
        assert_eq!(ext2_dir_en::min_rec_len(255), 264);
    }

    #[test]
    fn test_rec_len_of_full_64k_block() {
        assert_eq!(ext2_dir_en::rec_len_to_disk(1 << 16), EXT2_MAX_REC_LEN);
        assert_eq!(ext2_dir_en::rec_len_to_disk(4096), 4096);
        assert_eq!(ext2_dir_en::rec_len_from_disk(EXT2_MAX_REC_LEN), 1 << 16);
        assert_eq!(ext2_dir_en::rec_len_from_disk(0), 1 << 16);

        let mut block = vec![0u8; 1 << 16];
        ext2_dir_en::new(12, 1 << 16, b"big", 0).encode(&mut block, 0);
        assert_eq!(ext2_dir_en::decode(&block, 0).unwrap().rec_len, 1 << 16);
        // 小块中同样的编码越过块尾
        assert!(ext2_dir_en::decode(&block[..1024], 0).is_err());
    }

    #[test]
    fn test_dir_entry_decode_rejects_bad_rec_len() {
        let mut block = [0u8; 64];
        ext2_dir_en::new(12, 6, b"a", 0).encode(&mut block, 0);
        let err = ext2_dir_en::decode(&block, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Corrupted);

        ext2_dir_en::new(12, 128, b"a", 0).encode(&mut block, 0);
        assert!(ext2_dir_en::decode(&block, 0).is_err());

        ext2_dir_en::new(12, 64, b"abc", EXT2_DE_REG_FILE).encode(&mut block, 0);
        let de = ext2_dir_en::decode(&block, 0).unwrap();
        assert_eq!(de.name, b"abc");
        assert_eq!(de.rec_len, 64);
    }
}
