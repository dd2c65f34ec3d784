//! 格式化
//!
//! 在块设备上建立一个全新的 ext2 文件系统：superblock、块组描述符表、
//! 每组的块位图/inode 位图/inode 表，以及只含 `.` 和 `..` 的根目录。
//! 不写 superblock 备份。

use alloc::string::String;
use alloc::vec::Vec;
use log::info;

use crate::{
    bitmap,
    block::{Block, BlockDev, BlockDevice},
    block_group::BgdTable,
    consts::*,
    dir,
    error::{Error, ErrorKind, Result},
    inode::{write_inode, FileType, Inode, InodeAttrs, InodeMode},
    superblock::Superblock,
    types::{ext2_group_desc, ext2_sblock},
};

/// 组内空闲计数是 16 位，每组的块数/inode 数不能超过这个值
const MAX_PER_GROUP: u32 = 65528;

/// 格式化参数
#[derive(Debug, Clone)]
pub struct FormatOptions {
    /// 块大小（1024 ~ 65536 的 2 的幂）
    pub block_size: u32,
    /// 总块数，0 表示使用整个设备
    pub blocks_count: u32,
    /// 每组块数，0 表示 `block_size * 8`（不超过 65528）
    pub blocks_per_group: u32,
    /// 期望的 inode 总数，0 表示每 4 个块一个 inode；实际值向上取整到每组 8 的倍数
    pub inodes_count: u32,
    /// inode 大小，原始版本必须为 128
    pub inode_size: u16,
    /// 版本号（0 或 1）
    pub rev_level: u32,
    /// 卷名，最多 16 字节
    pub volume_name: String,
    /// 创建时间（秒）
    pub time: u32,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            block_size: EXT2_MIN_BLOCK_SIZE,
            blocks_count: 0,
            blocks_per_group: 0,
            inodes_count: 0,
            inode_size: EXT2_GOOD_OLD_INODE_SIZE,
            rev_level: EXT2_DYNAMIC_REV,
            volume_name: String::new(),
            time: 0,
        }
    }
}

/// 单个块组的布局
struct GroupLayout {
    base: u32,
    blocks: u32,
    block_bitmap: u32,
    inode_bitmap: u32,
    inode_table: u32,
    /// 第一个数据块
    data_start: u32,
}

/// 校验参数并计算几何信息
fn geometry<D: BlockDevice>(bdev: &BlockDev<D>, opts: &FormatOptions) -> Result<(u32, u32, u32)> {
    let bs = opts.block_size;
    if !bs.is_power_of_two() || bs < EXT2_MIN_BLOCK_SIZE || bs > EXT2_MIN_BLOCK_SIZE << EXT2_MAX_BLOCK_LOG_SIZE {
        return Err(Error::new(ErrorKind::InvalidInput, "Unsupported block size"));
    }

    let device_blocks = bdev.total_blocks().min(u32::MAX as u64) as u32;
    let blocks_count = match opts.blocks_count {
        0 => device_blocks,
        n if n > device_blocks => {
            return Err(Error::new(ErrorKind::InvalidInput, "Device too small for blocks_count"));
        }
        n => n,
    };

    let bpg = match opts.blocks_per_group {
        0 => (bs * 8).min(MAX_PER_GROUP),
        n => n,
    };
    if bpg > bs * 8 || bpg > MAX_PER_GROUP || bpg % 8 != 0 {
        return Err(Error::new(ErrorKind::InvalidInput, "Invalid blocks_per_group"));
    }

    let groups = blocks_count.div_ceil(bpg);
    let wanted = match opts.inodes_count {
        0 => blocks_count / 4,
        n => n,
    };
    let ipg = wanted.div_ceil(groups).max(16).next_multiple_of(8);
    if ipg > bs * 8 || ipg > MAX_PER_GROUP {
        return Err(Error::new(ErrorKind::InvalidInput, "Too many inodes per group"));
    }

    Ok((blocks_count, bpg, ipg))
}

/// 格式化块设备
///
/// # 参数
///
/// * `bdev` - 块设备引用，块大小会被设置为 `opts.block_size`
/// * `opts` - 格式化参数
pub fn format<D: BlockDevice>(bdev: &mut BlockDev<D>, opts: &FormatOptions) -> Result<()> {
    if opts.rev_level > EXT2_DYNAMIC_REV {
        return Err(Error::new(ErrorKind::InvalidInput, "Unsupported revision"));
    }
    let inode_size = opts.inode_size;
    if (opts.rev_level == EXT2_GOOD_OLD_REV && inode_size != EXT2_GOOD_OLD_INODE_SIZE)
        || inode_size < EXT2_GOOD_OLD_INODE_SIZE
        || !inode_size.is_power_of_two()
        || inode_size as u32 > opts.block_size
    {
        return Err(Error::new(ErrorKind::InvalidInput, "Invalid inode size"));
    }

    bdev.set_block_size(opts.block_size)?;
    let bs = opts.block_size;
    let (blocks_count, bpg, ipg) = geometry(bdev, opts)?;

    let first_data_block = if bs == EXT2_MIN_BLOCK_SIZE { 1 } else { 0 };
    let groups = blocks_count.div_ceil(bpg);
    let gdt_start: u32 = if bs > EXT2_MIN_BLOCK_SIZE { 1 } else { 2 };
    let gdt_blocks = (groups as usize * EXT2_GROUP_DESC_SIZE).div_ceil(bs as usize) as u32;
    let itable_blocks = (ipg * inode_size as u32).div_ceil(bs);

    let mut layouts = Vec::with_capacity(groups as usize);
    for g in 0..groups {
        let base = first_data_block + g * bpg;
        let blocks = (blocks_count - base).min(bpg);
        let meta = if g == 0 { gdt_start + gdt_blocks } else { base };
        let data_start = meta + 2 + itable_blocks;
        // 0 号组还要放根目录的数据块
        let needed = data_start - base + if g == 0 { 1 } else { 0 };
        if needed > blocks {
            return Err(Error::new(ErrorKind::InvalidInput, "Block group too small for its metadata"));
        }
        layouts.push(GroupLayout {
            base,
            blocks,
            block_bitmap: meta,
            inode_bitmap: meta + 1,
            inode_table: meta + 2,
            data_start,
        });
    }

    let filetype = opts.rev_level >= EXT2_DYNAMIC_REV;
    let root_block = layouts[0].data_start;
    let reserved = EXT2_INODE_BITMAP_FIRST_BIT;

    let mut descs = Vec::with_capacity(groups as usize);
    for (g, layout) in layouts.iter().enumerate() {
        // 块位图：元数据块和组尾之后的填充位置位
        let mut bb = Block::zeroed(bdev, layout.block_bitmap as u64);
        let mut used = layout.data_start - layout.base;
        if g == 0 {
            used += 1;
        }
        for bit in (0..used).chain(layout.blocks..bs * 8) {
            bitmap::set_bit(bb.data_mut(), bit)?;
        }
        bb.write(bdev)?;

        // inode 位图：每组前 11 位不分配，0 号组中即保留 inode（含根目录）
        let mut ib = Block::zeroed(bdev, layout.inode_bitmap as u64);
        for bit in (0..reserved).chain(ipg..bs * 8) {
            bitmap::set_bit(ib.data_mut(), bit)?;
        }
        ib.write(bdev)?;

        for i in 0..itable_blocks {
            Block::zeroed(bdev, (layout.inode_table + i) as u64).write(bdev)?;
        }

        descs.push(ext2_group_desc {
            block_bitmap: layout.block_bitmap,
            inode_bitmap: layout.inode_bitmap,
            inode_table: layout.inode_table,
            free_blocks_count: (layout.blocks - used) as u16,
            free_inodes_count: (ipg - reserved) as u16,
            used_dirs_count: if g == 0 { 1 } else { 0 },
            ..Default::default()
        });
    }

    let mut raw = ext2_sblock {
        inodes_count: ipg * groups,
        blocks_count,
        free_blocks_count: descs.iter().map(|d| d.free_blocks_count as u32).sum(),
        free_inodes_count: descs.iter().map(|d| d.free_inodes_count as u32).sum(),
        first_data_block,
        log_block_size: bs.trailing_zeros() - EXT2_MIN_BLOCK_SIZE.trailing_zeros(),
        blocks_per_group: bpg,
        inodes_per_group: ipg,
        wtime: opts.time,
        max_mnt_count: u16::MAX,
        magic: EXT2_SUPERBLOCK_MAGIC,
        state: EXT2_VALID_FS,
        errors: EXT2_ERRORS_CONTINUE,
        lastcheck: opts.time,
        rev_level: opts.rev_level,
        ..Default::default()
    };
    raw.log_frag_size = raw.log_block_size;
    raw.frags_per_group = bpg;
    if opts.rev_level >= EXT2_DYNAMIC_REV {
        raw.first_ino = EXT2_GOOD_OLD_FIRST_INO;
        raw.inode_size = inode_size;
        raw.feature_incompat = EXT2_FEATURE_INCOMPAT_FILETYPE;
    }
    let name = opts.volume_name.as_bytes();
    let n = name.len().min(raw.volume_name.len());
    raw.volume_name[..n].copy_from_slice(&name[..n]);

    let sb = Superblock::new(raw);
    let bgdt = BgdTable::new(gdt_start as u64, gdt_blocks, descs);
    sb.write(bdev)?;
    bgdt.flush(bdev)?;

    // 根目录
    let mut dir_block = Block::zeroed(bdev, root_block as u64);
    dir::init_dir_block(dir_block.data_mut(), EXT2_ROOT_INO, EXT2_ROOT_INO, filetype);
    dir_block.write(bdev)?;

    let attrs = InodeAttrs {
        perm: InodeMode::from_bits_truncate(0o755),
        uid: 0,
        gid: 0,
        time: opts.time,
    };
    let mut root = Inode::create(EXT2_ROOT_INO, sb.inode_size(), FileType::Directory, &attrs);
    root.set_links_count(2);
    root.set_file_size(bs as u64);
    root.set_block_ptr(0, root_block);
    root.add_block(bs);
    write_inode(bdev, &sb, &bgdt, &root)?;

    bdev.flush()?;
    info!(
        "ext2: formatted {} blocks of {} bytes, {} groups, {} inodes",
        blocks_count,
        bs,
        groups,
        sb.inodes_count()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::MemDevice;
    use crate::inode::read_inode;

    #[test]
    fn test_format_single_group() {
        let mut bdev = BlockDev::new(MemDevice::new(1024 * 1024));
        let opts = FormatOptions {
            blocks_count: 1024,
            blocks_per_group: 1024,
            inodes_count: 128,
            volume_name: String::from("scratch"),
            ..Default::default()
        };
        format(&mut bdev, &opts).unwrap();

        let sb = Superblock::load(&mut bdev).unwrap();
        assert_eq!(sb.block_group_count(), 1);
        assert_eq!(sb.inodes_count(), 128);
        assert_eq!(sb.first_data_block(), 1);
        assert_eq!(sb.volume_name(), Some("scratch"));
        assert!(sb.has_filetype());

        let bgdt = BgdTable::load(&mut bdev, &sb).unwrap();
        let g0 = bgdt.group(0).unwrap();
        // 块 1 superblock，块 2 描述符表，块 3/4 位图，16 块 inode 表，1 块根目录
        assert_eq!(g0.block_bitmap(), 3);
        assert_eq!(g0.inode_table(), 5);
        assert_eq!(g0.free_blocks_count(), 1023 - 21);
        assert_eq!(g0.free_inodes_count(), 128 - 11);
        assert_eq!(sb.free_blocks_count(), g0.free_blocks_count());

        let root = read_inode(&mut bdev, &sb, &bgdt, EXT2_ROOT_INO).unwrap();
        assert!(root.is_dir());
        assert_eq!(root.links_count(), 2);
        assert_eq!(root.block_ptr(0), 21);
        assert_eq!(root.sectors(), 2);
    }

    #[test]
    fn test_format_large_blocks() {
        let mut bdev = BlockDev::new(MemDevice::new(8 * 1024 * 1024));
        let opts = FormatOptions {
            block_size: 4096,
            inode_size: 256,
            ..Default::default()
        };
        format(&mut bdev, &opts).unwrap();

        let sb = Superblock::load(&mut bdev).unwrap();
        assert_eq!(sb.block_size(), 4096);
        assert_eq!(sb.blocks_count(), 2048);
        assert_eq!(sb.first_data_block(), 0);
        assert_eq!(sb.inode_size(), 256);
        assert_eq!(sb.group_desc_table_block(), 1);
    }

    #[test]
    fn test_format_rejects_bad_options() {
        let mut bdev = BlockDev::new(MemDevice::new(64 * 1024));
        let opts = FormatOptions {
            blocks_count: 1024,
            ..Default::default()
        };
        assert_eq!(format(&mut bdev, &opts).unwrap_err().kind(), ErrorKind::InvalidInput);

        let opts = FormatOptions {
            rev_level: EXT2_GOOD_OLD_REV,
            inode_size: 256,
            ..Default::default()
        };
        assert!(format(&mut bdev, &opts).is_err());
    }
}
