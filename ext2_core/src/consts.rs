//! ext2 常量定义

/// 块设备物理扇区大小（512 字节）
pub const EXT2_DEV_BSIZE: usize = 512;

/// Superblock 位置（从设备开始的字节偏移）
pub const EXT2_SUPERBLOCK_OFFSET: u64 = 1024;

/// Superblock 大小
pub const EXT2_SUPERBLOCK_SIZE: usize = 1024;

/// ext2 魔数
pub const EXT2_SUPERBLOCK_MAGIC: u16 = 0xEF53;

/// 最小块大小（`1024 << 0`）
pub const EXT2_MIN_BLOCK_SIZE: u32 = 1024;

/// `log_block_size` 的上限（64 KiB 块）
pub const EXT2_MAX_BLOCK_LOG_SIZE: u32 = 6;

/// 原始版本（固定 128 字节 inode）
pub const EXT2_GOOD_OLD_REV: u32 = 0;
/// 动态版本（扩展 superblock 字段有效）
pub const EXT2_DYNAMIC_REV: u32 = 1;

/// 原始版本下的 inode 大小
pub const EXT2_GOOD_OLD_INODE_SIZE: u16 = 128;
/// 原始版本下第一个非保留 inode
pub const EXT2_GOOD_OLD_FIRST_INO: u32 = 11;

/// 块组描述符大小
pub const EXT2_GROUP_DESC_SIZE: usize = 32;

/// Inode 结构中的块指针数量（12个直接块 + 1个间接块 + 1个二级间接块 + 1个三级间接块）
pub const EXT2_INODE_BLOCKS: usize = 15;

/// 直接块数量
pub const EXT2_INODE_DIRECT_BLOCKS: usize = 12;

/// 一级间接块指针下标
pub const EXT2_INODE_INDIRECT_BLOCK: usize = 12;
/// 二级间接块指针下标
pub const EXT2_INODE_DOUBLE_INDIRECT_BLOCK: usize = 13;
/// 三级间接块指针下标（未实现）
pub const EXT2_INODE_TRIPLE_INDIRECT_BLOCK: usize = 14;

/// 根目录 inode 号
pub const EXT2_ROOT_INO: u32 = 2;

/// inode 位图的起始搜索位（前 11 个 inode 保留）
pub const EXT2_INODE_BITMAP_FIRST_BIT: u32 = 11;

/// i_blocks 的计数单位（512 字节扇区）
pub const EXT2_INODE_BLOCK_SECTOR: u32 = 512;

/// 目录项头部大小（inode + rec_len + name_len + file_type）
pub const EXT2_DIR_ENTRY_HEADER_SIZE: usize = 8;

/// 16 位 rec_len 能存下的最大值，64 KiB 块中占满整块的记录以此值存盘
pub const EXT2_MAX_REC_LEN: u16 = 0xFFFF;

/// 文件名最大长度
pub const EXT2_NAME_LEN: usize = 255;

/// 目录项类型常量
pub const EXT2_DE_UNKNOWN: u8 = 0;
pub const EXT2_DE_REG_FILE: u8 = 1;
pub const EXT2_DE_DIR: u8 = 2;
pub const EXT2_DE_CHRDEV: u8 = 3;
pub const EXT2_DE_BLKDEV: u8 = 4;
pub const EXT2_DE_FIFO: u8 = 5;
pub const EXT2_DE_SOCK: u8 = 6;
pub const EXT2_DE_SYMLINK: u8 = 7;

/// 文件系统状态
pub const EXT2_VALID_FS: u16 = 1;
pub const EXT2_ERROR_FS: u16 = 2;

/// 出错时的行为：继续
pub const EXT2_ERRORS_CONTINUE: u16 = 1;

/// 不兼容特性：目录项携带类型字段
pub const EXT2_FEATURE_INCOMPAT_FILETYPE: u32 = 0x0002;

/// 错误码（兼容 C errno）
pub const EOK: i32 = 0;
pub const ENOENT: i32 = 2;
pub const EIO: i32 = 5;
pub const EEXIST: i32 = 17;
pub const ENOTDIR: i32 = 20;
pub const EISDIR: i32 = 21;
pub const EINVAL: i32 = 22;
pub const EFBIG: i32 = 27;
pub const ENOSPC: i32 = 28;
pub const EROFS: i32 = 30;
pub const ENAMETOOLONG: i32 = 36;
pub const ENOTEMPTY: i32 = 39;

/// Inode 模式位
pub const EXT2_INODE_MODE_FIFO: u16 = 0x1000;
pub const EXT2_INODE_MODE_CHARDEV: u16 = 0x2000;
pub const EXT2_INODE_MODE_DIRECTORY: u16 = 0x4000;
pub const EXT2_INODE_MODE_BLOCKDEV: u16 = 0x6000;
pub const EXT2_INODE_MODE_FILE: u16 = 0x8000;
pub const EXT2_INODE_MODE_SOFTLINK: u16 = 0xA000;
pub const EXT2_INODE_MODE_SOCKET: u16 = 0xC000;
pub const EXT2_INODE_MODE_TYPE_MASK: u16 = 0xF000;
/// 权限位（含 suid/sgid/sticky）
pub const EXT2_INODE_MODE_PERM_MASK: u16 = 0x0FFF;
