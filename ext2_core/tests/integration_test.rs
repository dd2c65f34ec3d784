//! 集成测试 - 在镜像文件上测试 ext2_core 的 Rust API

mod common;

use common::{fresh_image, small_opts};
use ext2_core::{
    dir::DirBlockIter, indirect, Block, Ext2FileSystem, FileType, FormatOptions, FsConfig,
    InodeAttrs, InodeMode, EXT2_ROOT_INO,
};

fn attrs(perm: u16) -> InodeAttrs {
    InodeAttrs {
        perm: InodeMode::from_bits_truncate(perm),
        uid: 0,
        gid: 0,
        time: 1_700_000_000,
    }
}

#[test]
fn test_allocator_returns_first_blocks() {
    let device = fresh_image("alloc123", &small_opts());
    let mut fs = Ext2FileSystem::mount(device, FsConfig::default(), 0).unwrap();

    // 清空块位图，模拟一个所有块都空闲的块组
    let bitmap = fs.group_descs().group(0).unwrap().block_bitmap();
    Block::zeroed(fs.block_device(), bitmap)
        .write(fs.block_device_mut())
        .unwrap();
    let before = fs.group_descs().group(0).unwrap().free_blocks_count();

    assert_eq!(fs.alloc_block().unwrap(), 1);
    assert_eq!(fs.alloc_block().unwrap(), 2);
    assert_eq!(fs.alloc_block().unwrap(), 3);
    assert_eq!(fs.group_descs().group(0).unwrap().free_blocks_count(), before - 3);
}

#[test]
fn test_create_in_empty_root() {
    let device = fresh_image("create_foo", &small_opts());
    let mut fs = Ext2FileSystem::mount(device, FsConfig::default(), 0).unwrap();

    let ino = fs.create(EXT2_ROOT_INO, "foo", &attrs(0o644)).unwrap();
    let inode = fs.read_inode(ino).unwrap();
    assert_eq!(inode.links_count(), 1);
    assert_eq!(inode.file_type(), FileType::RegularFile);
    assert_eq!(inode.permissions(), InodeMode::from_bits_truncate(0o644));

    // 根目录唯一的数据块仍被记录铺满
    let root = fs.read_inode(EXT2_ROOT_INO).unwrap();
    assert_eq!(root.file_size(), 1024);
    let block = Block::read(fs.block_device_mut(), root.block_ptr(0) as u64).unwrap();
    let records: Vec<_> = DirBlockIter::new(block.data()).map(|r| r.unwrap().1).collect();
    assert_eq!(records.iter().map(|r| r.rec_len as usize).sum::<usize>(), 1024);
    let foo = records.iter().find(|r| r.name == b"foo").unwrap();
    assert_eq!(foo.inode, ino);
}

#[test]
fn test_file_roundtrip_survives_remount() {
    let device = fresh_image("roundtrip", &small_opts());
    let mut fs = Ext2FileSystem::mount(device, FsConfig::default(), 0).unwrap();
    let ino = fs.create(EXT2_ROOT_INO, "data.bin", &attrs(0o600)).unwrap();

    let data: Vec<u8> = (0..3 * 1024 + 37).map(|i| (i % 253) as u8).collect();
    fs.write_at(ino, 5, &data).unwrap();
    let device = fs.unmount().unwrap();

    let mut fs = Ext2FileSystem::mount(device, FsConfig::default(), 0).unwrap();
    assert_eq!(fs.lookup_path("/data.bin").unwrap(), ino);
    let mut back = vec![0u8; data.len()];
    assert_eq!(fs.read_at(ino, 5, &mut back).unwrap(), data.len());
    assert_eq!(back, data);
}

#[test]
fn test_double_indirect_file() {
    let opts = FormatOptions {
        blocks_count: 2048,
        inodes_count: 64,
        ..Default::default()
    };
    let device = fresh_image("dind", &opts);
    let mut fs = Ext2FileSystem::mount(device, FsConfig::default(), 0).unwrap();
    let ino = fs.create(EXT2_ROOT_INO, "large", &attrs(0o644)).unwrap();

    // 逻辑块 300 位于二级间接范围
    let offset = 300 * 1024 + 10;
    fs.write_at(ino, offset, b"deep").unwrap();
    let inode = fs.read_inode(ino).unwrap();
    assert_eq!(inode.block_ptr(12), 0);
    assert_ne!(inode.block_ptr(13), 0);
    // 数据块 + 二级间接块 + 一级间接块
    assert_eq!(inode.sectors(), 6);
    assert!(indirect::resolve(fs.block_device_mut(), &inode, 300).unwrap().is_some());
    assert_eq!(indirect::resolve(fs.block_device_mut(), &inode, 299).unwrap(), None);

    let mut buf = [0u8; 4];
    fs.read_at(ino, offset, &mut buf).unwrap();
    assert_eq!(&buf, b"deep");
}

#[test]
fn test_directory_enumeration() {
    let device = fresh_image("enumerate", &small_opts());
    let mut fs = Ext2FileSystem::mount(device, FsConfig::default(), 0).unwrap();
    let dir = fs.mkdir(EXT2_ROOT_INO, "many", &attrs(0o755)).unwrap();

    let names: Vec<String> = (0..60).map(|i| format!("entry-{:03}-{}", i, "x".repeat(i % 17))).collect();
    for name in &names {
        fs.create(dir, name, &attrs(0o644)).unwrap();
    }
    assert!(fs.read_inode(dir).unwrap().file_size() > 1024);

    let entries = fs.read_dir(dir).unwrap();
    assert_eq!(entries.len(), names.len() + 2);
    for name in &names {
        let entry = fs.find(dir, name).unwrap().unwrap();
        assert_eq!(entry.kind(), FileType::RegularFile);
        assert_eq!(fs.lookup_path(&format!("/many/{}", name)).unwrap(), entry.inode);
    }
    assert_eq!(fs.read_dir_entry(dir, names.len() + 2).unwrap(), None);
}

#[test]
fn test_unlink_returns_space() {
    let device = fresh_image("unlink", &small_opts());
    let mut fs = Ext2FileSystem::mount(device, FsConfig::default(), 0).unwrap();
    let before = fs.stat();

    let ino = fs.create(EXT2_ROOT_INO, "tmp", &attrs(0o644)).unwrap();
    fs.write_at(ino, 0, &vec![1u8; 40 * 1024]).unwrap();
    fs.unlink(EXT2_ROOT_INO, "tmp", 0).unwrap();
    let device = fs.unmount().unwrap();

    let fs = Ext2FileSystem::mount(device, FsConfig::default(), 0).unwrap();
    assert_eq!(fs.stat(), before);
    let sb = fs.superblock();
    let group = fs.group_descs().group(0).unwrap();
    assert_eq!(group.free_blocks_count(), sb.free_blocks_count());
    assert_eq!(group.free_inodes_count(), sb.free_inodes_count());
}

#[test]
fn test_4k_block_image_roundtrip() {
    let opts = FormatOptions {
        block_size: 4096,
        blocks_count: 4096,
        inodes_count: 512,
        ..Default::default()
    };
    let device = fresh_image("blocks4k", &opts);
    let mut fs = Ext2FileSystem::mount(device, FsConfig::default(), 0).unwrap();
    assert_eq!(fs.superblock().first_data_block(), 0);
    assert_eq!(fs.group_descs().start_block(), 1);
    let before = fs.stat();

    let dir = fs.mkdir(EXT2_ROOT_INO, "d", &attrs(0o755)).unwrap();
    let names: Vec<String> = (0..300).map(|i| format!("file-{:04}", i)).collect();
    for name in &names {
        fs.create(dir, name, &attrs(0o644)).unwrap();
    }
    // 300 条 20 字节的记录需要第二个目录块
    assert_eq!(fs.read_inode(dir).unwrap().file_size(), 2 * 4096);
    assert_eq!(fs.read_dir(dir).unwrap().len(), names.len() + 2);

    // 最后一个逻辑块 1040 > 12 + 1024，落在二级间接范围
    let big = fs.create(dir, "big", &attrs(0o644)).unwrap();
    let data: Vec<u8> = (0..1040 * 4096 + 123).map(|i| (i % 253) as u8).collect();
    fs.write_at(big, 7, &data).unwrap();
    let inode = fs.read_inode(big).unwrap();
    assert_ne!(inode.block_ptr(13), 0);
    // 1041 个数据块 + 一级间接块 + 二级间接块及其下一个一级间接块
    assert_eq!(inode.sectors(), 1044 * 8);
    assert!(indirect::resolve(fs.block_device_mut(), &inode, 12 + 1024).unwrap().is_some());

    let mut back = vec![0u8; data.len()];
    assert_eq!(fs.read_at(big, 7, &mut back).unwrap(), data.len());
    assert_eq!(back, data);

    fs.unlink(dir, "big", 0).unwrap();
    for name in &names {
        fs.unlink(dir, name, 0).unwrap();
    }
    fs.rmdir(EXT2_ROOT_INO, "d", 0).unwrap();
    let device = fs.unmount().unwrap();

    let fs = Ext2FileSystem::mount(device, FsConfig::default(), 0).unwrap();
    assert_eq!(fs.stat(), before);
    assert_eq!(fs.group_descs().group(0).unwrap().used_dirs_count(), 1);
}
