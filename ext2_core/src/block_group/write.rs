//! 块组描述符表写回

use alloc::vec;

use super::BgdTable;
use crate::{
    block::{BlockDev, BlockDevice},
    consts::*,
    error::Result,
};

impl BgdTable {
    /// 整体写回块组描述符表
    ///
    /// 表所在块中最后一个描述符之后的字节写为 0。
    pub fn flush<D: BlockDevice>(&self, bdev: &mut BlockDev<D>) -> Result<()> {
        let block_size = bdev.block_size() as usize;
        let mut raw = vec![0u8; self.blocks as usize * block_size];

        for (group, chunk) in self.groups.iter().zip(raw.chunks_exact_mut(EXT2_GROUP_DESC_SIZE)) {
            group.inner.to_bytes(chunk);
        }

        for (i, chunk) in raw.chunks_exact(block_size).enumerate() {
            bdev.write_block(self.start_block + i as u64, chunk)?;
        }
        Ok(())
    }
}
