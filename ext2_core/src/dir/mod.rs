//! 目录项管理
//!
//! 目录数据块由变长记录紧密排列而成，同一块内所有记录的 `rec_len`
//! 之和恰好等于块大小。inode 为 0 的记录是可复用的空闲槽位。

mod entry;
mod insert;
mod lookup;
mod remove;

pub use entry::*;
pub use insert::*;
pub use lookup::*;
pub use remove::*;
