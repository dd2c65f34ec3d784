//! 块设备抽象
//!
//! 提供块设备接口、以文件系统块为单位的 I/O，以及独占的块缓冲区。

mod buf;
mod device;
mod io;
mod mem;

pub use buf::Block;
pub use device::{BlockDev, BlockDevice};
pub use mem::MemDevice;
