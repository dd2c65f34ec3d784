//! 工具函数模块，提供时间戳换算。

use core::time::Duration;

use crate::SystemHal;

/// 当前时间（秒），HAL 不提供时间时为 0
pub(crate) fn now_secs<Hal: SystemHal>() -> u32 {
    Hal::now().map_or(0, |dur| encode_time(&dur))
}

/// 将Duration转换为ext2存储的32位秒数
pub(crate) fn encode_time(dur: &Duration) -> u32 {
    dur.as_secs().min(u32::MAX as u64) as u32
}

/// 将ext2存储的秒数转换为Duration
pub(crate) fn decode_time(time: u32) -> Duration {
    Duration::from_secs(time as u64)
}
