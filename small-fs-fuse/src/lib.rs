#[cfg(test)]
mod tests;

mod block_file;
mod ops;

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use libc::c_int;
use small_fs::{Clock, Error};

pub use self::{block_file::BlockFile, ops::SmallOps};

/// 宿主机的系统时钟
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u32 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, epoch_secs)
    }
}

/// 磁盘上的时间戳是 32 位秒数，超出范围时取最大值
fn epoch_secs(elapsed: Duration) -> u32 {
    u32::try_from(elapsed.as_secs()).unwrap_or(u32::MAX)
}

/// 文件系统错误对应的 errno
pub fn errno(error: Error) -> c_int {
    match error {
        Error::NotFound => libc::ENOENT,
        Error::AlreadyExists => libc::EEXIST,
        Error::CapacityExceeded | Error::OutOfSpace => libc::ENOSPC,
        Error::CorruptChain | Error::NotFormatted => libc::EIO,
        Error::NameTooLong => libc::ENAMETOOLONG,
        Error::InvalidName | Error::UnsupportedOffset | Error::InvalidGeometry => libc::EINVAL,
        Error::IsADirectory => libc::EISDIR,
        Error::NotADirectory => libc::ENOTDIR,
    }
}
