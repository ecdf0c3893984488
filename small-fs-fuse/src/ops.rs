//! 文件系统回调：每个 POSIX 文件系统原语对应一个方法，错误以 errno 返回。
//!
//! 所有调用都经过同一把锁，核心层看到的永远是串行的操作序列。

use libc::c_int;
use small_fs::{FileAttr, Owner, SmallFileSystem, StatFs};
use spin::Mutex;

use crate::errno;

pub struct SmallOps {
    fs: Mutex<SmallFileSystem>,
}

type Reply<T> = Result<T, c_int>;

impl SmallOps {
    pub fn new(fs: SmallFileSystem) -> Self {
        Self { fs: Mutex::new(fs) }
    }

    pub fn getattr(&self, path: &str) -> Reply<FileAttr> {
        self.fs.lock().getattr(path).map_err(errno)
    }

    pub fn create(&self, path: &str, mode: u32, uid: u32, gid: u32) -> Reply<u64> {
        self.fs
            .lock()
            .create(path, perm_bits(mode), Owner { uid, gid })
            .map(u64::from)
            .map_err(errno)
    }

    pub fn open(&self, path: &str, _flags: i32) -> Reply<u64> {
        self.fs.lock().open(path).map(u64::from).map_err(errno)
    }

    pub fn read(&self, path: &str, size: u32, offset: i64) -> Reply<Vec<u8>> {
        let offset = u64::try_from(offset).map_err(|_| libc::EINVAL)?;
        self.fs
            .lock()
            .read(path, size as usize, offset)
            .map_err(errno)
    }

    pub fn write(&self, path: &str, data: &[u8], offset: i64) -> Reply<u32> {
        let offset = u64::try_from(offset).map_err(|_| libc::EINVAL)?;
        let written = self.fs.lock().write(path, data, offset).map_err(errno)?;
        u32::try_from(written).map_err(|_| libc::EFBIG)
    }

    pub fn unlink(&self, path: &str) -> Reply<()> {
        self.fs.lock().unlink(path).map_err(errno)
    }

    pub fn truncate(&self, path: &str, length: i64) -> Reply<()> {
        let length = u64::try_from(length).map_err(|_| libc::EINVAL)?;
        self.fs.lock().truncate(path, length).map_err(errno)
    }

    pub fn chmod(&self, path: &str, mode: u32) -> Reply<()> {
        self.fs.lock().chmod(path, perm_bits(mode)).map_err(errno)
    }

    pub fn chown(&self, path: &str, uid: u32, gid: u32) -> Reply<()> {
        self.fs
            .lock()
            .chown(path, Owner { uid, gid })
            .map_err(errno)
    }

    /// `times`为`(atime, mtime)`，缺省取当前时间
    pub fn utimens(&self, path: &str, times: Option<(u32, u32)>) -> Reply<()> {
        let (atime, mtime) = times.unzip();
        self.fs.lock().utimens(path, atime, mtime).map_err(errno)
    }

    pub fn readdir(&self, path: &str) -> Reply<Vec<String>> {
        self.fs.lock().readdir(path).map_err(errno)
    }

    pub fn statfs(&self, path: &str) -> StatFs {
        self.fs.lock().statfs(path)
    }

    /* 扩展属性与符号链接：存储层不支持，只做空处理 */

    pub fn getxattr(&self, _path: &str, _name: &str) -> Reply<Vec<u8>> {
        Ok(Vec::new())
    }

    pub fn listxattr(&self, _path: &str) -> Reply<Vec<u8>> {
        Ok(Vec::new())
    }

    pub fn setxattr(&self, _path: &str, _name: &str, _value: &[u8]) -> Reply<()> {
        Ok(())
    }

    pub fn removexattr(&self, _path: &str, _name: &str) -> Reply<()> {
        Ok(())
    }

    /// 这里没有任何东西是符号链接
    pub fn readlink(&self, path: &str) -> Reply<Vec<u8>> {
        self.getattr(path)?;
        Err(libc::EINVAL)
    }

    /// 空闲数据块数，statfs 不反映它
    pub fn free_blocks(&self) -> usize {
        self.fs.lock().free_blocks()
    }
}

/// 系统调用给的是完整的 mode，这里只取权限位
fn perm_bits(mode: u32) -> u16 {
    (mode & 0o7777) as u16
}
