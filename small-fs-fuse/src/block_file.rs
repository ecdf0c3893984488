use std::cell::RefCell;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use block_dev::BlockDevice;
use send_wrapper::SendWrapper;
use small_fs::BLOCK_SIZE;

/// 以普通文件充当块设备，第 i 块位于文件的 `i * BLOCK_SIZE` 处
#[derive(Debug)]
pub struct BlockFile {
    inner: SendWrapper<RefCell<File>>,
}

impl BlockFile {
    pub fn new(fd: File) -> Self {
        Self {
            inner: SendWrapper::new(RefCell::new(fd)),
        }
    }

    /// 新建（或清空）一个能容纳`blocks`块的镜像
    pub fn create(path: &Path, blocks: usize) -> io::Result<Self> {
        let fd = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        fd.set_len((blocks * BLOCK_SIZE) as u64)?;
        Ok(Self::new(fd))
    }

    pub fn open(path: &Path) -> io::Result<Self> {
        let fd = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(Self::new(fd))
    }
}

impl BlockDevice for BlockFile {
    fn read_block(&self, block_id: usize, buf: &mut [u8]) {
        let mut file = self.inner.borrow_mut();
        file.seek(SeekFrom::Start((block_id * BLOCK_SIZE) as u64))
            .expect("seeking error");
        file.read_exact(&mut buf[..BLOCK_SIZE])
            .expect("not a complete block!");
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) {
        let mut file = self.inner.borrow_mut();
        file.seek(SeekFrom::Start((block_id * BLOCK_SIZE) as u64))
            .expect("seeking error");
        file.write_all(&buf[..BLOCK_SIZE])
            .expect("not a complete block!");
    }
}
