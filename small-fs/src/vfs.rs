//! # 路径层
//!
//! 以路径为参数的文件系统回调接口，每个操作对应一个 POSIX 文件系统原语。
//! 目录只有根目录 `/` 一层，`/name` 指向目录表中的文件。
//!
//! 每个操作结束时都会把块缓存写回块设备。

use alloc::string::String;
use alloc::vec::Vec;

use crate::layout::{FileAttr, Owner};
use crate::{Error, Node, Result, SmallFileSystem};

/// 文件系统统计信息，是固定值，不反映真实占用
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatFs {
    pub block_size: u32,
    pub blocks: u64,
    pub blocks_available: u64,
}

impl StatFs {
    pub const FIXED: Self = Self {
        block_size: 512,
        blocks: 4096,
        blocks_available: 2048,
    };
}

impl SmallFileSystem {
    pub fn getattr(&mut self, path: &str) -> Result<FileAttr> {
        self.synced(|fs| {
            let node = fs.resolve(path)?;
            Ok(fs.attr(node))
        })
    }

    /// 创建空文件并返回句柄
    pub fn create(&mut self, path: &str, mode: u16, owner: Owner) -> Result<u8> {
        log::debug!("create path={path:?} mode={mode:#o}");
        self.synced(|fs| {
            if path == "/" {
                return Err(Error::AlreadyExists);
            }
            let name = path.strip_prefix('/').ok_or(Error::InvalidName)?;
            fs.create_entry(name.as_bytes(), mode, owner)
        })
    }

    /// 句柄只是递增的编号，与文件本身无关
    pub fn open(&mut self, path: &str) -> Result<u8> {
        self.synced(|fs| {
            fs.resolve(path)?;
            Ok(fs.next_handle())
        })
    }

    /// 读取`[offset, offset + len)`范围内的内容，超出文件末尾的部分不返回
    pub fn read(&mut self, path: &str, len: usize, offset: u64) -> Result<Vec<u8>> {
        self.synced(|fs| {
            let slot = fs.resolve_file(path)?;
            let mut data = fs.read_all(slot)?;

            let start = usize::try_from(offset).map_or(data.len(), |o| o.min(data.len()));
            let end = start.saturating_add(len).min(data.len());
            data.truncate(end);
            data.drain(..start);
            Ok(data)
        })
    }

    /// 偏移为 0 时整体覆写，偏移等于文件大小时追加，其余偏移不支持。
    /// 返回写入的字节数。
    pub fn write(&mut self, path: &str, data: &[u8], offset: u64) -> Result<usize> {
        log::debug!("write path={path:?} len={} offset={offset}", data.len());
        self.synced(|fs| {
            let slot = fs.resolve_file(path)?;
            let size = fs.attr(Node::File(slot)).size as u64;

            if offset == 0 {
                fs.write_from_start(slot, data)?;
            } else if offset == size {
                fs.append(slot, data)?;
            } else {
                log::warn!("write at {offset} into a {size} byte file");
                return Err(Error::UnsupportedOffset);
            }
            Ok(data.len())
        })
    }

    pub fn unlink(&mut self, path: &str) -> Result<()> {
        log::debug!("unlink path={path:?}");
        self.synced(|fs| {
            let slot = fs.resolve_file(path)?;
            fs.remove_entry(slot)
        })
    }

    pub fn truncate(&mut self, path: &str, len: u64) -> Result<()> {
        self.synced(|fs| {
            let slot = fs.resolve_file(path)?;
            let len = usize::try_from(len).map_err(|_| Error::OutOfSpace)?;
            fs.truncate_to(slot, len)
        })
    }

    pub fn chmod(&mut self, path: &str, mode: u16) -> Result<()> {
        self.synced(|fs| {
            let node = fs.resolve(path)?;
            fs.set_mode(node, mode);
            Ok(())
        })
    }

    pub fn chown(&mut self, path: &str, owner: Owner) -> Result<()> {
        self.synced(|fs| {
            let node = fs.resolve(path)?;
            fs.set_owner(node, owner);
            Ok(())
        })
    }

    pub fn utimens(&mut self, path: &str, atime: Option<u32>, mtime: Option<u32>) -> Result<()> {
        self.synced(|fs| {
            let node = fs.resolve(path)?;
            fs.set_times(node, atime, mtime);
            Ok(())
        })
    }

    /// `.`、`..`，随后按槽位顺序列出文件
    pub fn readdir(&mut self, path: &str) -> Result<Vec<String>> {
        self.synced(|fs| {
            if fs.resolve(path)? != Node::Root {
                return Err(Error::NotADirectory);
            }

            let mut names = Vec::with_capacity(fs.file_count() + 2);
            names.push(String::from("."));
            names.push(String::from(".."));
            names.extend(
                fs.names()
                    .into_iter()
                    .map(|name| String::from_utf8_lossy(&name).into_owned()),
            );
            Ok(names)
        })
    }

    pub fn statfs(&self, _path: &str) -> StatFs {
        StatFs::FIXED
    }
}

impl SmallFileSystem {
    fn resolve(&mut self, path: &str) -> Result<Node> {
        if path == "/" {
            return Ok(Node::Root);
        }

        path.strip_prefix('/')
            .and_then(|name| self.lookup(name.as_bytes()))
            .map(Node::File)
            .ok_or(Error::NotFound)
    }

    /// 只接受普通文件
    fn resolve_file(&mut self, path: &str) -> Result<usize> {
        match self.resolve(path)? {
            Node::File(slot) => Ok(slot),
            Node::Root => Err(Error::IsADirectory),
        }
    }
}
