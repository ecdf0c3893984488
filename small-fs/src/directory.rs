//! # 目录表层
//!
//! 目录表是定长的槽位数组，第 i 个槽位就是第 i 块。
//! 被占用的槽位总是连续的 `1..=file_count`，删除文件时后面的槽位整体左移一格。

use alloc::vec::Vec;

use crate::layout::*;
use crate::{Error, NAME_MAX_LEN, Result, SmallFileSystem};

/// 路径解析的结果：根目录或某个目录槽位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    Root,
    File(usize),
}

impl SmallFileSystem {
    /// 在已占用的槽位中按名字查找
    pub fn lookup(&mut self, name: &[u8]) -> Option<usize> {
        (1..=self.file_count()).find(|&slot| self.on_slot(slot, |entry| entry.matches(name)))
    }

    /// 在第一个空槽位上建立文件，并为它分配首个数据块。返回新句柄。
    pub(crate) fn create_entry(&mut self, name: &[u8], mode: u16, owner: Owner) -> Result<u8> {
        validate_name(name)?;
        if self.lookup(name).is_some() {
            return Err(Error::AlreadyExists);
        }

        let count = self.file_count();
        if count == self.geometry().file_capacity() {
            log::warn!("directory table is full ({count} files)");
            return Err(Error::CapacityExceeded);
        }

        // 先拿到数据块，失败时不占用槽位
        let head = self.alloc_block().ok_or(Error::OutOfSpace)?;
        self.on_data_block_mut(head, |data_block| {
            data_block.set_next(None);
            data_block.set_tag(BlockTag::Linked);
        });

        let attr = FileAttr::new(FileKind::Regular, mode, 1, self.now(), owner);
        self.on_slot_mut(count + 1, |entry| *entry = DirEntry::new(name, head, attr));
        log::debug!("create slot={} head={head}", count + 1);

        Ok(self.on_super_mut(|super_block| {
            super_block.file_count += 1;
            super_block.bump_handle()
        }))
    }

    /// 回收文件的全部数据块，再把后面的槽位左移一格。
    ///
    /// 链表损坏时只回收损坏处之前的块，槽位照样释放。
    pub(crate) fn remove_entry(&mut self, slot: usize) -> Result<()> {
        let blocks = match self.file_chain(slot) {
            Ok(blocks) => blocks,
            Err(Error::CorruptChain) => {
                let head = self.on_slot(slot, DirEntry::head_block);
                let (blocks, bad) = head.map(|head| self.walk_chain(head)).unwrap_or_default();
                log::warn!(
                    "slot {slot}: removing a broken chain, freeing {} blocks, stopped at {bad:?}",
                    blocks.len()
                );
                blocks
            }
            Err(e) => return Err(e),
        };
        for id in blocks {
            self.dealloc_block(id);
        }

        let count = self.file_count();
        for i in slot..count {
            let next = self.on_slot(i + 1, DirEntry::clone);
            self.on_slot_mut(i, |entry| *entry = next);
        }
        self.on_slot_mut(count, |entry| *entry = DirEntry::default());
        self.on_super_mut(|super_block| super_block.file_count -= 1);
        log::debug!("remove slot={slot}, {} files left", count - 1);

        Ok(())
    }

    /// 按槽位顺序列出所有文件名
    pub(crate) fn names(&mut self) -> Vec<Vec<u8>> {
        (1..=self.file_count())
            .map(|slot| self.on_slot(slot, |entry| entry.name().to_vec()))
            .collect()
    }

    pub(crate) fn attr(&mut self, node: Node) -> FileAttr {
        match node {
            Node::Root => self.on_super(|super_block| super_block.root),
            Node::File(slot) => self.on_slot(slot, |entry| entry.attr),
        }
    }

    pub(crate) fn update_attr<V>(&mut self, node: Node, f: impl FnOnce(&mut FileAttr) -> V) -> V {
        match node {
            Node::Root => self.on_super_mut(|super_block| f(&mut super_block.root)),
            Node::File(slot) => self.on_slot_mut(slot, |entry| f(&mut entry.attr)),
        }
    }

    pub(crate) fn set_mode(&mut self, node: Node, mode: u16) {
        let now = self.now();
        self.update_attr(node, |attr| {
            attr.set_permissions(mode);
            attr.ctime = now;
        });
    }

    pub(crate) fn set_owner(&mut self, node: Node, owner: Owner) {
        let now = self.now();
        self.update_attr(node, |attr| {
            attr.uid = owner.uid;
            attr.gid = owner.gid;
            attr.ctime = now;
        });
    }

    /// 缺省的时间取当前时间
    pub(crate) fn set_times(&mut self, node: Node, atime: Option<u32>, mtime: Option<u32>) {
        let now = self.now();
        self.update_attr(node, |attr| {
            attr.atime = atime.unwrap_or(now);
            attr.mtime = mtime.unwrap_or(now);
        });
    }

    pub(crate) fn on_slot<V>(&mut self, slot: usize, f: impl FnOnce(&DirEntry) -> V) -> V {
        debug_assert!((1..self.geometry().master_blocks).contains(&slot));
        self.cache.get(slot).lock().map(0, f)
    }

    pub(crate) fn on_slot_mut<V>(&mut self, slot: usize, f: impl FnOnce(&mut DirEntry) -> V) -> V {
        debug_assert!((1..self.geometry().master_blocks).contains(&slot));
        self.cache.get(slot).lock().map_mut(0, f)
    }
}

fn validate_name(name: &[u8]) -> Result<()> {
    if name.is_empty() || name.iter().any(|&c| c == b'/' || c == 0) {
        return Err(Error::InvalidName);
    }
    if name.len() > NAME_MAX_LEN {
        return Err(Error::NameTooLong);
    }
    Ok(())
}
