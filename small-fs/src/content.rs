//! # 文件内容层
//!
//! 文件内容存放在一条单向链表上：目录项持有链表头，
//! 每个数据块记录后继块的编号，0 表示末尾。
//!
//! 链表上的块数恒为 `max(1, ceil(size / PAYLOAD_SIZE))`，空文件也占一个块。
//! 写入前先一次性分配所需的全部新块，分配失败时文件与空闲块都保持原样。

use alloc::vec::Vec;

use crate::layout::*;
use crate::{Error, Node, PAYLOAD_SIZE, Result, SmallFileSystem};

/// 容纳`size`字节需要的块数
#[inline]
pub(crate) fn blocks_for(size: usize) -> usize {
    size.div_ceil(PAYLOAD_SIZE).max(1)
}

impl SmallFileSystem {
    /// 从`head`出发沿链表收集块编号。
    /// 步数以数据块区域的大小为界，越界、成环或遇到未挂链的块都视为损坏。
    pub(crate) fn chain(&mut self, head: BlockId) -> Result<Vec<BlockId>> {
        match self.walk_chain(head) {
            (blocks, None) => Ok(blocks),
            (_, Some(bad)) => {
                log::warn!("chain from {head} is broken at {bad}");
                Err(Error::CorruptChain)
            }
        }
    }

    /// 沿链表走到末尾或第一个损坏处，返回走过的完好前缀与损坏处的块编号
    pub(crate) fn walk_chain(&mut self, head: BlockId) -> (Vec<BlockId>, Option<BlockId>) {
        let area = self.geometry().data_blocks();
        let mut blocks: Vec<BlockId> = Vec::new();
        let mut current = Some(head);

        while let Some(id) = current {
            if blocks.len() == area.len() || !area.contains(&id.index()) || blocks.contains(&id) {
                return (blocks, Some(id));
            }

            let (tag, next) = self.on_data_block(id, |data_block| {
                (data_block.tag(), data_block.next())
            });
            if tag != Some(BlockTag::Linked) {
                return (blocks, Some(id));
            }

            blocks.push(id);
            current = next;
        }

        (blocks, None)
    }

    /// 文件的整条链表，块数须与记录的大小相符
    pub(crate) fn file_chain(&mut self, slot: usize) -> Result<Vec<BlockId>> {
        let (head, size) = self.on_slot(slot, |entry| (entry.head_block(), entry.attr.size));
        let blocks = self.chain(head.ok_or(Error::CorruptChain)?)?;
        if blocks.len() != blocks_for(size as usize) {
            log::warn!(
                "slot {slot}: size {size} needs {} blocks, chain has {}",
                blocks_for(size as usize),
                blocks.len()
            );
            return Err(Error::CorruptChain);
        }

        Ok(blocks)
    }

    /// 读出整个文件；末块的补零不会出现在结果里
    pub(crate) fn read_all(&mut self, slot: usize) -> Result<Vec<u8>> {
        let size = self.on_slot(slot, |entry| entry.attr.size) as usize;
        let blocks = self.file_chain(slot)?;

        let mut data = Vec::with_capacity(blocks.len() * PAYLOAD_SIZE);
        for id in blocks {
            self.on_data_block(id, |data_block| data.extend_from_slice(&data_block.payload));
        }
        data.truncate(size);

        Ok(data)
    }

    /// 从头覆写。
    ///
    /// 旧链表上的块按顺序复用，不够的一次分配齐，多出来的归还。
    pub(crate) fn write_from_start(&mut self, slot: usize, data: &[u8]) -> Result<()> {
        let old = self.file_chain(slot)?;
        let needed = blocks_for(data.len());
        let fresh = self.alloc_blocks(needed.saturating_sub(old.len()))?;

        let kept = needed.min(old.len());
        for &id in &old[kept..] {
            self.dealloc_block(id);
        }
        let blocks: Vec<BlockId> = old[..kept].iter().copied().chain(fresh).collect();
        self.fill_chain(&blocks, data);

        log::debug!("slot {slot}: wrote {} bytes over {} blocks", data.len(), blocks.len());
        self.resize(slot, data.len());
        Ok(())
    }

    /// 在文件末尾追加。
    ///
    /// 末块剩余空间放得下就直接写入，否则先填满末块，再把溢出部分写进新块。
    pub(crate) fn append(&mut self, slot: usize, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }

        let size = self.on_slot(slot, |entry| entry.attr.size) as usize;
        let blocks = self.file_chain(slot)?;
        let last = *blocks.last().ok_or(Error::CorruptChain)?;

        // 末块已用字节数
        let used = size - (blocks.len() - 1) * PAYLOAD_SIZE;
        let (tail, overflow) = data.split_at(data.len().min(PAYLOAD_SIZE - used));
        let fresh = self.alloc_blocks(overflow.len().div_ceil(PAYLOAD_SIZE))?;

        self.on_data_block_mut(last, |data_block| {
            data_block.payload[used..used + tail.len()].copy_from_slice(tail);
            if let Some(&first) = fresh.first() {
                data_block.set_next(Some(first));
            }
        });
        self.fill_chain(&fresh, overflow);

        log::debug!(
            "slot {slot}: appended {} bytes, {} new blocks",
            data.len(),
            fresh.len()
        );
        self.resize(slot, size + data.len());
        Ok(())
    }

    /// 截断或补零到`len`字节，目录项的其余属性不变
    pub(crate) fn truncate_to(&mut self, slot: usize, len: usize) -> Result<()> {
        let current = self.file_chain(slot)?.len();
        if blocks_for(len) > current + self.free_blocks() {
            return Err(Error::OutOfSpace);
        }

        let mut data = self.read_all(slot)?;
        data.resize(len, 0);
        self.write_from_start(slot, &data)
    }

    /// 把`data`依次切片写入`blocks`并串成链表，末块补零、后继置空
    fn fill_chain(&mut self, blocks: &[BlockId], data: &[u8]) {
        let mut chunks = data.chunks(PAYLOAD_SIZE);
        for (i, &id) in blocks.iter().enumerate() {
            let chunk = chunks.next().unwrap_or_default();
            let next = blocks.get(i + 1).copied();
            self.on_data_block_mut(id, |data_block| {
                data_block.payload.fill(0);
                data_block.payload[..chunk.len()].copy_from_slice(chunk);
                data_block.set_next(next);
                data_block.set_tag(BlockTag::Linked);
            });
        }
    }

    fn resize(&mut self, slot: usize, size: usize) {
        let now = self.now();
        self.update_attr(Node::File(slot), |attr| {
            attr.size = size as u32;
            attr.mtime = now;
            attr.ctime = now;
        });
    }
}
