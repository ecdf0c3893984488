//! # 磁盘块管理器层
//!
//! 构建出磁盘的布局并使用：格式化、挂载，以及数据块区域的分配与回收。

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::ops::Range;

use block_dev::BlockDevice;

use crate::block_cache::BlockCacheManager;
use crate::layout::*;
use crate::{Error, Result};

/// 时间来源，返回自 Unix 纪元起的秒数
pub trait Clock: Send + Sync {
    fn now(&self) -> u32;
}

/// 磁盘几何：总块数 N 与主控块数 K（超级块 + 目录表）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub total_blocks: usize,
    pub master_blocks: usize,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            total_blocks: 16,
            master_blocks: 5,
        }
    }
}

impl Geometry {
    /// 块指针只有一字节，最多寻址256块；至少要有一个目录槽位和一个数据块
    pub fn validate(&self) -> Result<()> {
        if self.master_blocks < 2
            || self.master_blocks >= self.total_blocks
            || self.total_blocks > u8::MAX as usize + 1
        {
            return Err(Error::InvalidGeometry);
        }
        Ok(())
    }

    /// 最多能同时存在的文件数
    #[inline]
    pub fn file_capacity(&self) -> usize {
        self.master_blocks - 1
    }

    /// 数据块区域
    #[inline]
    pub fn data_blocks(&self) -> Range<usize> {
        self.master_blocks..self.total_blocks
    }
}

pub struct SmallFileSystem {
    pub(crate) cache: BlockCacheManager,
    clock: Box<dyn Clock>,
    geometry: Geometry,
}

impl SmallFileSystem {
    /// 格式化：写入空的超级块与目录表，并把数据块区域全部标记为空闲
    pub fn format(
        block_device: Arc<dyn BlockDevice>,
        geometry: Geometry,
        clock: Box<dyn Clock>,
        owner: Owner,
    ) -> Result<Self> {
        geometry.validate()?;

        let mut fs = Self {
            cache: BlockCacheManager::new(block_device),
            clock,
            geometry,
        };

        for id in 0..geometry.master_blocks {
            fs.cache.get(id).lock().zeroize();
        }
        for id in geometry.data_blocks() {
            fs.cache
                .get(id)
                .lock()
                .map_mut(0, |data_block: &mut DataBlock| data_block.release());
        }

        let root = FileAttr::new(FileKind::Directory, 0o755, 2, fs.now(), owner);
        fs.on_super_mut(|super_block| {
            super_block.init(
                geometry.total_blocks as u16,
                geometry.master_blocks as u8,
                root,
            )
        });
        fs.cache.sync_all();

        log::info!(
            "formatted: {} blocks, {} file slots, {} data blocks",
            geometry.total_blocks,
            geometry.file_capacity(),
            geometry.data_blocks().len()
        );
        Ok(fs)
    }

    /// 挂载已格式化的块设备
    pub fn mount(block_device: Arc<dyn BlockDevice>, clock: Box<dyn Clock>) -> Result<Self> {
        let mut cache = BlockCacheManager::new(block_device);
        let geometry = cache
            .get(0)
            .lock()
            .map(0, |super_block: &SuperBlock| {
                super_block.is_valid().then(|| Geometry {
                    total_blocks: super_block.total_blocks as usize,
                    master_blocks: super_block.master_blocks as usize,
                })
            })
            .ok_or(Error::NotFormatted)?;
        geometry.validate()?;

        log::info!("mounted: {geometry:?}");
        Ok(Self {
            cache,
            clock,
            geometry,
        })
    }

    #[inline]
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// 现存文件数
    pub fn file_count(&mut self) -> usize {
        let count = self.on_super(|super_block| super_block.file_count as usize);
        count.min(self.geometry.file_capacity())
    }

    /// 空闲数据块数
    pub fn free_blocks(&mut self) -> usize {
        self.geometry
            .data_blocks()
            .filter(|&id| {
                self.cache.get(id).lock().map(0, |data_block: &DataBlock| {
                    data_block.tag() == Some(BlockTag::Free)
                })
            })
            .count()
    }
}

impl SmallFileSystem {
    /// 在数据块区域内按编号从小到大找第一个空闲块，标记为已分配并返回其编号。
    /// 若数据块区域用尽，则返回空。
    pub(crate) fn alloc_block(&mut self) -> Option<BlockId> {
        for id in self.geometry.data_blocks() {
            let cache = self.cache.get(id);
            let mut cache = cache.lock();
            if cache.map(0, |data_block: &DataBlock| data_block.tag()) != Some(BlockTag::Free) {
                continue;
            }
            cache.map_mut(0, |data_block: &mut DataBlock| {
                data_block.set_tag(BlockTag::Reserved)
            });

            let id = BlockId::new(id as u8);
            log::debug!("alloc block {id}");
            return Some(id);
        }

        None
    }

    /// 一次分配`count`个块，要么全部成功，要么一个也不占
    pub(crate) fn alloc_blocks(&mut self, count: usize) -> Result<Vec<BlockId>> {
        let mut blocks = Vec::with_capacity(count);
        for _ in 0..count {
            match self.alloc_block() {
                Some(id) => blocks.push(id),
                None => {
                    log::warn!("need {count} blocks, only {} free", blocks.len());
                    for id in blocks {
                        self.dealloc_block(id);
                    }
                    return Err(Error::OutOfSpace);
                }
            }
        }

        Ok(blocks)
    }

    pub(crate) fn dealloc_block(&mut self, id: BlockId) {
        log::debug!("dealloc block {id}");
        self.on_data_block_mut(id, DataBlock::release);
    }

    pub(crate) fn now(&self) -> u32 {
        self.clock.now()
    }

    /// 下一个句柄
    pub(crate) fn next_handle(&mut self) -> u8 {
        self.on_super_mut(SuperBlock::bump_handle)
    }

    /// 执行一次完整的操作，结束后把缓存写回块设备
    pub(crate) fn synced<V>(&mut self, f: impl FnOnce(&mut Self) -> Result<V>) -> Result<V> {
        let result = f(self);
        self.cache.sync_all();
        result
    }

    pub(crate) fn on_super<V>(&mut self, f: impl FnOnce(&SuperBlock) -> V) -> V {
        self.cache.get(0).lock().map(0, f)
    }

    pub(crate) fn on_super_mut<V>(&mut self, f: impl FnOnce(&mut SuperBlock) -> V) -> V {
        self.cache.get(0).lock().map_mut(0, f)
    }

    pub(crate) fn on_data_block<V>(&mut self, id: BlockId, f: impl FnOnce(&DataBlock) -> V) -> V {
        self.cache.get(id.index()).lock().map(0, f)
    }

    pub(crate) fn on_data_block_mut<V>(
        &mut self,
        id: BlockId,
        f: impl FnOnce(&mut DataBlock) -> V,
    ) -> V {
        self.cache.get(id.index()).lock().map_mut(0, f)
    }
}
