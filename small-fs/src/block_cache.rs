//! # 块缓存层
//!
//! 把即将操作的块复制到内存中，操作完成后统一写回块设备。
//! 块缓存层对使用者来说是透明的，使用者对块设备的操作都经过块缓存层，
//! 且**操作块时一定在缓冲区当中**。
//!
//! 与全局缓存不同，每个挂载的文件系统独占一个 [`BlockCacheManager`]，
//! 两块不同的磁盘不会在缓存里相互覆盖。

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::mem;

use block_dev::BlockDevice;
use spin::Mutex;

use crate::BLOCK_SIZE;

/// 块缓存管理，缓存、调度块缓存
pub struct BlockCacheManager {
    block_device: Arc<dyn BlockDevice>,
    queue: Vec<(usize, Arc<Mutex<BlockCache>>)>,
}

/// 对齐到8字节，磁盘结构可以直接映射到缓冲区上
#[repr(C, align(8))]
struct RawBlock([u8; BLOCK_SIZE]);

/// 内存中的块缓存
pub struct BlockCache {
    /// 缓存的数据
    data: RawBlock,
    /// 对应的块ID
    block_id: usize,
    /// 底层块设备的引用
    block_device: Arc<dyn BlockDevice>,
    /// 是否为脏块
    modified: bool,
}

impl BlockCache {
    pub fn new(block_id: usize, block_device: Arc<dyn BlockDevice>) -> Self {
        let mut data = RawBlock([0; BLOCK_SIZE]);
        block_device.read_block(block_id, &mut data.0);

        Self {
            data,
            block_id,
            block_device,
            modified: false,
        }
    }

    pub fn sync(&mut self) {
        if self.modified {
            self.modified = false;
            self.block_device.write_block(self.block_id, &self.data.0);
        }
    }

    pub fn get<T: Sized>(&self, offset: usize) -> &T {
        Self::check_bounds::<T>(offset);
        // SAFETY: 范围与对齐已检查，磁盘结构全部由整数字段构成，任意位模式都合法
        unsafe { &*self.data.0.as_ptr().add(offset).cast::<T>() }
    }

    pub fn get_mut<T: Sized>(&mut self, offset: usize) -> &mut T {
        Self::check_bounds::<T>(offset);
        self.modified = true;
        // SAFETY: 同上
        unsafe { &mut *self.data.0.as_mut_ptr().add(offset).cast::<T>() }
    }

    #[inline]
    pub fn map<T: Sized, V>(&self, offset: usize, f: impl FnOnce(&T) -> V) -> V {
        f(self.get(offset))
    }

    #[inline]
    pub fn map_mut<T: Sized, V>(&mut self, offset: usize, f: impl FnOnce(&mut T) -> V) -> V {
        f(self.get_mut(offset))
    }

    #[inline]
    pub fn zeroize(&mut self) {
        self.data.0.fill(0);
        self.modified = true;
    }
}

impl BlockCache {
    fn check_bounds<T>(offset: usize) {
        assert!(mem::size_of::<T>() + offset <= BLOCK_SIZE);
        assert!(mem::align_of::<T>() <= mem::align_of::<RawBlock>());
        assert_eq!(offset % mem::align_of::<T>(), 0);
    }
}

impl Drop for BlockCache {
    fn drop(&mut self) {
        self.sync();
    }
}

impl BlockCacheManager {
    /// 块缓存个数的上限
    const CAPACITY: usize = 16;

    pub fn new(block_device: Arc<dyn BlockDevice>) -> Self {
        Self {
            block_device,
            queue: Vec::with_capacity(Self::CAPACITY),
        }
    }

    // 块缓存调度策略：踢走闲置块
    pub fn get(&mut self, block_id: usize) -> Arc<Mutex<BlockCache>> {
        // 尝试从缓冲区中读取块
        if let Some(cache) = self
            .queue
            .iter()
            .find_map(|(id, cache)| (block_id == *id).then_some(cache))
        {
            return Arc::clone(cache);
        };

        // 触及上限，写回一个没有其它引用的块；都在用就暂时超出上限
        if self.queue.len() >= Self::CAPACITY {
            if let Some(index) = self
                .queue
                .iter()
                .position(|(_, cache)| Arc::strong_count(cache) == 1)
            {
                self.queue.remove(index);
            }
        }

        // 缓存新块
        let block_cache = Arc::new(Mutex::new(BlockCache::new(
            block_id,
            self.block_device.clone(),
        )));
        self.queue.push((block_id, block_cache.clone()));

        block_cache
    }

    pub fn sync_all(&self) {
        self.queue
            .iter()
            .for_each(|(_, cache)| cache.lock().sync());
    }
}
