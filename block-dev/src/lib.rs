//! # 块设备接口层
//!
//! 块设备是以**块**为单位存储数据的设备，[`BlockDevice`] 就是对读写块设备的抽象，
//! 实现了此特质的类型称为**块设备驱动**。
//!
//! 约定：块宽与块数在格式化时就已确定，驱动只负责按编号读写整块，
//! 对合法编号的读写总是成功的。

#![no_std]

use core::any::Any;

/// 块设备驱动特质
pub trait BlockDevice: Send + Sync + Any {
    /// 把编号为`block_id`的整块读入`buf`
    fn read_block(&self, block_id: usize, buf: &mut [u8]);

    /// 用`buf`覆盖编号为`block_id`的整块
    fn write_block(&self, block_id: usize, buf: &[u8]);
}
