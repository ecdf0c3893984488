#![no_std]

extern crate alloc;

/* small-fs 的整体架构，自上而下 */

// 路径层：以路径为参数的文件系统回调接口
mod vfs;

// 文件内容层：数据块链表的读、覆写、追加、截断
mod content;

// 目录表层：定长槽位数组，删除时左移压缩
mod directory;

// 磁盘块管理器层：格式化、挂载、数据块分配
mod sfs;

// 磁盘数据结构层：表示磁盘文件系统的数据结构
pub mod layout;

// 块缓存层：内存上的磁盘块数据缓存
mod block_cache;

mod error;


pub use block_dev::BlockDevice;

pub use self::{
    directory::Node,
    error::{Error, Result},
    layout::{BlockId, FileAttr, FileKind, Owner},
    sfs::{Clock, Geometry, SmallFileSystem},
    vfs::StatFs,
};

pub const MAGIC: u32 = 0x534d_4c31;
/// 块宽
pub const BLOCK_SIZE: usize = 64;
/// 数据块头部：占用标记 + 后继指针
pub const BLOCK_HEADER: usize = 2;
/// 每个数据块可容纳的文件字节数
pub const PAYLOAD_SIZE: usize = BLOCK_SIZE - BLOCK_HEADER;
/// 文件名的最大字节数，不含结尾的 \0
pub const NAME_MAX_LEN: usize = 16;
