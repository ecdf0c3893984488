//! # 磁盘数据结构层
//!
//! small-fs 的磁盘布局（K 为主控块数，N 为总块数）：
//! 超级块(0) | 目录表(1..K) | 数据块区域(K..N)
//!
//! 每种结构都恰好放进一个块，并且总是位于块首。

mod attr;
pub use attr::{FileAttr, FileKind, Owner, PERM_MASK, S_IFMT};

mod super_block;
pub use super_block::SuperBlock;

/// 目录表的一个槽位，也属于磁盘文件系统数据结构
mod dir_entry;
pub use dir_entry::DirEntry;

mod data_block;
pub use data_block::{BlockId, BlockTag, DataBlock};
