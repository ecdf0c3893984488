use core::fmt;

use derive_more::{From, Into};

use crate::PAYLOAD_SIZE;

/// 块编号。磁盘上的指针只有一字节，0 号块是超级块，所以 0 兼作空指针。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into)]
#[repr(transparent)]
pub struct BlockId(u8);

impl BlockId {
    pub const NULL: Self = Self(0);

    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn non_null(self) -> Option<Self> {
        (self != Self::NULL).then_some(self)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 数据块的占用状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BlockTag {
    /// 已挂在某个文件的链表上
    Linked = 0,
    /// 空闲，格式化时写下的就是它
    Free = 1,
    /// 已分配，尚未写入链表
    Reserved = 2,
}

impl TryFrom<u8> for BlockTag {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::Linked),
            1 => Ok(Self::Free),
            2 => Ok(Self::Reserved),
            raw => Err(raw),
        }
    }
}

/// 数据块：占用标记 | 后继指针 | 文件内容
#[repr(C)]
pub struct DataBlock {
    tag: u8,
    /// 0 表示链表末尾
    next: u8,
    pub payload: [u8; PAYLOAD_SIZE],
}

impl DataBlock {
    /// 标记字节不合法时返回空
    #[inline]
    pub fn tag(&self) -> Option<BlockTag> {
        BlockTag::try_from(self.tag).ok()
    }

    #[inline]
    pub fn set_tag(&mut self, tag: BlockTag) {
        self.tag = tag as u8;
    }

    #[inline]
    pub fn next(&self) -> Option<BlockId> {
        BlockId::new(self.next).non_null()
    }

    #[inline]
    pub fn set_next(&mut self, next: Option<BlockId>) {
        self.next = next.unwrap_or(BlockId::NULL).into();
    }

    /// 整块清零后标记为空闲
    pub fn release(&mut self) {
        self.next = 0;
        self.payload.fill(0);
        self.set_tag(BlockTag::Free);
    }
}
