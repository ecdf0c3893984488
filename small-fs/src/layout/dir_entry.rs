use crate::NAME_MAX_LEN;
use crate::layout::{BlockId, FileAttr};

/// 目录表槽位：文件元信息与数据块链表的头指针
#[derive(Debug, Default, Clone)]
#[repr(C)]
pub struct DirEntry {
    /// 0 表示空槽位
    head_block: u8,
    /// 尾部补零，名字本身不含 \0
    name: [u8; NAME_MAX_LEN],
    _pad: [u8; 3],
    pub attr: FileAttr,
}

impl DirEntry {
    /// `name`须已校验过长度
    pub fn new(name: &[u8], head_block: BlockId, attr: FileAttr) -> Self {
        let mut buf = [0; NAME_MAX_LEN];
        buf[..name.len()].copy_from_slice(name);

        Self {
            head_block: head_block.into(),
            name: buf,
            _pad: [0; 3],
            attr,
        }
    }

    /// 去掉尾部补零后的名字
    pub fn name(&self) -> &[u8] {
        let len = self.name.iter().rposition(|&c| c != 0).map_or(0, |i| i + 1);
        &self.name[..len]
    }

    #[inline]
    pub fn matches(&self, name: &[u8]) -> bool {
        self.name() == name
    }

    #[inline]
    pub fn head_block(&self) -> Option<BlockId> {
        BlockId::new(self.head_block).non_null()
    }
}
