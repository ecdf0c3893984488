use crate::MAGIC;
use crate::layout::FileAttr;

/// 超级块：
/// - 提供文件系统合法性校验；
/// - 记录磁盘几何、文件数与句柄计数器；
/// - 存放根目录的属性
#[derive(Debug)]
#[repr(C)]
pub struct SuperBlock {
    /// 魔数：用于校验文件系统合法性
    magic: u32,
    /// 文件系统占据块数
    pub total_blocks: u16,
    /// 现存文件数，也是最后一个被占用的目录槽位
    pub file_count: u8,
    /// 单调递增的句柄计数器
    pub next_handle: u8,
    /// 超级块加目录表占据的块数
    pub master_blocks: u8,
    _pad: [u8; 3],
    pub root: FileAttr,
}

impl SuperBlock {
    #[inline]
    pub fn init(&mut self, total_blocks: u16, master_blocks: u8, root: FileAttr) {
        *self = Self {
            magic: MAGIC,
            total_blocks,
            file_count: 0,
            next_handle: 0,
            master_blocks,
            _pad: [0; 3],
            root,
        };
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.magic == MAGIC
    }

    /// 计数器加一并返回新值，溢出时回绕
    #[inline]
    pub fn bump_handle(&mut self) -> u8 {
        self.next_handle = self.next_handle.wrapping_add(1);
        self.next_handle
    }
}
