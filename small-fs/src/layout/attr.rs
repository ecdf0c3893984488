use enumflags2::{BitFlags, bitflags};

/// 文件类型位的掩码
pub const S_IFMT: u16 = 0o170000;
/// 权限位的掩码
pub const PERM_MASK: u16 = 0o7777;

#[bitflags]
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Directory = 0o040000,
    Regular = 0o100000,
}

/// 文件的属主
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Owner {
    pub uid: u32,
    pub gid: u32,
}

/// 属性记录，超级块与目录项共用；所有汇报、修改元数据的路径都只经过它
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct FileAttr {
    /// 类型位 | 权限位
    pub mode: u16,
    /// 硬链接个数
    pub nlink: u16,
    /// 文件字节数
    pub size: u32,
    /// 时间戳，单位为秒
    pub ctime: u32,
    pub atime: u32,
    pub mtime: u32,
    pub uid: u32,
    pub gid: u32,
}

impl FileAttr {
    pub fn new(kind: FileKind, perm: u16, nlink: u16, now: u32, owner: Owner) -> Self {
        Self {
            mode: kind as u16 | (perm & PERM_MASK),
            nlink,
            size: 0,
            ctime: now,
            atime: now,
            mtime: now,
            uid: owner.uid,
            gid: owner.gid,
        }
    }

    /// 类型位不是恰好一种已知类型时返回空
    pub fn kind(&self) -> Option<FileKind> {
        BitFlags::<FileKind>::from_bits(self.mode & S_IFMT)
            .ok()?
            .exactly_one()
    }

    #[inline]
    pub fn permissions(&self) -> u16 {
        self.mode & PERM_MASK
    }

    /// 只替换权限位，保留类型位
    #[inline]
    pub fn set_permissions(&mut self, perm: u16) {
        self.mode = (self.mode & !PERM_MASK) | (perm & PERM_MASK);
    }

    #[inline]
    pub fn owner(&self) -> Owner {
        Owner {
            uid: self.uid,
            gid: self.gid,
        }
    }
}
