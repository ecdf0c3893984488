use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// 目录表中没有这个名字
    NotFound,
    AlreadyExists,
    /// 目录表已满
    CapacityExceeded,
    /// 数据块区域凑不出所需的块数
    OutOfSpace,
    /// 数据块链表越界、成环或与文件大小不符
    CorruptChain,
    NameTooLong,
    InvalidName,
    IsADirectory,
    NotADirectory,
    /// 只支持从头覆写与在末尾追加
    UnsupportedOffset,
    /// 超级块的魔数不对
    NotFormatted,
    InvalidGeometry,
}

pub type Result<T> = core::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Error::NotFound => "no such file",
            Error::AlreadyExists => "file already exists",
            Error::CapacityExceeded => "directory table is full",
            Error::OutOfSpace => "no space left on disk",
            Error::CorruptChain => "corrupt data block chain",
            Error::NameTooLong => "file name too long",
            Error::InvalidName => "invalid file name",
            Error::IsADirectory => "is a directory",
            Error::NotADirectory => "not a directory",
            Error::UnsupportedOffset => "only writes at offset 0 or at end of file are supported",
            Error::NotFormatted => "device does not hold a small-fs image",
            Error::InvalidGeometry => "invalid disk geometry",
        };
        f.write_str(msg)
    }
}
