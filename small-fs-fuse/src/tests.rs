use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use std::{env, fs, process};

use small_fs::{Clock, Error, Geometry, Owner, SmallFileSystem};

use crate::{BlockFile, SmallOps, SystemClock, epoch_secs, errno};

struct Image(PathBuf);

impl Image {
    fn new(name: &str) -> Self {
        Self(env::temp_dir().join(format!("small-fs-{}-{name}.img", process::id())))
    }
}

impl Drop for Image {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.0);
    }
}

fn mkfs(image: &Image) -> SmallOps {
    let geometry = Geometry::default();
    let block_file = Arc::new(BlockFile::create(&image.0, geometry.total_blocks).unwrap());
    let fs = SmallFileSystem::format(
        block_file,
        geometry,
        Box::new(SystemClock),
        Owner { uid: 1, gid: 2 },
    )
    .unwrap();
    SmallOps::new(fs)
}

fn remount(image: &Image) -> SmallOps {
    let block_file = Arc::new(BlockFile::open(&image.0).unwrap());
    SmallOps::new(SmallFileSystem::mount(block_file, Box::new(SystemClock)).unwrap())
}

#[test]
fn image_has_disk_size() {
    let image = Image::new("size");
    drop(mkfs(&image));
    assert_eq!(16 * 64, fs::metadata(&image.0).unwrap().len());
}

#[test]
fn survives_remount() {
    let image = Image::new("remount");
    let ops = mkfs(&image);
    ops.create("/a", 0o100644, 1000, 1000).unwrap();
    assert_eq!(Ok(5), ops.write("/a", b"hello", 0));
    assert_eq!(Ok(6), ops.write("/a", b" world", 5));
    drop(ops);

    let ops = remount(&image);
    assert_eq!(Ok(b"hello world".to_vec()), ops.read("/a", 4096, 0));
    let attr = ops.getattr("/a").unwrap();
    assert_eq!(0o100644, attr.mode);
    assert_eq!((1000, 1000), (attr.uid, attr.gid));
    assert_eq!(Ok(vec![".".to_owned(), "..".to_owned(), "a".to_owned()]), ops.readdir("/"));
}

#[test]
fn errors_become_errno() {
    let image = Image::new("errno");
    let ops = mkfs(&image);

    assert_eq!(Err(libc::ENOENT), ops.getattr("/missing"));
    assert_eq!(Err(libc::ENOENT), ops.unlink("/missing"));
    assert_eq!(Err(libc::ENAMETOOLONG), ops.create("/abcdefghijklmnopq", 0o644, 0, 0));
    assert_eq!(Err(libc::EISDIR), ops.read("/", 10, 0));
    assert_eq!(Err(libc::EINVAL), ops.read("/", 10, -1));

    for name in ["/a", "/b", "/c", "/d"] {
        ops.create(name, 0o644, 0, 0).unwrap();
    }
    assert_eq!(Err(libc::EEXIST), ops.create("/a", 0o644, 0, 0));
    assert_eq!(Err(libc::ENOSPC), ops.create("/e", 0o644, 0, 0));
    assert_eq!(Err(libc::EINVAL), ops.write("/a", b"x", 3));
    assert_eq!(Err(libc::ENOSPC), ops.write("/a", &[1; 64 * 16], 0));
    assert_eq!(Err(libc::ENOTDIR), ops.readdir("/a"));
}

#[test]
fn errno_table() {
    assert_eq!(libc::ENOENT, errno(Error::NotFound));
    assert_eq!(libc::ENOSPC, errno(Error::CapacityExceeded));
    assert_eq!(libc::ENOSPC, errno(Error::OutOfSpace));
    assert_eq!(libc::EIO, errno(Error::CorruptChain));
    assert_eq!(libc::EINVAL, errno(Error::UnsupportedOffset));
}

#[test]
fn metadata_callbacks() {
    let image = Image::new("meta");
    let ops = mkfs(&image);
    ops.create("/f", 0o644, 0, 0).unwrap();

    ops.chmod("/f", 0o100600).unwrap();
    assert_eq!(0o100600, ops.getattr("/f").unwrap().mode);

    ops.chown("/f", 7, 8).unwrap();
    let attr = ops.getattr("/f").unwrap();
    assert_eq!((7, 8), (attr.uid, attr.gid));

    ops.utimens("/f", Some((100, 200))).unwrap();
    let attr = ops.getattr("/f").unwrap();
    assert_eq!((100, 200), (attr.atime, attr.mtime));

    ops.utimens("/f", None).unwrap();
    assert!(ops.getattr("/f").unwrap().mtime >= SystemClock.now() - 5);

    ops.write("/f", b"0123456789", 0).unwrap();
    ops.truncate("/f", 4).unwrap();
    assert_eq!(Ok(b"0123".to_vec()), ops.read("/f", 100, 0));
    assert_eq!(Err(libc::EINVAL), ops.truncate("/f", -1));
}

#[test]
fn handles_and_stubs() {
    let image = Image::new("stubs");
    let ops = mkfs(&image);

    let created = ops.create("/f", 0o644, 0, 0).unwrap();
    let opened = ops.open("/f", libc::O_RDONLY).unwrap();
    assert_eq!(created + 1, opened);
    assert_eq!(Err(libc::ENOENT), ops.open("/g", libc::O_RDONLY));

    assert_eq!(Ok(Vec::new()), ops.getxattr("/f", "user.test"));
    assert_eq!(Ok(Vec::new()), ops.listxattr("/f"));
    assert_eq!(Ok(()), ops.setxattr("/f", "user.test", b"v"));
    assert_eq!(Ok(()), ops.removexattr("/f", "user.test"));
    assert_eq!(Err(libc::EINVAL), ops.readlink("/f"));
    assert_eq!(Err(libc::ENOENT), ops.readlink("/g"));

    let before = ops.statfs("/");
    ops.write("/f", &[9; 300], 0).unwrap();
    assert_eq!(before, ops.statfs("/"));
    assert_eq!((512, 4096, 2048), (before.block_size, before.blocks, before.blocks_available));
    assert_eq!(11 - 5, ops.free_blocks());
}

#[test]
fn clock_saturates_at_u32() {
    assert_eq!(1_700_000_000, epoch_secs(Duration::from_secs(1_700_000_000)));
    assert_eq!(u32::MAX, epoch_secs(Duration::from_secs(u64::from(u32::MAX) + 1)));
    assert_eq!(u32::MAX, epoch_secs(Duration::MAX));
}
