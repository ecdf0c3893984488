mod cli;

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use cli::{Cli, Command, ImageCommand};
use small_fs::{Geometry, SmallFileSystem};
use small_fs_fuse::{BlockFile, SmallOps, SystemClock, errno};

/// 模拟内核一次写入的最大字节数
const WRITE_CHUNK: usize = 4096;

fn main() -> io::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Format {
            blocks,
            master_blocks,
        } => format(&cli.image, blocks, master_blocks),
        Command::Image(command) => run(&mount(&cli.image)?, command),
    }
}

fn format(image: &Path, blocks: usize, master_blocks: usize) -> io::Result<()> {
    let geometry = Geometry {
        total_blocks: blocks,
        master_blocks,
    };
    geometry.validate().map_err(fs_error)?;

    let block_file = Arc::new(BlockFile::create(image, blocks)?);
    SmallFileSystem::format(block_file, geometry, Box::new(SystemClock), current_owner())
        .map_err(fs_error)?;
    println!(
        "image={image:?} blocks={blocks} files={} data_blocks={}",
        geometry.file_capacity(),
        geometry.data_blocks().len()
    );
    Ok(())
}

fn mount(image: &Path) -> io::Result<SmallOps> {
    let block_file = Arc::new(BlockFile::open(image)?);
    let fs = SmallFileSystem::mount(block_file, Box::new(SystemClock)).map_err(fs_error)?;
    Ok(SmallOps::new(fs))
}

fn run(ops: &SmallOps, command: ImageCommand) -> io::Result<()> {
    match command {
        ImageCommand::Ls => {
            for name in ops.readdir("/").map_err(os_error)? {
                if name == "." || name == ".." {
                    continue;
                }
                let attr = ops.getattr(&path(&name)).map_err(os_error)?;
                println!("{:o} {:>6} {name}", attr.mode, attr.size);
            }
        }
        ImageCommand::Put { source, name, mode } => {
            let name = match name {
                Some(name) => name,
                None => source
                    .file_name()
                    .and_then(|fname| fname.to_str())
                    .map(str::to_owned)
                    .ok_or_else(|| io::Error::other("source has no usable file name"))?,
            };
            let target = path(&name);
            let data = fs::read(&source)?;

            match ops.getattr(&target) {
                Ok(_) => ops.truncate(&target, 0).map_err(os_error)?,
                Err(libc::ENOENT) => {
                    let owner = current_owner();
                    ops.create(&target, mode, owner.uid, owner.gid)
                        .map_err(os_error)?;
                }
                Err(e) => return Err(os_error(e)),
            }

            // 第一块覆写，其余追加，和内核分块写入的方式一致
            let mut offset = 0;
            for chunk in data.chunks(WRITE_CHUNK) {
                offset += ops
                    .write(&target, chunk, offset as i64)
                    .map_err(os_error)? as usize;
            }
            log::info!("put {source:?} -> {target} ({offset} bytes)");
        }
        ImageCommand::Cat { name } => {
            let target = path(&name);
            let size = ops.getattr(&target).map_err(os_error)?.size;
            ops.open(&target, libc::O_RDONLY).map_err(os_error)?;
            let data = ops.read(&target, size, 0).map_err(os_error)?;
            io::stdout().write_all(&data)?;
        }
        ImageCommand::Rm { name } => ops.unlink(&path(&name)).map_err(os_error)?,
        ImageCommand::Stat { name } => {
            let attr = ops.getattr(&path(&name)).map_err(os_error)?;
            println!("{attr:#?}");
        }
        ImageCommand::Chmod { mode, name } => ops.chmod(&path(&name), mode).map_err(os_error)?,
        ImageCommand::Truncate { name, length } => {
            let length = i64::try_from(length).map_err(io::Error::other)?;
            ops.truncate(&path(&name), length).map_err(os_error)?
        }
        ImageCommand::Df => {
            let stat = ops.statfs("/");
            println!(
                "free data blocks: {} (statfs reports bsize={} blocks={} bavail={})",
                ops.free_blocks(),
                stat.block_size,
                stat.blocks,
                stat.blocks_available
            );
        }
    }

    Ok(())
}

fn path(name: &str) -> String {
    format!("/{name}")
}

fn current_owner() -> small_fs::Owner {
    // SAFETY: getuid/getgid 总是成功，没有副作用
    unsafe {
        small_fs::Owner {
            uid: libc::getuid(),
            gid: libc::getgid(),
        }
    }
}

fn os_error(code: libc::c_int) -> io::Error {
    io::Error::from_raw_os_error(code)
}

fn fs_error(error: small_fs::Error) -> io::Error {
    log::error!("{error}");
    os_error(errno(error))
}
