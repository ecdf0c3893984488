use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
pub struct Cli {
    /// Disk image file
    #[arg(long, short, default_value = "fs.img")]
    pub image: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a fresh image
    Format {
        /// Total number of blocks
        #[arg(long, short, default_value_t = 16)]
        blocks: usize,

        /// Superblock plus directory table blocks
        #[arg(long, short, default_value_t = 5)]
        master_blocks: usize,
    },

    #[command(flatten)]
    Image(ImageCommand),
}

/// 需要先挂载镜像的命令
#[derive(Subcommand)]
pub enum ImageCommand {
    /// List files
    Ls,

    /// Copy a host file into the image
    Put {
        source: PathBuf,

        /// Name inside the image, defaults to the source file name
        name: Option<String>,

        /// Permission bits, in octal
        #[arg(long, short, default_value = "644", value_parser = parse_mode)]
        mode: u32,
    },

    /// Print a file to stdout
    Cat { name: String },

    /// Remove a file
    Rm { name: String },

    /// Show file attributes
    Stat { name: String },

    /// Change permission bits
    Chmod {
        #[arg(value_parser = parse_mode)]
        mode: u32,
        name: String,
    },

    /// Cut or zero-extend a file
    Truncate { name: String, length: u64 },

    /// Show block usage
    Df,
}

fn parse_mode(s: &str) -> Result<u32, String> {
    u32::from_str_radix(s, 8).map_err(|e| format!("`{s}` isn't an octal mode: {e}"))
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn format_stands_apart_from_image_commands() {
        let cli = Cli::try_parse_from(["small-fs-tool", "format", "--blocks", "32"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Format {
                blocks: 32,
                master_blocks: 5
            }
        ));

        let cli =
            Cli::try_parse_from(["small-fs-tool", "-i", "a.img", "chmod", "600", "f"]).unwrap();
        assert_eq!(PathBuf::from("a.img"), cli.image);
        assert!(matches!(
            cli.command,
            Command::Image(ImageCommand::Chmod { mode: 0o600, .. })
        ));

        assert!(Cli::try_parse_from(["small-fs-tool", "chmod", "9", "f"]).is_err());
    }
}
