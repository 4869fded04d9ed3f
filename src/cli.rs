use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "zsfs")]
#[command(version)]
#[command(about = "Browse zip/jar archives as a read-only file system", long_about = None)]
#[command(after_help = "Examples:\n  \
  zsfs ls zip:app.jar                      list the archive root\n  \
  zsfs cat zip:app.jar!META-INF/MANIFEST.MF   print an entry\n  \
  zsfs read -o 4096 -n 512 zip:db.zip!test.db  read a window of an entry")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Quiet mode (no summary lines)
    #[arg(short = 'q', global = true, action = clap::ArgAction::Count)]
    pub quiet: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the direct children of a directory
    Ls {
        /// Path, e.g. zip:archive.zip!dir
        #[arg(value_name = "PATH")]
        path: String,

        /// Show type and size of every child
        #[arg(short = 'l')]
        long: bool,
    },

    /// Show whether a path exists, its type and size
    Stat {
        #[arg(value_name = "PATH")]
        path: String,
    },

    /// Write an entry to stdout
    Cat {
        #[arg(value_name = "PATH")]
        path: String,
    },

    /// Write part of an entry to stdout
    Read {
        #[arg(value_name = "PATH")]
        path: String,

        /// Offset of the first byte
        #[arg(short = 'o', long, default_value_t = 0)]
        offset: u64,

        /// Number of bytes (default: to the end)
        #[arg(short = 'n', long)]
        length: Option<u64>,
    },

    /// List a directory recursively
    Tree {
        #[arg(value_name = "PATH")]
        path: String,
    },
}

impl Cli {
    pub fn is_quiet(&self) -> bool {
        self.quiet > 0
    }
}
