//! # zipstream-vfs
//!
//! A read-only virtual file system over zip/jar archives that are read as a
//! forward-only stream.
//!
//! Archive entries are addressed with composite paths of the form
//! `zip:<archive-location>!<entry-path>` and behave like ordinary files and
//! directories. The archive is never indexed: each query streams through it
//! from the first local header, which keeps every answer consistent with the
//! archive on disk at the cost of re-reading it.
//!
//! ## Features
//!
//! - Existence, directory, size and listing queries on archive paths
//! - Directories implied by entry names, even without directory entries
//! - Seekable file handles over STORED and DEFLATE entries
//! - Entries written by streaming writers (sizes in data descriptors)
//! - ZIP64 sizes, CRC-32 verification and DOS modification times
//! - Scheme registry dispatching `zip:` paths and plain disk paths
//!
//! ## Example
//!
//! ```no_run
//! use std::io::{Read, Seek, SeekFrom};
//! use zipstream_vfs::Registry;
//!
//! fn main() -> zipstream_vfs::Result<()> {
//!     let registry = Registry::with_defaults();
//!
//!     // List the top level of the archive
//!     for child in registry.path("zip:~/data/app.jar").list()? {
//!         println!("{}", child.name());
//!     }
//!
//!     // Read part of an entry
//!     let mut file = registry.path("zip:~/data/app.jar!META-INF/MANIFEST.MF").open_read()?;
//!     file.seek(SeekFrom::Start(10))?;
//!     let mut buf = [0u8; 16];
//!     let n = file.read(&mut buf)?;
//!     println!("{:?}", &buf[..n]);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod fs;
pub mod io;
pub mod zip;
pub mod zipfs;

pub use cli::Cli;
pub use error::{Error, Result};
pub use fs::{FileHandle, FilePath, PathFactory, Registry};
pub use io::{DiskPath, LocalFileSource, StreamSource};
pub use zip::{ZipEntry, ZipStreamReader};
pub use zipfs::{ArchiveLocator, CompositePath, ZipFileHandle, ZipPath, ZipPathFactory};
