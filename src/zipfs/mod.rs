//! Read-only file system over zip/jar archives.
//!
//! Paths look like `zip:<archive>!<entry>`. The archive is only ever read
//! front to back, so:
//!
//! - [`locator`] answers every query with a fresh scan of the archive
//! - [`path`] parses path strings and rejects every mutation
//! - [`handle`] turns the forward-only entry stream into a seekable reader
//!
//! Directories are never stored as such. A path is a directory when an
//! entry marks it (`dir/`) or when some entry name lies below it.

pub mod handle;
pub mod locator;
pub mod path;

pub use handle::ZipFileHandle;
pub use locator::ArchiveLocator;
pub use path::{CompositePath, ZipPath, ZipPathFactory};
