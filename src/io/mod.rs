mod disk;
mod local;

pub use disk::{DiskPath, DiskPathFactory, expand_home};
pub use local::LocalFileSource;

use std::io::{self, Read};

/// Trait for opening forward-only byte streams over archives
///
/// Every call must return an independent stream positioned at the first
/// byte of the archive; callers never seek within it.
pub trait StreamSource: Send + Sync {
    /// Open a fresh stream over the archive at `location`
    fn open(&self, location: &str) -> io::Result<Box<dyn Read + Send>>;
}
