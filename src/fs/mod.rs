//! Path abstraction shared by every file system provider.
//!
//! A [`FilePath`] is a parsed path string bound to the provider that
//! understands it. Providers are looked up by scheme through a
//! [`Registry`], so callers can mix archive paths and disk paths without
//! knowing which one they hold.

mod registry;

pub use registry::Registry;

use std::fmt;
use std::io::{Read, Seek, Write};

use crate::error::Result;

/// An open file with a known length, readable and seekable.
pub trait FileHandle: Read + Seek + Send {
    /// Total length of the file in bytes.
    fn len(&self) -> Result<u64>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Release the underlying resources. Closing twice is a no-op.
    fn close(&mut self) -> Result<()>;
}

/// A path within some file system.
///
/// Query methods (`exists`, `is_directory`, `size`) never fail; when the
/// answer cannot be determined they report absence.
pub trait FilePath: fmt::Debug + Send + Sync {
    /// The path string this value was built from.
    fn name(&self) -> &str;

    /// Scheme of the provider that owns this path.
    fn scheme(&self) -> &'static str;

    /// Plain prefix test on the path string. No normalization is applied,
    /// so `zip:a.zip!dir` does not start with `zip:a.zip!dir/`.
    fn starts_with(&self, prefix: &str) -> bool {
        self.name().starts_with(prefix)
    }

    fn exists(&self) -> bool;

    fn is_directory(&self) -> bool;

    /// Size in bytes, 0 when unknown or absent.
    fn size(&self) -> u64;

    /// Modification time in milliseconds since the Unix epoch, 0 when
    /// unknown or absent.
    fn last_modified(&self) -> u64;

    fn can_write(&self) -> bool;

    /// Direct children of this directory.
    fn list(&self) -> Result<Vec<Box<dyn FilePath>>>;

    fn parent(&self) -> Option<Box<dyn FilePath>>;

    fn is_absolute(&self) -> bool;

    fn canonical(&self) -> Result<Box<dyn FilePath>>;

    /// Create an empty file; `Ok(false)` if it already exists.
    fn create_file(&self) -> Result<bool>;

    fn create_directory(&self) -> Result<()>;

    fn delete(&self) -> Result<()>;

    fn move_to(&self, target: &str) -> Result<()>;

    fn set_writable(&self, writable: bool) -> Result<()>;

    fn open_read(&self) -> Result<Box<dyn FileHandle>>;

    fn open_write(&self, append: bool) -> Result<Box<dyn Write + Send>>;

    /// Create a new empty temporary file named after this path.
    ///
    /// With `in_temp_dir` the file goes to the system temp directory,
    /// otherwise next to this path.
    fn create_temp_file(&self, suffix: &str, in_temp_dir: bool) -> Result<Box<dyn FilePath>>;
}

/// Builds paths for one scheme.
pub trait PathFactory: Send + Sync {
    fn scheme(&self) -> &'static str;

    fn path(&self, raw: &str) -> Box<dyn FilePath>;
}
