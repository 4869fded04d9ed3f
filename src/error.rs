//! Error types for the archive file system.

use thiserror::Error;

/// Errors that can occur when working with archive paths and handles.
#[derive(Debug, Error)]
pub enum Error {
    /// The path names no readable entry (including the archive root).
    #[error("entry not found: {0}")]
    NotFound(String),

    /// The operation would modify a read-only file system.
    #[error("unsupported operation on read-only file system: {0}")]
    Unsupported(&'static str),

    /// The archive could not be read, or its contents are malformed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for archive file system operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(e) => e,
            Error::NotFound(_) => std::io::Error::new(std::io::ErrorKind::NotFound, err),
            Error::Unsupported(_) => std::io::Error::new(std::io::ErrorKind::Unsupported, err),
        }
    }
}
