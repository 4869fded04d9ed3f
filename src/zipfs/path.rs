//! Archive path strings and the read-only path operations built on them.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use super::handle::ZipFileHandle;
use super::locator::ArchiveLocator;
use crate::error::{Error, Result};
use crate::fs::{FileHandle, FilePath, PathFactory};
use crate::io::{DiskPath, StreamSource};

/// Scheme tag of archive paths
pub const SCHEME: &str = "zip";

/// Separates the archive location from the path inside the archive
pub const ENTRY_SEPARATOR: char = '!';

/// A path string split into the archive to open and the entry inside it.
///
/// `entry_path` uses `/` separators only and never starts with one; the
/// empty string is the archive root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositePath {
    pub archive_location: String,
    pub entry_path: String,
}

impl CompositePath {
    pub fn parse(raw: &str) -> Self {
        let (location, entry) = match raw.find(ENTRY_SEPARATOR) {
            Some(idx) if idx > 0 => (&raw[..idx], &raw[idx + 1..]),
            Some(idx) => (&raw[..idx], ""),
            None => (raw, ""),
        };

        let location = location
            .strip_prefix(SCHEME)
            .and_then(|rest| rest.strip_prefix(':'))
            .unwrap_or(location);

        let entry = entry.replace('\\', "/");
        let entry = if entry.starts_with('/') {
            entry[1..].to_owned()
        } else {
            entry
        };

        Self {
            archive_location: location.to_owned(),
            entry_path: entry,
        }
    }

    pub fn is_root(&self) -> bool {
        self.entry_path.is_empty()
    }

    /// The entry path as a directory name: empty for the root, otherwise
    /// ending in exactly one `/`.
    pub fn directory_prefix(&self) -> String {
        if self.is_root() || self.entry_path.ends_with('/') {
            self.entry_path.clone()
        } else {
            format!("{}/", self.entry_path)
        }
    }
}

impl fmt::Display for CompositePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.archive_location, ENTRY_SEPARATOR, self.entry_path)
    }
}

/// A path into a zip/jar archive, such as `zip:~/data/db.zip!dir/file`.
///
/// Every query scans the archive again; the value itself holds nothing
/// but the path string.
#[derive(Clone)]
pub struct ZipPath {
    name: String,
    locator: ArchiveLocator,
}

impl ZipPath {
    pub fn new(name: impl Into<String>, locator: ArchiveLocator) -> Self {
        Self {
            name: name.into(),
            locator,
        }
    }

    pub fn composite(&self) -> CompositePath {
        CompositePath::parse(&self.name)
    }

    fn sibling(&self, name: String) -> Self {
        Self::new(name, self.locator.clone())
    }

    /// Children of this directory, in archive order.
    pub fn children(&self) -> Result<Vec<ZipPath>> {
        let archive = match self.name.find(ENTRY_SEPARATOR) {
            Some(idx) => &self.name[..idx],
            None => self.name.as_str(),
        };
        let names = self.locator.list(&self.composite())?;
        Ok(names
            .into_iter()
            .map(|entry| self.sibling(format!("{archive}{ENTRY_SEPARATOR}{entry}")))
            .collect())
    }

    /// The path with its last `/` segment removed.
    ///
    /// A bare archive location has no parent: the archive is the topmost
    /// node reachable through this scheme.
    pub fn parent_path(&self) -> Option<ZipPath> {
        self.name
            .rfind('/')
            .map(|idx| self.sibling(self.name[..idx].to_owned()))
    }

    /// Open the entry for reading.
    pub fn open(&self) -> Result<ZipFileHandle> {
        let path = self.composite();
        let (stream, len) = self.locator.open(&path)?;
        Ok(ZipFileHandle::new(self.locator.clone(), path, stream, len))
    }
}

impl fmt::Debug for ZipPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ZipPath").field(&self.name).finish()
    }
}

impl FilePath for ZipPath {
    fn name(&self) -> &str {
        &self.name
    }

    fn scheme(&self) -> &'static str {
        SCHEME
    }

    fn exists(&self) -> bool {
        self.locator.exists(&self.composite())
    }

    fn is_directory(&self) -> bool {
        self.locator.is_directory(&self.composite())
    }

    fn size(&self) -> u64 {
        self.locator.size(&self.composite())
    }

    fn last_modified(&self) -> u64 {
        self.locator.last_modified(&self.composite())
    }

    fn can_write(&self) -> bool {
        false
    }

    fn list(&self) -> Result<Vec<Box<dyn FilePath>>> {
        Ok(self
            .children()?
            .into_iter()
            .map(|p| Box::new(p) as Box<dyn FilePath>)
            .collect())
    }

    fn parent(&self) -> Option<Box<dyn FilePath>> {
        self.parent_path().map(|p| Box::new(p) as Box<dyn FilePath>)
    }

    fn is_absolute(&self) -> bool {
        true
    }

    fn canonical(&self) -> Result<Box<dyn FilePath>> {
        Ok(Box::new(self.clone()))
    }

    fn create_file(&self) -> Result<bool> {
        Err(Error::Unsupported("create file"))
    }

    // Directories only exist as implied by entry names.
    fn create_directory(&self) -> Result<()> {
        Ok(())
    }

    fn delete(&self) -> Result<()> {
        Err(Error::Unsupported("delete"))
    }

    fn move_to(&self, _target: &str) -> Result<()> {
        Err(Error::Unsupported("move"))
    }

    fn set_writable(&self, writable: bool) -> Result<()> {
        if writable {
            Err(Error::Unsupported("make writable"))
        } else {
            Ok(())
        }
    }

    fn open_read(&self) -> Result<Box<dyn FileHandle>> {
        Ok(Box::new(self.open()?))
    }

    fn open_write(&self, _append: bool) -> Result<Box<dyn Write + Send>> {
        Err(Error::Unsupported("write"))
    }

    fn create_temp_file(&self, suffix: &str, in_temp_dir: bool) -> Result<Box<dyn FilePath>> {
        if !in_temp_dir {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::ReadOnlyFilesystem,
                "file system is read-only",
            )));
        }
        let base = self
            .name
            .rsplit(['/', '\\', ENTRY_SEPARATOR, ':'])
            .next()
            .unwrap_or_default();
        DiskPath::new(base).create_temp_file(suffix, true)
    }
}

/// Builds [`ZipPath`]s over archives opened through one stream source.
pub struct ZipPathFactory {
    locator: ArchiveLocator,
}

impl ZipPathFactory {
    pub fn new(source: Arc<dyn StreamSource>) -> Self {
        Self {
            locator: ArchiveLocator::new(source),
        }
    }
}

impl PathFactory for ZipPathFactory {
    fn scheme(&self) -> &'static str {
        SCHEME
    }

    fn path(&self, raw: &str) -> Box<dyn FilePath> {
        Box::new(ZipPath::new(raw, self.locator.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> (String, String) {
        let p = CompositePath::parse(raw);
        (p.archive_location, p.entry_path)
    }

    #[test]
    fn splits_on_first_separator() {
        assert_eq!(
            parse("zip:/data/test.zip!dir/file.txt"),
            ("/data/test.zip".into(), "dir/file.txt".into())
        );
        assert_eq!(
            parse("zip:/data/test.zip!a!b"),
            ("/data/test.zip".into(), "a!b".into())
        );
    }

    #[test]
    fn missing_or_leading_separator_means_root() {
        assert_eq!(parse("zip:/data/test.zip"), ("/data/test.zip".into(), "".into()));
        assert_eq!(parse("!dir/file"), ("".into(), "".into()));
        assert!(CompositePath::parse("zip:~/t.zip!").is_root());
    }

    #[test]
    fn normalizes_entry_separators() {
        assert_eq!(
            parse("zip:C:\\data\\test.zip!\\dir\\file.txt"),
            ("C:\\data\\test.zip".into(), "dir/file.txt".into())
        );
        assert_eq!(parse("zip:t.zip!/a/b").1, "a/b");
    }

    #[test]
    fn directory_prefix() {
        assert_eq!(CompositePath::parse("zip:t.zip").directory_prefix(), "");
        assert_eq!(CompositePath::parse("zip:t.zip!a").directory_prefix(), "a/");
        assert_eq!(CompositePath::parse("zip:t.zip!a/").directory_prefix(), "a/");
    }
}
