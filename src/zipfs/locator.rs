//! Entry lookup by sequential scan.
//!
//! Every query opens a fresh stream over the archive and walks its entries
//! from the start. Nothing is cached between queries, so each answer
//! reflects the archive as it is on disk at the time of the call.

use std::io::{self, Read};
use std::sync::Arc;

use super::path::CompositePath;
use crate::error::{Error, Result};
use crate::io::StreamSource;
use crate::zip::ZipStreamReader;

/// Stream positioned inside one archive entry.
pub type EntryStream = ZipStreamReader<Box<dyn Read + Send>>;

/// Chunk size used when counting the bytes of an entry of unknown size.
const SKIP_CHUNK: u64 = 16 * 4096;

/// Answers existence, type, size and listing queries for archive paths.
#[derive(Clone)]
pub struct ArchiveLocator {
    source: Arc<dyn StreamSource>,
}

impl ArchiveLocator {
    pub fn new(source: Arc<dyn StreamSource>) -> Self {
        Self { source }
    }

    fn open_archive(&self, path: &CompositePath) -> io::Result<EntryStream> {
        let stream = self.source.open(&path.archive_location)?;
        Ok(ZipStreamReader::new(stream))
    }

    /// Whether an entry with exactly this name exists. The root always does.
    pub fn exists(&self, path: &CompositePath) -> bool {
        if path.is_root() {
            return true;
        }
        self.scan_exists(path).unwrap_or_else(|e| {
            log::debug!("exists({path}) failed, reporting absent: {e}");
            false
        })
    }

    fn scan_exists(&self, path: &CompositePath) -> io::Result<bool> {
        let mut zip = self.open_archive(path)?;
        while let Some(entry) = zip.next_entry()? {
            if entry.name == path.entry_path {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Whether the path denotes a directory, stored or implied.
    ///
    /// An exact name match answers with its own directory flag and a
    /// `path/` marker makes it a directory; both end the scan. An entry
    /// living below `path/` only implies a directory, so the scan goes on in
    /// case the exact name turns up later.
    pub fn is_directory(&self, path: &CompositePath) -> bool {
        if path.is_root() {
            return true;
        }
        self.scan_is_directory(path).unwrap_or_else(|e| {
            log::debug!("is_directory({path}) failed, reporting false: {e}");
            false
        })
    }

    fn scan_is_directory(&self, path: &CompositePath) -> io::Result<bool> {
        let dir = path.directory_prefix();
        let mut implied = false;
        let mut zip = self.open_archive(path)?;
        while let Some(entry) = zip.next_entry()? {
            if entry.name == path.entry_path {
                return Ok(entry.is_directory);
            }
            if entry.name == dir {
                return Ok(true);
            }
            implied |= entry.name.starts_with(&dir);
        }
        Ok(implied)
    }

    /// Uncompressed size of the entry, 0 if absent or unreadable.
    pub fn size(&self, path: &CompositePath) -> u64 {
        if path.is_root() {
            return 0;
        }
        self.scan_size(path).unwrap_or_else(|e| {
            log::debug!("size({path}) failed, reporting 0: {e}");
            0
        })
    }

    fn scan_size(&self, path: &CompositePath) -> io::Result<u64> {
        let mut zip = self.open_archive(path)?;
        while let Some(entry) = zip.next_entry()? {
            if entry.name == path.entry_path {
                return match entry.size {
                    Some(size) => Ok(size),
                    None => count_remaining(&mut zip),
                };
            }
        }
        Ok(0)
    }

    /// Names of the entries one level below `path`.
    ///
    /// Only entries stored in the archive are returned; a subdirectory
    /// shows up when the archive holds a marker entry for it (`dir/`) or a
    /// file directly below. Read errors are propagated.
    pub fn list(&self, path: &CompositePath) -> io::Result<Vec<String>> {
        let dir = path.directory_prefix();
        let mut zip = self.open_archive(path)?;
        let mut children = Vec::new();
        while let Some(entry) = zip.next_entry()? {
            if is_direct_child(&dir, &entry.name) {
                children.push(entry.name);
            }
        }
        log::trace!("list({path}) found {} children", children.len());
        Ok(children)
    }

    /// Modification time of the entry in milliseconds since the Unix epoch,
    /// 0 if absent, unreadable or not a valid DOS date.
    pub fn last_modified(&self, path: &CompositePath) -> u64 {
        if path.is_root() {
            return 0;
        }
        self.scan_last_modified(path).unwrap_or_else(|e| {
            log::debug!("last_modified({path}) failed, reporting 0: {e}");
            0
        })
    }

    fn scan_last_modified(&self, path: &CompositePath) -> io::Result<u64> {
        let mut zip = self.open_archive(path)?;
        while let Some(entry) = zip.next_entry()? {
            if entry.name == path.entry_path {
                return Ok(entry.modified_millis());
            }
        }
        Ok(0)
    }

    /// Open a stream positioned at the start of the entry's content.
    ///
    /// Returns the stream together with the entry's total size. When the
    /// header does not record the size, a second scan counts it.
    pub fn open(&self, path: &CompositePath) -> Result<(EntryStream, u64)> {
        let (zip, size) = self.find_entry(path)?;
        let size = match size {
            Some(size) => size,
            None => self.scan_size(path)?,
        };
        Ok((zip, size))
    }

    /// Like [`open`](Self::open), for callers that already know the size.
    pub fn reopen(&self, path: &CompositePath) -> Result<EntryStream> {
        let (zip, _) = self.find_entry(path)?;
        Ok(zip)
    }

    fn find_entry(&self, path: &CompositePath) -> Result<(EntryStream, Option<u64>)> {
        if path.is_root() {
            return Err(Error::NotFound(path.to_string()));
        }
        let mut zip = self.open_archive(path)?;
        while let Some(entry) = zip.next_entry()? {
            if entry.name == path.entry_path {
                return Ok((zip, entry.size));
            }
        }
        Err(Error::NotFound(path.to_string()))
    }
}

/// Skip through the rest of the current entry, counting its bytes.
fn count_remaining<R: Read>(zip: &mut ZipStreamReader<R>) -> io::Result<u64> {
    let mut total = 0;
    loop {
        let skipped = zip.skip(SKIP_CHUNK)?;
        if skipped == 0 {
            return Ok(total);
        }
        total += skipped;
    }
}

/// `name` sits directly below `dir` (itself empty or ending in `/`).
///
/// Deeper descendants are excluded, except that a directory marker one
/// level down (`dir/sub/`) counts as a child.
fn is_direct_child(dir: &str, name: &str) -> bool {
    match name.strip_prefix(dir) {
        Some(rest) if !rest.is_empty() => match rest.find('/') {
            None => true,
            Some(idx) => idx == rest.len() - 1,
        },
        _ => false,
    }
}
