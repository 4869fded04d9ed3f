//! Seekable reads over a forward-only entry stream.
//!
//! The handle keeps the stream it was opened with and tracks two offsets:
//! where the caller wants to read (`pos`) and where the stream actually is
//! (`stream_pos`). Seeking only moves `pos`; the next read reconciles the
//! two:
//!
//! - forward: skip `pos - stream_pos` bytes of the entry
//! - backward: drop the stream, rescan the archive from the start to the
//!   entry, then skip forward
//!
//! Forward seeks cost at most the skipped bytes, backward seeks cost a
//! full rescan up to the entry. Callers that can order their reads should
//! read front to back.

use std::io::{self, Read, Seek, SeekFrom};

use super::locator::{ArchiveLocator, EntryStream};
use super::path::CompositePath;
use crate::error::{Error, Result};
use crate::fs::FileHandle;

/// Read cursor over one archive entry.
pub struct ZipFileHandle {
    locator: ArchiveLocator,
    path: CompositePath,
    stream: Option<EntryStream>,
    stream_pos: u64,
    pos: u64,
    len: u64,
    closed: bool,
}

impl ZipFileHandle {
    pub(crate) fn new(
        locator: ArchiveLocator,
        path: CompositePath,
        stream: EntryStream,
        len: u64,
    ) -> Self {
        Self {
            locator,
            path,
            stream: Some(stream),
            stream_pos: 0,
            pos: 0,
            len,
            closed: false,
        }
    }

    /// Entry size resolved when the handle was opened.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Set the offset of the next read. Takes effect lazily.
    pub fn seek_to(&mut self, pos: u64) {
        self.pos = pos;
    }

    pub fn close(&mut self) {
        self.stream = None;
        self.closed = true;
    }

    pub fn write(&mut self, _buf: &[u8]) -> Result<usize> {
        Err(Error::Unsupported("write"))
    }

    pub fn truncate(&mut self, _len: u64) -> Result<()> {
        Err(Error::Unsupported("truncate"))
    }

    /// Nothing is ever buffered for writing.
    pub fn sync(&mut self) -> Result<()> {
        Ok(())
    }

    /// Bring the stream to `pos`, reopening it if it is already past.
    ///
    /// A stream that failed part way is dropped, so the next attempt starts
    /// over from a fresh scan instead of reading on from an unknown offset.
    fn position_stream(&mut self) -> Result<()> {
        if self.closed {
            return Err(Error::Io(io::Error::other("file handle is closed")));
        }

        if self.stream.is_none() || self.pos < self.stream_pos {
            log::trace!(
                "rewinding {} from {} to {}: reopening archive",
                self.path,
                self.stream_pos,
                self.pos
            );
            self.stream = None;
            self.stream_pos = 0;
            self.stream = Some(self.locator.reopen(&self.path)?);
        }

        if self.pos > self.stream_pos {
            let wanted = self.pos - self.stream_pos;
            let skipped = self.stream_mut()?.skip(wanted);
            match skipped {
                // Stops short only at the end of the entry.
                Ok(skipped) => self.stream_pos += skipped,
                Err(e) => {
                    self.stream = None;
                    return Err(e.into());
                }
            }
        }
        Ok(())
    }

    fn stream_mut(&mut self) -> Result<&mut EntryStream> {
        self.stream
            .as_mut()
            .ok_or_else(|| Error::Io(io::Error::other("entry stream unavailable")))
    }
}

impl Read for ZipFileHandle {
    /// Fill `buf` from the current position; short only at the end of the entry.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.position_stream()?;
        let stream = self.stream_mut()?;
        let mut filled = 0;
        let mut failure = None;
        while filled < buf.len() {
            match stream.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }
        if let Some(e) = failure {
            log::debug!("read of {} failed at offset {}: {e}", self.path, self.pos);
            self.stream = None;
            return Err(e);
        }
        self.stream_pos += filled as u64;
        self.pos += filled as u64;
        Ok(filled)
    }
}

impl Seek for ZipFileHandle {
    fn seek(&mut self, target: SeekFrom) -> io::Result<u64> {
        let pos = match target {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::Current(delta) => self.pos.checked_add_signed(delta),
            SeekFrom::End(delta) => self.len.checked_add_signed(delta),
        };
        let pos = pos.ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            )
        })?;
        self.seek_to(pos);
        Ok(pos)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.pos)
    }
}

impl FileHandle for ZipFileHandle {
    fn len(&self) -> Result<u64> {
        Ok(self.len)
    }

    fn close(&mut self) -> Result<()> {
        ZipFileHandle::close(self);
        Ok(())
    }
}
