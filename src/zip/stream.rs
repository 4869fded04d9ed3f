//! Forward-only ZIP stream reader.
//!
//! Unlike a central-directory parser, this reader never seeks. It walks the
//! archive front to back, parsing one Local File Header at a time and
//! exposing the entry's uncompressed bytes through [`Read`]:
//!
//! 1. Read the Local File Header, file name and extra field
//! 2. Decode the entry data (STORED bytes, or a raw DEFLATE stream)
//! 3. Read the trailing data descriptor if the header deferred CRC and sizes
//! 4. Verify CRC-32 and uncompressed size, then continue with the next header
//!
//! The sequence ends at the first record that is not a Local File Header
//! (normally the Central Directory) or at a clean end of input.

use flate2::{Crc, Decompress, FlushDecompress, Status};
use std::io::{self, BufRead, BufReader, Read};

use super::structures::*;

/// Read buffer used over the raw archive stream.
const BUFFER_SIZE: usize = 64 * 1024;

/// Sequential reader over the entries of a ZIP archive.
pub struct ZipStreamReader<R: Read> {
    inner: BufReader<R>,
    entry: Option<EntryState>,
    exhausted: bool,
}

/// Decoding state of the entry the reader is positioned in.
struct EntryState {
    name: String,
    decoder: Decoder,
    trailer: Trailer,
    crc: Crc,
    produced: u64,
    finished: bool,
}

enum Decoder {
    Stored { remaining: u64 },
    Deflate(Box<Decompress>),
}

/// Where the expected CRC and size of an entry come from.
enum Trailer {
    Header { crc32: u32, size: u64 },
    Descriptor { zip64: bool },
}

impl<R: Read> ZipStreamReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            inner: BufReader::with_capacity(BUFFER_SIZE, reader),
            entry: None,
            exhausted: false,
        }
    }

    /// Advance to the next entry, draining whatever is left of the current one.
    ///
    /// Returns `Ok(None)` once the local headers are exhausted.
    pub fn next_entry(&mut self) -> io::Result<Option<ZipEntry>> {
        self.close_entry()?;
        if self.exhausted {
            return Ok(None);
        }

        let mut fixed = [0u8; LocalFileHeader::SIZE];
        match self.inner.read_exact(&mut fixed) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                self.exhausted = true;
                return Ok(None);
            }
            Err(e) => return Err(e),
        }
        if &fixed[0..4] != LocalFileHeader::SIGNATURE {
            self.exhausted = true;
            return Ok(None);
        }

        let header = LocalFileHeader::from_bytes(&fixed)?;

        let mut name_bytes = vec![0u8; header.file_name_length as usize];
        self.inner.read_exact(&mut name_bytes)?;
        // Use lossy conversion to handle non-UTF8 filenames gracefully
        let name = String::from_utf8_lossy(&name_bytes).to_string();

        let mut extra = vec![0u8; header.extra_field_length as usize];
        self.inner.read_exact(&mut extra)?;
        let zip64 = parse_zip64_extra(&extra, &header)?;

        if header.is_encrypted() {
            return Err(invalid_data(format!("encrypted entry not supported: {name}")));
        }

        let method = CompressionMethod::from_u16(header.compression_method);
        if let CompressionMethod::Unknown(m) = method {
            return Err(invalid_data(format!(
                "unsupported compression method {m} for entry {name}"
            )));
        }

        let (size, compressed_size, trailer) = if header.has_data_descriptor() {
            // A STORED entry has no end marker of its own, so without sizes
            // up front there is no way to find where it stops.
            if method == CompressionMethod::Stored {
                return Err(invalid_data(format!(
                    "only DEFLATE entries can have a data descriptor: {name}"
                )));
            }
            (None, None, Trailer::Descriptor { zip64: zip64.is_some() })
        } else {
            let sizes = zip64.unwrap_or_default();
            let size = sizes
                .uncompressed_size
                .unwrap_or(header.uncompressed_size as u64);
            let compressed = sizes
                .compressed_size
                .unwrap_or(header.compressed_size as u64);
            (
                Some(size),
                Some(compressed),
                Trailer::Header {
                    crc32: header.crc32,
                    size,
                },
            )
        };

        let decoder = match method {
            CompressionMethod::Stored => Decoder::Stored {
                remaining: compressed_size.unwrap_or(0),
            },
            _ => Decoder::Deflate(Box::new(Decompress::new(false))),
        };

        log::trace!("entry {name} method={} size={size:?}", method.as_u16());

        self.entry = Some(EntryState {
            name: name.clone(),
            decoder,
            trailer,
            crc: Crc::new(),
            produced: 0,
            finished: false,
        });

        Ok(Some(ZipEntry {
            is_directory: name.ends_with('/'),
            name,
            compression_method: method,
            size,
            last_mod_time: header.last_mod_time,
            last_mod_date: header.last_mod_date,
        }))
    }

    /// Consume the rest of the current entry, verifying its CRC and size.
    pub fn close_entry(&mut self) -> io::Result<()> {
        if self.entry.as_ref().is_some_and(|e| !e.finished) {
            io::copy(self, &mut io::sink())?;
        }
        self.entry = None;
        Ok(())
    }

    /// Discard up to `n` bytes of the current entry.
    ///
    /// Returns the number of bytes actually skipped, which is less than `n`
    /// only when the entry ends first.
    pub fn skip(&mut self, n: u64) -> io::Result<u64> {
        io::copy(&mut self.by_ref().take(n), &mut io::sink())
    }

    fn read_entry(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(state) = self.entry.as_mut() else {
            return Ok(0);
        };
        if state.finished || buf.is_empty() {
            return Ok(0);
        }

        let (n, end) = match &mut state.decoder {
            Decoder::Stored { remaining } => {
                if *remaining == 0 {
                    (0, true)
                } else {
                    let max = (*remaining).min(buf.len() as u64) as usize;
                    let n = self.inner.read(&mut buf[..max])?;
                    if n == 0 {
                        return Err(truncated(&state.name));
                    }
                    *remaining -= n as u64;
                    (n, *remaining == 0)
                }
            }
            Decoder::Deflate(decompress) => inflate(&mut self.inner, decompress, buf, &state.name)?,
        };

        state.crc.update(&buf[..n]);
        state.produced += n as u64;

        if end {
            state.finished = true;
            verify_entry(&mut self.inner, state)?;
        }

        Ok(n)
    }
}

impl<R: Read> Read for ZipStreamReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_entry(buf)
    }
}

fn truncated(name: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::UnexpectedEof,
        format!("unexpected end of archive in entry {name}"),
    )
}

/// Inflate into `buf`, consuming exactly the compressed bytes used from `inner`.
///
/// Returns the number of bytes produced and whether the DEFLATE stream ended.
fn inflate<B: BufRead>(
    inner: &mut B,
    decompress: &mut Decompress,
    buf: &mut [u8],
    name: &str,
) -> io::Result<(usize, bool)> {
    loop {
        let input = inner.fill_buf()?;
        let eof = input.is_empty();
        let flush = if eof {
            FlushDecompress::Finish
        } else {
            FlushDecompress::None
        };

        let before_in = decompress.total_in();
        let before_out = decompress.total_out();
        let status = decompress
            .decompress(input, buf, flush)
            .map_err(|e| invalid_data(format!("corrupt DEFLATE data in entry {name}: {e}")))?;
        let consumed = (decompress.total_in() - before_in) as usize;
        let produced = (decompress.total_out() - before_out) as usize;
        inner.consume(consumed);

        match status {
            Status::StreamEnd => return Ok((produced, true)),
            _ if produced > 0 => return Ok((produced, false)),
            _ if eof => return Err(truncated(name)),
            _ if consumed == 0 => {
                return Err(invalid_data(format!(
                    "DEFLATE stream stalled in entry {name}"
                )));
            }
            _ => {}
        }
    }
}

fn verify_entry<B: BufRead>(inner: &mut B, state: &EntryState) -> io::Result<()> {
    let (crc32, size) = match state.trailer {
        Trailer::Header { crc32, size } => (crc32, size),
        Trailer::Descriptor { zip64 } => {
            let descriptor = DataDescriptor::read_from(inner, zip64)?;
            (descriptor.crc32, descriptor.uncompressed_size)
        }
    };

    if state.crc.sum() != crc32 {
        return Err(invalid_data(format!(
            "invalid entry CRC for {} (expected {:#010x}, got {:#010x})",
            state.name,
            crc32,
            state.crc.sum()
        )));
    }
    if state.produced != size {
        return Err(invalid_data(format!(
            "invalid entry size for {} (expected {}, got {})",
            state.name, size, state.produced
        )));
    }
    Ok(())
}
