//! Fixture archives for the integration tests.
//!
//! Archives are assembled byte by byte so that each test controls exactly
//! how an entry is stored: with sizes in the local header, with sizes in a
//! trailing data descriptor, or with a deliberately wrong CRC.

#![allow(dead_code)]

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::write::DeflateEncoder;
use flate2::{Compression, Crc};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use zipstream_vfs::{LocalFileSource, StreamSource};

struct CentralRecord {
    name: String,
    flags: u16,
    method: u16,
    crc: u32,
    compressed: u32,
    uncompressed: u32,
    offset: u32,
}

#[derive(Default)]
pub struct ZipBuilder {
    data: Vec<u8>,
    central: Vec<CentralRecord>,
    zip64: bool,
}

fn crc_of(data: &[u8]) -> u32 {
    let mut crc = Crc::new();
    crc.update(data);
    crc.sum()
}

fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory marker entry; `name` should end with `/`.
    pub fn directory(self, name: &str) -> Self {
        self.stored(name, b"")
    }

    /// Uncompressed entry with sizes in the local header.
    pub fn stored(mut self, name: &str, data: &[u8]) -> Self {
        let crc = crc_of(data);
        self.entry(name, 0, 0, crc, data, data.len() as u32, false);
        self
    }

    /// Compressed entry with sizes in the local header.
    pub fn deflated(mut self, name: &str, data: &[u8]) -> Self {
        let compressed = deflate(data);
        self.entry(name, 0, 8, crc_of(data), &compressed, data.len() as u32, false);
        self
    }

    /// Compressed entry whose header leaves size and CRC to a data
    /// descriptor, as streaming writers produce.
    pub fn streamed(mut self, name: &str, data: &[u8]) -> Self {
        let compressed = deflate(data);
        self.entry(name, 1 << 3, 8, crc_of(data), &compressed, data.len() as u32, true);
        self
    }

    /// Uncompressed entry whose recorded CRC does not match its content.
    pub fn corrupt(mut self, name: &str, data: &[u8]) -> Self {
        let crc = crc_of(data) ^ 0xFFFF_FFFF;
        self.entry(name, 0, 0, crc, data, data.len() as u32, false);
        self
    }

    /// Entry flagged as encrypted; the payload is stored as given.
    pub fn encrypted(mut self, name: &str, data: &[u8]) -> Self {
        self.entry(name, 1, 0, crc_of(data), data, data.len() as u32, false);
        self
    }

    /// Entry claiming a compression method this reader does not decode.
    pub fn with_method(mut self, name: &str, method: u16, data: &[u8]) -> Self {
        self.entry(name, 0, method, crc_of(data), data, data.len() as u32, false);
        self
    }

    /// Uncompressed entry whose local header defers both sizes to a ZIP64
    /// extra field.
    pub fn zip64(mut self, name: &str, data: &[u8]) -> Self {
        self.zip64 = true;
        self.entry(name, 0, 0, crc_of(data), data, data.len() as u32, false);
        self.zip64 = false;
        self
    }

    #[allow(clippy::too_many_arguments)]
    fn entry(
        &mut self,
        name: &str,
        flags: u16,
        method: u16,
        crc: u32,
        payload: &[u8],
        uncompressed: u32,
        descriptor: bool,
    ) {
        let offset = self.data.len() as u32;
        let compressed = payload.len() as u32;
        let (h_crc, h_comp, h_uncomp) = if descriptor {
            (0, 0, 0)
        } else if self.zip64 {
            (crc, u32::MAX, u32::MAX)
        } else {
            (crc, compressed, uncompressed)
        };
        let mut extra = Vec::new();
        if self.zip64 {
            extra.write_u16::<LittleEndian>(0x0001).unwrap();
            extra.write_u16::<LittleEndian>(16).unwrap();
            extra.write_u64::<LittleEndian>(uncompressed as u64).unwrap();
            extra.write_u64::<LittleEndian>(compressed as u64).unwrap();
        }

        let out = &mut self.data;
        out.extend_from_slice(b"PK\x03\x04");
        out.write_u16::<LittleEndian>(20).unwrap();
        out.write_u16::<LittleEndian>(flags).unwrap();
        out.write_u16::<LittleEndian>(method).unwrap();
        out.write_u16::<LittleEndian>(0x6000).unwrap();
        out.write_u16::<LittleEndian>(0x5a21).unwrap();
        out.write_u32::<LittleEndian>(h_crc).unwrap();
        out.write_u32::<LittleEndian>(h_comp).unwrap();
        out.write_u32::<LittleEndian>(h_uncomp).unwrap();
        out.write_u16::<LittleEndian>(name.len() as u16).unwrap();
        out.write_u16::<LittleEndian>(extra.len() as u16).unwrap();
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(&extra);
        out.extend_from_slice(payload);

        if descriptor {
            out.write_u32::<LittleEndian>(0x0807_4b50).unwrap();
            out.write_u32::<LittleEndian>(crc).unwrap();
            out.write_u32::<LittleEndian>(compressed).unwrap();
            out.write_u32::<LittleEndian>(uncompressed).unwrap();
        }

        self.central.push(CentralRecord {
            name: name.to_owned(),
            flags,
            method,
            crc,
            compressed,
            uncompressed,
            offset,
        });
    }

    /// Append the central directory and end record.
    pub fn finish(mut self) -> Vec<u8> {
        let cd_offset = self.data.len() as u32;
        let out = &mut self.data;
        for record in &self.central {
            out.extend_from_slice(b"PK\x01\x02");
            out.write_u16::<LittleEndian>(20).unwrap();
            out.write_u16::<LittleEndian>(20).unwrap();
            out.write_u16::<LittleEndian>(record.flags).unwrap();
            out.write_u16::<LittleEndian>(record.method).unwrap();
            out.write_u16::<LittleEndian>(0x6000).unwrap();
            out.write_u16::<LittleEndian>(0x5a21).unwrap();
            out.write_u32::<LittleEndian>(record.crc).unwrap();
            out.write_u32::<LittleEndian>(record.compressed).unwrap();
            out.write_u32::<LittleEndian>(record.uncompressed).unwrap();
            out.write_u16::<LittleEndian>(record.name.len() as u16).unwrap();
            out.write_u16::<LittleEndian>(0).unwrap();
            out.write_u16::<LittleEndian>(0).unwrap();
            out.write_u16::<LittleEndian>(0).unwrap();
            out.write_u16::<LittleEndian>(0).unwrap();
            out.write_u32::<LittleEndian>(0).unwrap();
            out.write_u32::<LittleEndian>(record.offset).unwrap();
            out.extend_from_slice(record.name.as_bytes());
        }
        let cd_size = out.len() as u32 - cd_offset;

        out.extend_from_slice(b"PK\x05\x06");
        out.write_u16::<LittleEndian>(0).unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();
        out.write_u16::<LittleEndian>(self.central.len() as u16).unwrap();
        out.write_u16::<LittleEndian>(self.central.len() as u16).unwrap();
        out.write_u32::<LittleEndian>(cd_size).unwrap();
        out.write_u32::<LittleEndian>(cd_offset).unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();

        self.data
    }

    /// Write the archive into `dir` and return its location.
    pub fn write_to(self, dir: &Path, file_name: &str) -> PathBuf {
        let path = dir.join(file_name);
        std::fs::write(&path, self.finish()).unwrap();
        path
    }
}

/// Modification time written into every fixture entry, 2025-01-01 12:00:00,
/// in milliseconds since the Unix epoch.
pub const FIXTURE_MODIFIED: u64 = 1_735_732_800_000;

/// The archive from the reference example: a directory marker, a 10 byte
/// file inside it, and a 5 byte file whose size is only known at its end.
pub fn example_archive(dir: &Path) -> PathBuf {
    ZipBuilder::new()
        .directory("a/")
        .stored("a/b.txt", b"0123456789")
        .streamed("c.txt", b"hello")
        .write_to(dir, "example.zip")
}

/// Pseudo-random but reproducible content.
pub fn sample_bytes(len: usize) -> Vec<u8> {
    let mut state = 0x2545_f491_u32;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect()
}

pub fn zip_path(archive: &Path, entry: &str) -> String {
    if entry.is_empty() {
        format!("zip:{}", archive.display())
    } else {
        format!("zip:{}!{}", archive.display(), entry)
    }
}

/// Local file source that counts how often an archive is opened.
#[derive(Default)]
pub struct CountingSource {
    opens: AtomicUsize,
}

impl CountingSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl StreamSource for CountingSource {
    fn open(&self, location: &str) -> io::Result<Box<dyn Read + Send>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        LocalFileSource.open(location)
    }
}
