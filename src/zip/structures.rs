use byteorder::{LittleEndian, ReadBytesExt};
use chrono::{NaiveDate, NaiveDateTime};
use std::io::{self, Cursor};

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::Unknown(v) => *v,
        }
    }
}

/// General purpose flag: entry is encrypted
pub const FLAG_ENCRYPTED: u16 = 1;
/// General purpose flag: CRC and sizes follow the data in a data descriptor
pub const FLAG_DATA_DESCRIPTOR: u16 = 1 << 3;

/// Extra field id of the ZIP64 extended information block
pub const ZIP64_EXTRA_ID: u16 = 0x0001;

/// Marker stored in 32-bit size fields when the real value lives in ZIP64 extra data
const ZIP64_MARKER: u32 = 0xFFFF_FFFF;

pub(crate) fn invalid_data(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

/// Local File Header (LFH) - 30 bytes followed by name and extra field
#[derive(Debug, Clone)]
pub struct LocalFileHeader {
    pub version_needed: u16,
    pub flags: u16,
    pub compression_method: u16,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub file_name_length: u16,
    pub extra_field_length: u16,
}

impl LocalFileHeader {
    pub const SIGNATURE: &'static [u8] = b"PK\x03\x04";
    pub const SIZE: usize = 30;

    /// Parse the fixed part of a local header, signature included.
    pub fn from_bytes(data: &[u8]) -> io::Result<Self> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            return Err(invalid_data("Invalid Local File Header"));
        }

        let mut cursor = Cursor::new(&data[4..]);

        Ok(Self {
            version_needed: cursor.read_u16::<LittleEndian>()?,
            flags: cursor.read_u16::<LittleEndian>()?,
            compression_method: cursor.read_u16::<LittleEndian>()?,
            last_mod_time: cursor.read_u16::<LittleEndian>()?,
            last_mod_date: cursor.read_u16::<LittleEndian>()?,
            crc32: cursor.read_u32::<LittleEndian>()?,
            compressed_size: cursor.read_u32::<LittleEndian>()?,
            uncompressed_size: cursor.read_u32::<LittleEndian>()?,
            file_name_length: cursor.read_u16::<LittleEndian>()?,
            extra_field_length: cursor.read_u16::<LittleEndian>()?,
        })
    }

    pub fn has_data_descriptor(&self) -> bool {
        self.flags & FLAG_DATA_DESCRIPTOR != 0
    }

    pub fn is_encrypted(&self) -> bool {
        self.flags & FLAG_ENCRYPTED != 0
    }
}

/// Sizes recovered from a ZIP64 extended information extra field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Zip64Sizes {
    pub uncompressed_size: Option<u64>,
    pub compressed_size: Option<u64>,
}

/// Scan an extra field block for ZIP64 sizes.
///
/// Returns `None` when the block carries no ZIP64 field. Like the central
/// directory variant, a value is only present when the matching header
/// field holds the 0xFFFFFFFF marker.
pub fn parse_zip64_extra(
    extra: &[u8],
    header: &LocalFileHeader,
) -> io::Result<Option<Zip64Sizes>> {
    let mut cursor = Cursor::new(extra);
    let end = extra.len() as u64;

    while cursor.position() + 4 <= end {
        let header_id = cursor.read_u16::<LittleEndian>()?;
        let field_size = cursor.read_u16::<LittleEndian>()? as u64;
        let field_end = cursor.position() + field_size;

        if header_id == ZIP64_EXTRA_ID {
            let mut sizes = Zip64Sizes::default();
            if header.uncompressed_size == ZIP64_MARKER && cursor.position() + 8 <= field_end {
                sizes.uncompressed_size = Some(cursor.read_u64::<LittleEndian>()?);
            }
            if header.compressed_size == ZIP64_MARKER && cursor.position() + 8 <= field_end {
                sizes.compressed_size = Some(cursor.read_u64::<LittleEndian>()?);
            }
            return Ok(Some(sizes));
        }

        cursor.set_position(field_end);
    }

    Ok(None)
}

/// Data descriptor trailing an entry whose header deferred CRC and sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataDescriptor {
    pub crc32: u32,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
}

impl DataDescriptor {
    /// Optional signature; readers must accept descriptors without it.
    pub const SIGNATURE: u32 = 0x0807_4b50;

    /// Read a descriptor, with 8-byte sizes when the entry is ZIP64.
    pub fn read_from<R: io::Read>(reader: &mut R, zip64: bool) -> io::Result<Self> {
        let first = reader.read_u32::<LittleEndian>()?;
        let crc32 = if first == Self::SIGNATURE {
            reader.read_u32::<LittleEndian>()?
        } else {
            first
        };

        let (compressed_size, uncompressed_size) = if zip64 {
            (
                reader.read_u64::<LittleEndian>()?,
                reader.read_u64::<LittleEndian>()?,
            )
        } else {
            (
                reader.read_u32::<LittleEndian>()? as u64,
                reader.read_u32::<LittleEndian>()? as u64,
            )
        };

        Ok(Self {
            crc32,
            compressed_size,
            uncompressed_size,
        })
    }
}

/// One entry as seen while streaming through the archive.
#[derive(Debug, Clone)]
pub struct ZipEntry {
    pub name: String,
    pub compression_method: CompressionMethod,
    /// Uncompressed size, `None` when the header deferred it to a data descriptor.
    pub size: Option<u64>,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub is_directory: bool,
}

impl ZipEntry {
    /// Parse modification date to (year, month, day)
    pub fn mod_date(&self) -> (u16, u8, u8) {
        let day = (self.last_mod_date & 0x1F) as u8;
        let month = ((self.last_mod_date >> 5) & 0x0F) as u8;
        let year = ((self.last_mod_date >> 9) & 0x7F) + 1980;
        (year, month, day)
    }

    /// Parse modification time to (hour, minute, second)
    pub fn mod_time(&self) -> (u8, u8, u8) {
        let second = ((self.last_mod_time & 0x1F) * 2) as u8;
        let minute = ((self.last_mod_time >> 5) & 0x3F) as u8;
        let hour = ((self.last_mod_time >> 11) & 0x1F) as u8;
        (hour, minute, second)
    }

    /// Modification time, `None` when the DOS fields do not form a valid date.
    ///
    /// DOS timestamps carry no time zone, so the value is naive.
    pub fn modified(&self) -> Option<NaiveDateTime> {
        let (year, month, day) = self.mod_date();
        let (hour, minute, second) = self.mod_time();
        NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)?.and_hms_opt(
            hour as u32,
            minute as u32,
            second as u32,
        )
    }

    /// Modification time in milliseconds since the Unix epoch, read as UTC.
    pub fn modified_millis(&self) -> u64 {
        self.modified()
            .map(|t| t.and_utc().timestamp_millis().max(0) as u64)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(flags: u16, method: u16, csize: u32, usize_: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(LocalFileHeader::SIGNATURE);
        buf.extend_from_slice(&20u16.to_le_bytes());
        buf.extend_from_slice(&flags.to_le_bytes());
        buf.extend_from_slice(&method.to_le_bytes());
        buf.extend_from_slice(&0x6000u16.to_le_bytes());
        buf.extend_from_slice(&0x5a21u16.to_le_bytes());
        buf.extend_from_slice(&0xdeadbeefu32.to_le_bytes());
        buf.extend_from_slice(&csize.to_le_bytes());
        buf.extend_from_slice(&usize_.to_le_bytes());
        buf.extend_from_slice(&5u16.to_le_bytes());
        buf.extend_from_slice(&0u16.to_le_bytes());
        buf
    }

    #[test]
    fn parses_local_header() {
        let header = LocalFileHeader::from_bytes(&header_bytes(0, 8, 7, 11)).unwrap();
        assert_eq!(header.compression_method, 8);
        assert_eq!(header.compressed_size, 7);
        assert_eq!(header.uncompressed_size, 11);
        assert_eq!(header.crc32, 0xdeadbeef);
        assert_eq!(header.file_name_length, 5);
        assert!(!header.has_data_descriptor());
    }

    #[test]
    fn rejects_bad_signature() {
        let mut bytes = header_bytes(0, 0, 0, 0);
        bytes[2] = 0x01;
        let err = LocalFileHeader::from_bytes(&bytes).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn zip64_extra_overrides_marked_sizes() {
        let header =
            LocalFileHeader::from_bytes(&header_bytes(0, 0, ZIP64_MARKER, ZIP64_MARKER)).unwrap();
        let mut extra = Vec::new();
        // unrelated field first
        extra.extend_from_slice(&0x5455u16.to_le_bytes());
        extra.extend_from_slice(&1u16.to_le_bytes());
        extra.push(0);
        extra.extend_from_slice(&ZIP64_EXTRA_ID.to_le_bytes());
        extra.extend_from_slice(&16u16.to_le_bytes());
        extra.extend_from_slice(&(5u64 << 32).to_le_bytes());
        extra.extend_from_slice(&42u64.to_le_bytes());

        let sizes = parse_zip64_extra(&extra, &header).unwrap().unwrap();
        assert_eq!(sizes.uncompressed_size, Some(5u64 << 32));
        assert_eq!(sizes.compressed_size, Some(42));
    }

    #[test]
    fn data_descriptor_with_and_without_signature() {
        let mut signed = Vec::new();
        signed.extend_from_slice(&DataDescriptor::SIGNATURE.to_le_bytes());
        signed.extend_from_slice(&7u32.to_le_bytes());
        signed.extend_from_slice(&3u32.to_le_bytes());
        signed.extend_from_slice(&9u32.to_le_bytes());
        let dd = DataDescriptor::read_from(&mut Cursor::new(signed), false).unwrap();
        assert_eq!(
            dd,
            DataDescriptor {
                crc32: 7,
                compressed_size: 3,
                uncompressed_size: 9
            }
        );

        let mut bare = Vec::new();
        bare.extend_from_slice(&7u32.to_le_bytes());
        bare.extend_from_slice(&3u64.to_le_bytes());
        bare.extend_from_slice(&9u64.to_le_bytes());
        let dd = DataDescriptor::read_from(&mut Cursor::new(bare), true).unwrap();
        assert_eq!(dd.uncompressed_size, 9);
    }

    #[test]
    fn dos_timestamp_fields() {
        let entry = ZipEntry {
            name: "a".into(),
            compression_method: CompressionMethod::Stored,
            size: Some(0),
            last_mod_time: (13 << 11) | (45 << 5) | 10,
            last_mod_date: (44 << 9) | (6 << 5) | 17,
            is_directory: false,
        };
        assert_eq!(entry.mod_date(), (2024, 6, 17));
        assert_eq!(entry.mod_time(), (13, 45, 20));
        assert_eq!(entry.modified_millis(), 1_718_631_920_000);
    }

    #[test]
    fn zeroed_dos_date_has_no_timestamp() {
        // month and day 0 are not a calendar date
        let entry = ZipEntry {
            name: "a".into(),
            compression_method: CompressionMethod::Stored,
            size: None,
            last_mod_time: 0,
            last_mod_date: 0,
            is_directory: false,
        };
        assert!(entry.modified().is_none());
        assert_eq!(entry.modified_millis(), 0);
    }
}
