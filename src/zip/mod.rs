//! ZIP archive stream parsing.
//!
//! This module reads ZIP archives strictly front to back, the way a
//! forward-only byte stream allows.
//!
//! ## Architecture
//!
//! - [`structures`]: Data structures representing ZIP format elements (local headers, data descriptors, entries)
//! - [`stream`]: Sequential reader yielding entries and their uncompressed bytes
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and compressed data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! Only the first part is consulted here. The Central Directory would
//! require seeking to the end of the file, which a stream cannot do, so
//! entry metadata comes from each Local File Header instead. When an entry
//! was written by a streaming writer, its header carries no sizes and the
//! size stays unknown until the entry is read to the end.
//!
//! ## Supported Features
//!
//! - ZIP64 sizes in local headers and data descriptors
//! - STORED (no compression) method
//! - DEFLATE compression method
//! - CRC-32 verification of every entry
//!
//! ## Limitations
//!
//! - No encryption support
//! - No multi-disk archive support
//! - STORED entries must record their size in the local header

mod stream;
mod structures;

pub use stream::ZipStreamReader;
pub use structures::*;
