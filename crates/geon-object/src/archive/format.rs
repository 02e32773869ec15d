//! Archive framing constants.
//!
//! An archive is a little-endian byte buffer:
//!
//! ```text
//! [magic: u32][version: u32][payload ...][crc32(payload): u32]
//! ```
//!
//! The payload is a sequence of records written by the caller; object
//! records are framed as `[type uuid: 16 bytes][length: u32][bytes]` so a
//! reader can skip past types it does not know.

/// Leading magic: the bytes `GEON` read as a little-endian `u32`.
pub const ARCHIVE_MAGIC: u32 = u32::from_le_bytes(*b"GEON");

/// Current archive format version.
pub const ARCHIVE_VERSION: u32 = 1;

/// Bytes of magic + version preceding the payload.
pub(crate) const HEADER_LEN: usize = 8;

/// Bytes of the trailing checksum.
pub(crate) const TRAILER_LEN: usize = 4;
