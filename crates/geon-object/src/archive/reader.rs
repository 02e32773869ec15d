//! Archive reader.

use uuid::Uuid;

use super::format::{ARCHIVE_MAGIC, ARCHIVE_VERSION, HEADER_LEN, TRAILER_LEN};
use crate::crc;
use crate::entity::Entity;
use crate::error::ArchiveError;
use crate::registry::TypeRegistry;

fn read_u32_at(bytes: &[u8], at: usize) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(raw)
}

/// Little-endian archive reader over a sealed buffer.
///
/// Construction validates the header and verifies the payload checksum;
/// after that every read is a plain cursor advance.
pub struct ArchiveReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ArchiveReader<'a> {
    /// Open a sealed archive produced by
    /// [`ArchiveWriter::finish`](crate::ArchiveWriter::finish).
    pub fn new(bytes: &'a [u8]) -> Result<Self, ArchiveError> {
        if bytes.len() < HEADER_LEN + TRAILER_LEN {
            return Err(ArchiveError::Truncated);
        }

        let magic = read_u32_at(bytes, 0);
        if magic != ARCHIVE_MAGIC {
            return Err(ArchiveError::BadMagic { found: magic });
        }
        let version = read_u32_at(bytes, 4);
        if version != ARCHIVE_VERSION {
            return Err(ArchiveError::UnsupportedVersion { found: version });
        }

        let payload = &bytes[HEADER_LEN..bytes.len() - TRAILER_LEN];
        let expected = read_u32_at(bytes, bytes.len() - TRAILER_LEN);
        let actual = crc::fold_bytes(0, payload);
        if expected != actual {
            return Err(ArchiveError::ChecksumMismatch { expected, actual });
        }

        Ok(Self {
            data: payload,
            pos: 0,
        })
    }

    /// View over one object payload; no header or checksum expected.
    pub(crate) fn for_payload(payload: &'a [u8]) -> Self {
        Self {
            data: payload,
            pos: 0,
        }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], ArchiveError> {
        let end = self
            .pos
            .checked_add(N)
            .filter(|end| *end <= self.data.len())
            .ok_or(ArchiveError::Truncated)?;
        let mut raw = [0u8; N];
        raw.copy_from_slice(&self.data[self.pos..end]);
        self.pos = end;
        Ok(raw)
    }

    /// Read a `u8`.
    pub fn read_u8(&mut self) -> Result<u8, ArchiveError> {
        Ok(self.take::<1>()?[0])
    }

    /// Read a `u16`.
    pub fn read_u16(&mut self) -> Result<u16, ArchiveError> {
        Ok(u16::from_le_bytes(self.take()?))
    }

    /// Read a `u32`.
    pub fn read_u32(&mut self) -> Result<u32, ArchiveError> {
        Ok(u32::from_le_bytes(self.take()?))
    }

    /// Read a `u64`.
    pub fn read_u64(&mut self) -> Result<u64, ArchiveError> {
        Ok(u64::from_le_bytes(self.take()?))
    }

    /// Read an `i32`.
    pub fn read_i32(&mut self) -> Result<i32, ArchiveError> {
        Ok(i32::from_le_bytes(self.take()?))
    }

    /// Read an `i64`.
    pub fn read_i64(&mut self) -> Result<i64, ArchiveError> {
        Ok(i64::from_le_bytes(self.take()?))
    }

    /// Read an `f64`.
    pub fn read_f64(&mut self) -> Result<f64, ArchiveError> {
        Ok(f64::from_le_bytes(self.take()?))
    }

    /// Read a `bool` (one byte, nonzero is true).
    pub fn read_bool(&mut self) -> Result<bool, ArchiveError> {
        Ok(self.read_u8()? != 0)
    }

    /// Read `len` raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], ArchiveError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(ArchiveError::Truncated)?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    /// Read a length-prefixed UTF-8 string.
    pub fn read_str(&mut self) -> Result<String, ArchiveError> {
        let len = self.read_u32()? as usize;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| ArchiveError::CorruptString)
    }

    /// Read a uuid (16 raw bytes).
    pub fn read_uuid(&mut self) -> Result<Uuid, ArchiveError> {
        Ok(Uuid::from_bytes(self.take()?))
    }

    /// Read one object record written by
    /// [`ArchiveWriter::write_object`](crate::ArchiveWriter::write_object).
    ///
    /// The persisted uuid selects the concrete type through `registry`;
    /// the instance is manufactured by the registered factory and its
    /// payload handed to [`Entity::read`]. The cursor always advances past
    /// the whole record, so an [`ArchiveError::UnknownType`] can be caught
    /// and reading resumed at the next record.
    pub fn read_object(
        &mut self,
        registry: &TypeRegistry,
    ) -> Result<Box<dyn Entity>, ArchiveError> {
        let uuid = self.read_uuid()?;
        let length = self.read_u32()? as usize;
        let payload = self.read_bytes(length)?;

        let descriptor = registry
            .lookup_uuid(uuid)
            .ok_or(ArchiveError::UnknownType { uuid })?;
        let mut entity = descriptor.create().ok_or(ArchiveError::Unsupported)?;

        let mut sub = ArchiveReader::for_payload(payload);
        entity.read(&mut sub)?;
        log::trace!("read object {} ({length} bytes)", descriptor.name());
        Ok(entity)
    }

    /// Bytes left before the end of the payload.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// True once the whole payload has been consumed.
    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }
}
