//! Archive writer.

use uuid::Uuid;

use super::format::{ARCHIVE_MAGIC, ARCHIVE_VERSION, HEADER_LEN};
use crate::crc;
use crate::entity::Entity;
use crate::error::ArchiveError;

/// Buffered little-endian archive writer.
///
/// Primitive writes are infallible; [`finish`](ArchiveWriter::finish)
/// seals the buffer with the payload checksum.
pub struct ArchiveWriter {
    buf: Vec<u8>,
}

impl ArchiveWriter {
    /// Start a new archive (magic and version are written up front).
    pub fn new() -> Self {
        let mut buf = Vec::with_capacity(64);
        buf.extend_from_slice(&ARCHIVE_MAGIC.to_le_bytes());
        buf.extend_from_slice(&ARCHIVE_VERSION.to_le_bytes());
        Self { buf }
    }

    /// Write a `u8`.
    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    /// Write a `u16`.
    pub fn write_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a `u32`.
    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a `u64`.
    pub fn write_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Write an `i32`.
    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Write an `i64`.
    pub fn write_i64(&mut self, value: i64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Write an `f64`.
    pub fn write_f64(&mut self, value: f64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a `bool` as one byte.
    pub fn write_bool(&mut self, value: bool) {
        self.buf.push(u8::from(value));
    }

    /// Write raw bytes, no length prefix.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Write a string as a `u32` length prefix plus UTF-8 bytes.
    pub fn write_str(&mut self, value: &str) {
        self.write_u32(value.len() as u32);
        self.buf.extend_from_slice(value.as_bytes());
    }

    /// Write a uuid as 16 raw bytes.
    pub fn write_uuid(&mut self, value: Uuid) {
        self.buf.extend_from_slice(value.as_bytes());
    }

    /// Write one object record: type uuid, payload length, payload.
    ///
    /// Only the payload is delegated to [`Entity::write`]; the envelope is
    /// owned here. A type without a `write` override fails with
    /// [`ArchiveError::Unsupported`], leaving a partial record in the
    /// buffer; discard the archive on error.
    pub fn write_object(&mut self, entity: &dyn Entity) -> Result<(), ArchiveError> {
        let descriptor = entity.descriptor();
        self.write_uuid(descriptor.uuid());

        let patch_at = self.buf.len();
        self.write_u32(0);
        let start = self.buf.len();
        entity.write(self)?;
        let length = (self.buf.len() - start) as u32;
        self.patch_u32(patch_at, length);

        log::trace!("wrote object {} ({length} bytes)", entity.dump());
        Ok(())
    }

    /// Overwrite a previously written `u32` (length backpatching).
    pub fn patch_u32(&mut self, offset: usize, value: u32) {
        self.buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    /// Bytes written past the header so far.
    pub fn payload_len(&self) -> usize {
        self.buf.len() - HEADER_LEN
    }

    /// Seal the archive: append the payload checksum and hand the buffer
    /// to the caller.
    pub fn finish(mut self) -> Vec<u8> {
        let checksum = crc::fold_bytes(0, &self.buf[HEADER_LEN..]);
        self.buf.extend_from_slice(&checksum.to_le_bytes());
        self.buf
    }
}

impl Default for ArchiveWriter {
    fn default() -> Self {
        Self::new()
    }
}
