//! Binary object archive.
//!
//! The archive owns the envelope (header, per-object type tag and length,
//! trailing checksum) and delegates payload bytes to each type's
//! [`Entity::write`](crate::Entity::write) and
//! [`Entity::read`](crate::Entity::read). Reconstruction goes through the
//! [`TypeRegistry`](crate::TypeRegistry): the persisted uuid picks the
//! descriptor, the descriptor's factory manufactures the instance.

mod format;
mod reader;
mod writer;

pub use format::{ARCHIVE_MAGIC, ARCHIVE_VERSION};
pub use reader::ArchiveReader;
pub use writer::ArchiveWriter;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArchiveError;
    use uuid::uuid;

    #[test]
    fn test_primitive_round_trip() {
        let id = uuid!("0e6d1c3a-9b84-47f2-a1d0-55c8e90b7a01");

        let mut writer = ArchiveWriter::new();
        writer.write_u8(7);
        writer.write_u32(0xDEAD_BEEF);
        writer.write_i64(-12);
        writer.write_f64(2.5);
        writer.write_bool(true);
        writer.write_str("annulus");
        writer.write_uuid(id);
        let bytes = writer.finish();

        let mut reader = ArchiveReader::new(&bytes).unwrap();
        assert_eq!(reader.read_u8().unwrap(), 7);
        assert_eq!(reader.read_u32().unwrap(), 0xDEAD_BEEF);
        assert_eq!(reader.read_i64().unwrap(), -12);
        assert_eq!(reader.read_f64().unwrap(), 2.5);
        assert!(reader.read_bool().unwrap());
        assert_eq!(reader.read_str().unwrap(), "annulus");
        assert_eq!(reader.read_uuid().unwrap(), id);
        assert!(reader.is_at_end());
    }

    #[test]
    fn test_reads_past_end_are_truncation_errors() {
        let mut writer = ArchiveWriter::new();
        writer.write_u8(1);
        let bytes = writer.finish();

        let mut reader = ArchiveReader::new(&bytes).unwrap();
        reader.read_u8().unwrap();
        assert!(matches!(reader.read_u32(), Err(ArchiveError::Truncated)));
    }

    #[test]
    fn test_bad_magic_is_rejected() {
        let mut bytes = ArchiveWriter::new().finish();
        bytes[0] ^= 0xFF;
        assert!(matches!(
            ArchiveReader::new(&bytes),
            Err(ArchiveError::BadMagic { .. })
        ));
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let mut bytes = ArchiveWriter::new().finish();
        bytes[4] = 99;
        assert!(matches!(
            ArchiveReader::new(&bytes),
            Err(ArchiveError::UnsupportedVersion { found: 99 })
        ));
    }

    #[test]
    fn test_payload_corruption_is_detected() {
        let mut writer = ArchiveWriter::new();
        writer.write_u64(0xABCD);
        let mut bytes = writer.finish();

        let payload_at = bytes.len() - super::format::TRAILER_LEN - 1;
        bytes[payload_at] ^= 0x01;
        assert!(matches!(
            ArchiveReader::new(&bytes),
            Err(ArchiveError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_short_buffer_is_truncated() {
        let bytes = ArchiveWriter::new().finish();
        assert!(matches!(
            ArchiveReader::new(&bytes[..6]),
            Err(ArchiveError::Truncated)
        ));
    }

    #[test]
    fn test_empty_archive_is_valid() {
        let writer = ArchiveWriter::new();
        assert_eq!(writer.payload_len(), 0);
        let bytes = writer.finish();
        let reader = ArchiveReader::new(&bytes).unwrap();
        assert!(reader.is_at_end());
    }
}
