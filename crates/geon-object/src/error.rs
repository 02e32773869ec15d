//! Error types for the registry and the binary archive.

use uuid::Uuid;

/// Errors raised while registering types.
///
/// Lookup misses are not errors; `TypeRegistry::lookup_name` and friends
/// report absence through `Option` so the hot paths stay branch-cheap.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A live descriptor already uses this class name.
    #[error("duplicate type name: {0}")]
    DuplicateName(String),

    /// A live descriptor already uses this uuid.
    #[error("duplicate type uuid: {0}")]
    DuplicateUuid(Uuid),

    /// The nil uuid cannot identify a type.
    #[error("nil uuid for type {0}")]
    NilUuid(String),

    /// The declared base chain would loop back onto the new type.
    #[error("cyclic ancestry: {name} via base {base}")]
    CyclicAncestry {
        /// Name the registration was attempted under.
        name: String,
        /// Declared immediate base that closes the cycle.
        base: String,
    },
}

/// Errors raised while reading or writing a binary archive.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// The buffer ended before the requested bytes.
    #[error("archive truncated")]
    Truncated,

    /// The leading magic bytes do not identify an archive.
    #[error("bad archive magic: {found:#010x}")]
    BadMagic {
        /// Value found where the magic was expected.
        found: u32,
    },

    /// The archive was written by an unknown format version.
    #[error("unsupported archive version: {found}")]
    UnsupportedVersion {
        /// Version found in the header.
        found: u32,
    },

    /// The payload checksum does not match the stored one.
    #[error("archive checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch {
        /// Checksum stored in the archive.
        expected: u32,
        /// Checksum recomputed from the payload.
        actual: u32,
    },

    /// A length-prefixed string was not valid UTF-8.
    #[error("corrupt string in archive")]
    CorruptString,

    /// The persisted type uuid is not registered (or not constructible).
    #[error("unknown persisted type: {uuid}")]
    UnknownType {
        /// Uuid stored in the object envelope.
        uuid: Uuid,
    },

    /// The type opted out of persistence (no Read/Write override).
    #[error("type does not support persistence")]
    Unsupported,
}
