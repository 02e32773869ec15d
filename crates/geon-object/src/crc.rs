//! Seeded CRC-32 folding used by `Entity::data_crc`.
//!
//! Every helper takes the running remainder and returns the new one, so
//! composite types can chain field CRCs and nest sub-object CRCs:
//!
//! ```ignore
//! let mut crc = crc::fold_f64(seed, self.radius);
//! crc = self.base_curve.data_crc(crc);
//! ```

use crc32fast::Hasher;
use uuid::Uuid;

/// Fold raw bytes into a running CRC-32.
pub fn fold_bytes(seed: u32, bytes: &[u8]) -> u32 {
    let mut hasher = Hasher::new_with_initial(seed);
    hasher.update(bytes);
    hasher.finalize()
}

/// Fold a `u32` (little-endian) into a running CRC-32.
pub fn fold_u32(seed: u32, value: u32) -> u32 {
    fold_bytes(seed, &value.to_le_bytes())
}

/// Fold a `u64` (little-endian) into a running CRC-32.
pub fn fold_u64(seed: u32, value: u64) -> u32 {
    fold_bytes(seed, &value.to_le_bytes())
}

/// Fold an `f64` into a running CRC-32.
///
/// Folds the raw bit pattern; `0.0` and `-0.0` hash differently.
pub fn fold_f64(seed: u32, value: f64) -> u32 {
    fold_bytes(seed, &value.to_bits().to_le_bytes())
}

/// Fold a string's UTF-8 bytes into a running CRC-32.
pub fn fold_str(seed: u32, value: &str) -> u32 {
    fold_bytes(seed, value.as_bytes())
}

/// Fold a uuid into a running CRC-32.
pub fn fold_uuid(seed: u32, value: Uuid) -> u32 {
    fold_bytes(seed, value.as_bytes())
}
