//! Domain-Separated Hashing
//!
//! SHA-256 helpers used for:
//! - Randomness request handles
//! - Round audit hashes

use sha2::{Sha256, Digest};

/// Hash output type (256 bits / 32 bytes)
pub type Hash32 = [u8; 32];

/// Domain separator for round audit hashes.
pub const ROUND_DOMAIN: &[u8] = b"TREASURE_HUNT_ROUND_V1";

/// Domain separator for randomness request handles.
pub const REQUEST_DOMAIN: &[u8] = b"TREASURE_HUNT_REQUEST_V1";

/// Deterministic hasher over typed fields.
///
/// Order of updates is part of the hash; callers must keep it stable.
pub struct FieldHasher {
    hasher: Sha256,
}

impl FieldHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for round records.
    pub fn for_round() -> Self {
        Self::new(ROUND_DOMAIN)
    }

    /// Create hasher for request handles.
    pub fn for_request() -> Self {
        Self::new(REQUEST_DOMAIN)
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a u64 value (little-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with an i64 value (little-endian).
    #[inline]
    pub fn update_i64(&mut self, value: i64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a boolean.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    /// Update with an optional 16-byte id. `None` hashes as a zero tag.
    #[inline]
    pub fn update_opt_id(&mut self, id: Option<&[u8; 16]>) {
        match id {
            Some(bytes) => {
                self.update_u8(1);
                self.hasher.update(bytes);
            }
            None => self.update_u8(0),
        }
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> Hash32 {
        self.hasher.finalize().into()
    }
}

/// Derive a request handle from the submitting round and a monotonic nonce.
pub fn derive_request_id(round: u64, nonce: u64) -> Hash32 {
    let mut hasher = FieldHasher::for_request();
    hasher.update_u64(round);
    hasher.update_u64(nonce);
    hasher.finalize()
}
