//! Source fingerprints used to judge whether cached code matches its source.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of a serialized [`Fingerprint`] in bytes.
pub const FINGERPRINT_LEN: usize = 4;

/// A 32-bit fingerprint of script source text, computed with XXH32.
///
/// The engine stamps every compiled artifact with the fingerprint of the
/// source it was produced from. Nothing forces a fingerprint to come from
/// real source: decoders accept whatever fingerprint the caller supplies,
/// and the configured [`FingerprintPolicy`](crate::FingerprintPolicy) decides
/// whether it is compared against the artifact at all.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(u32);

impl Fingerprint {
    /// Computes the fingerprint of a script's source text.
    pub fn of_source(source: &str) -> Self {
        Self(xxhash_rust::xxh32::xxh32(source.as_bytes(), 0))
    }

    /// Creates a fingerprint from a raw value, e.g. one read from a container.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw 32-bit value.
    pub fn as_raw(self) -> u32 {
        self.0
    }

    /// Encodes the fingerprint in native byte order, as stored in containers.
    pub fn to_ne_bytes(self) -> [u8; FINGERPRINT_LEN] {
        self.0.to_ne_bytes()
    }

    /// Decodes a fingerprint stored in native byte order.
    pub fn from_ne_bytes(bytes: [u8; FINGERPRINT_LEN]) -> Self {
        Self(u32::from_ne_bytes(bytes))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({:08x})", self.0)
    }
}
