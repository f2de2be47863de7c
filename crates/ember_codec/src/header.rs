//! The fixed payload header written by [`BincodeCodec`](crate::BincodeCodec).
//!
//! Seven little-endian `u32` fields: magic, version hash, source hash, flags
//! hash, number of stub keys, body length, checksum.

use crate::error::SanityCheckFailure;
use xxhash_rust::xxh32::{xxh32, Xxh32};

/// Magic number opening every payload: `"EMBR"`.
pub const PAYLOAD_MAGIC: u32 = 0x454D_4252;

/// Payload format revision. Increment on breaking changes to the header or
/// body layout.
pub const FORMAT_VERSION: u32 = 1;

/// Size of the encoded header in bytes.
pub const HEADER_LEN: usize = 7 * 4;

/// Size of one encoded stub key in bytes.
pub const STUB_KEY_LEN: usize = 4;

/// Hash identifying the engine build and payload format.
pub fn version_hash() -> u32 {
    let tag = format!("{}/{}", env!("CARGO_PKG_VERSION"), FORMAT_VERSION);
    xxh32(tag.as_bytes(), 0)
}

/// Checksum over the stub key section and the body.
pub fn checksum(stub_keys: &[u8], body: &[u8]) -> u32 {
    let mut hasher = Xxh32::new(0);
    hasher.update(stub_keys);
    hasher.update(body);
    hasher.digest()
}

/// The decoded payload header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadHeader {
    /// Must equal [`PAYLOAD_MAGIC`].
    pub magic: u32,
    /// [`version_hash`] of the producing build.
    pub version_hash: u32,
    /// Fingerprint of the source the payload was compiled from.
    pub source_hash: u32,
    /// Hash of the engine flags in effect when compiling.
    pub flags_hash: u32,
    /// Number of stub keys following the header.
    pub num_stub_keys: u32,
    /// Length of the body following the stub keys.
    pub body_len: u32,
    /// [`checksum`] of the stub keys and body.
    pub checksum: u32,
}

impl PayloadHeader {
    /// Encodes the header.
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let fields = [
            self.magic,
            self.version_hash,
            self.source_hash,
            self.flags_hash,
            self.num_stub_keys,
            self.body_len,
            self.checksum,
        ];
        let mut out = [0u8; HEADER_LEN];
        for (chunk, field) in out.chunks_exact_mut(4).zip(fields) {
            chunk.copy_from_slice(&field.to_le_bytes());
        }
        out
    }

    /// Decodes the header at the start of `payload`.
    pub fn from_bytes(payload: &[u8]) -> Result<Self, SanityCheckFailure> {
        let Some(head) = payload.get(..HEADER_LEN) else {
            return Err(SanityCheckFailure::Truncated);
        };
        let mut fields = head
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]));
        let mut next = || fields.next().unwrap_or_default();
        Ok(Self {
            magic: next(),
            version_hash: next(),
            source_hash: next(),
            flags_hash: next(),
            num_stub_keys: next(),
            body_len: next(),
            checksum: next(),
        })
    }

    /// Total payload size this header describes, or `None` on overflow.
    pub fn expected_payload_len(&self) -> Option<usize> {
        let keys = usize::try_from(self.num_stub_keys)
            .ok()?
            .checked_mul(STUB_KEY_LEN)?;
        let body = usize::try_from(self.body_len).ok()?;
        HEADER_LEN.checked_add(keys)?.checked_add(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PayloadHeader {
        PayloadHeader {
            magic: PAYLOAD_MAGIC,
            version_hash: version_hash(),
            source_hash: 1,
            flags_hash: 2,
            num_stub_keys: 3,
            body_len: 40,
            checksum: 5,
        }
    }

    #[test]
    fn fields_are_little_endian_in_order() {
        let bytes = sample().to_bytes();
        assert_eq!(&bytes[..4], b"RBME");
        assert_eq!(&bytes[8..12], &1u32.to_le_bytes());
        assert_eq!(&bytes[16..20], &3u32.to_le_bytes());
        assert_eq!(PayloadHeader::from_bytes(&bytes).unwrap(), sample());
    }

    #[test]
    fn short_header_is_truncated() {
        let bytes = sample().to_bytes();
        assert_eq!(
            PayloadHeader::from_bytes(&bytes[..HEADER_LEN - 1]),
            Err(SanityCheckFailure::Truncated)
        );
    }

    #[test]
    fn expected_length() {
        assert_eq!(sample().expected_payload_len(), Some(HEADER_LEN + 12 + 40));
    }

    #[test]
    fn checksum_covers_both_sections() {
        let a = checksum(&[1, 2], &[3]);
        assert_ne!(a, checksum(&[1, 2], &[4]));
        assert_ne!(a, checksum(&[1, 3], &[3]));
        assert_eq!(a, checksum(&[1, 2], &[3]));
    }

    #[test]
    fn version_hash_is_stable() {
        assert_eq!(version_hash(), version_hash());
    }
}
