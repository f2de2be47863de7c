//! The outer artifact container: `[fingerprint: u32, native byte order][payload]`.
//!
//! The container carries no magic, version, or checksum of its own. The
//! fingerprint is informational; decoders take the fingerprint to check
//! against from their caller.

use crate::artifact::CompiledArtifact;
use crate::error::{CodecError, SanityCheckFailure};
use ember_common::fingerprint::FINGERPRINT_LEN;
use ember_common::Fingerprint;

/// A parsed view of container bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Container<'a> {
    /// The fingerprint stored in the first four bytes.
    pub fingerprint: Fingerprint,
    /// Everything after the fingerprint.
    pub payload: &'a [u8],
}

/// Packs a fingerprint and an artifact's payload into container bytes.
pub fn encode(fingerprint: Fingerprint, artifact: &CompiledArtifact) -> Vec<u8> {
    let mut out = Vec::with_capacity(FINGERPRINT_LEN + artifact.payload.len());
    out.extend_from_slice(&fingerprint.to_ne_bytes());
    out.extend_from_slice(&artifact.payload);
    out
}

/// Splits container bytes into fingerprint and payload.
pub fn parse(bytes: &[u8]) -> Result<Container<'_>, CodecError> {
    let Some((head, payload)) = bytes.split_first_chunk::<FINGERPRINT_LEN>() else {
        return Err(SanityCheckFailure::Truncated.into());
    };
    Ok(Container {
        fingerprint: Fingerprint::from_ne_bytes(*head),
        payload,
    })
}

/// Reads only the fingerprint of container bytes.
pub fn read_fingerprint(bytes: &[u8]) -> Result<Fingerprint, CodecError> {
    parse(bytes).map(|container| container.fingerprint)
}
