//! Decoding container bytes into a runnable function.

use crate::artifact::{AttachedObject, AttachmentDescriptor, CachedData};
use crate::codec::{ArtifactCodec, ReconstructionLimits};
use crate::container;
use crate::error::CodecError;
use ember_bytecode::{FunctionDescriptor, Script, StubCache};
use ember_common::{EngineFlags, Fingerprint, FingerprintPolicy};
use std::sync::Arc;

/// Engine state a decode is checked against.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    /// Flags of the decoding engine.
    pub flags: EngineFlags,
    /// Whether the caller's fingerprint is compared with the payload.
    pub policy: FingerprintPolicy,
    /// Reconstruction bounds.
    pub limits: ReconstructionLimits,
}

/// Resolves attachment descriptors to objects, in order.
///
/// The source object is always a fresh empty placeholder; stubs come from
/// `stubs` by key.
pub fn resolve_attachments(
    descriptors: &[AttachmentDescriptor],
    stubs: &mut StubCache,
) -> Result<Vec<AttachedObject>, CodecError> {
    descriptors
        .iter()
        .map(|descriptor| match descriptor {
            AttachmentDescriptor::Source => Ok(AttachedObject::Source(Arc::new(Script::placeholder()))),
            AttachmentDescriptor::CodeStub(key) => stubs
                .get_code(*key)
                .map(AttachedObject::CodeStub)
                .ok_or_else(|| {
                    CodecError::Reconstruction {
                        reason: format!("no code stub has key {key}"),
                    }
                }),
        })
        .collect()
}

/// Decodes container bytes with a caller-supplied fingerprint.
///
/// The fingerprint stored in the container is ignored. A sanity-check
/// failure marks `data` as rejected.
pub fn decode(
    codec: &dyn ArtifactCodec,
    data: &CachedData,
    caller_fingerprint: Fingerprint,
    stubs: &mut StubCache,
    options: &DecodeOptions,
) -> Result<FunctionDescriptor, CodecError> {
    let result = decode_inner(codec, data.bytes(), caller_fingerprint, stubs, options);
    match &result {
        Ok(function) => tracing::debug!(
            fingerprint = %caller_fingerprint,
            functions = function.function_count(),
            "decoded artifact"
        ),
        Err(err) if err.is_integrity() => {
            data.reject();
            tracing::warn!(fingerprint = %caller_fingerprint, error = %err, "rejected cached data");
        }
        Err(err) => tracing::debug!(error = %err, "artifact reconstruction failed"),
    }
    result
}

fn decode_inner(
    codec: &dyn ArtifactCodec,
    bytes: &[u8],
    caller_fingerprint: Fingerprint,
    stubs: &mut StubCache,
    options: &DecodeOptions,
) -> Result<FunctionDescriptor, CodecError> {
    let payload = container::parse(bytes)?.payload;
    let expected = match options.policy {
        FingerprintPolicy::Permissive => None,
        FingerprintPolicy::Enforced => Some(caller_fingerprint),
    };
    let descriptors = codec.inspect(payload, expected, options.flags)?;
    let attachments = resolve_attachments(&descriptors, stubs)?;
    codec.reconstruct(payload, &attachments, &options.limits)
}
