//! The pluggable payload codec.

use crate::artifact::{AttachedObject, AttachmentDescriptor, CompiledArtifact};
use crate::body::{FunctionRecord, PayloadBody, Rebuild};
use crate::error::{CodecError, SanityCheckFailure};
use crate::header::{self, PayloadHeader, HEADER_LEN, PAYLOAD_MAGIC, STUB_KEY_LEN};
use ember_bytecode::{CodeStub, FunctionDescriptor, SharedFunction, StubKey};
use ember_common::{EngineFlags, Fingerprint};
use std::sync::Arc;

/// Bounds applied while rebuilding a function tree from a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconstructionLimits {
    /// Largest function tree a payload may reserve.
    pub max_functions: u32,
}

impl Default for ReconstructionLimits {
    fn default() -> Self {
        Self {
            max_functions: 65536,
        }
    }
}

/// Serializes compiled functions into payloads and rebuilds them.
///
/// A payload is only meaningful to the codec that produced it. Decoding is
/// split in two: [`inspect`](ArtifactCodec::inspect) runs the sanity check
/// and reports which objects must be attached, and
/// [`reconstruct`](ArtifactCodec::reconstruct) rebuilds the function from
/// the payload and those objects, supplied in the reported order.
pub trait ArtifactCodec {
    /// Serializes a compiled top-level function produced under `flags`.
    fn serialize(
        &self,
        function: &SharedFunction,
        flags: EngineFlags,
    ) -> Result<CompiledArtifact, CodecError>;

    /// Runs the sanity check on `payload` and returns its attachment
    /// descriptors in order. The recorded source hash is compared only when
    /// `expected_source` is given.
    fn inspect(
        &self,
        payload: &[u8],
        expected_source: Option<Fingerprint>,
        flags: EngineFlags,
    ) -> Result<Vec<AttachmentDescriptor>, CodecError>;

    /// Rebuilds the function tree of an inspected payload.
    fn reconstruct(
        &self,
        payload: &[u8],
        attachments: &[AttachedObject],
        limits: &ReconstructionLimits,
    ) -> Result<FunctionDescriptor, CodecError>;
}

/// The default codec: a fixed header, the stub key list, and a
/// bincode-encoded function tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

struct Sections<'a> {
    key_bytes: &'a [u8],
    stub_keys: Vec<StubKey>,
    body: &'a [u8],
}

/// Splits a payload whose total length matches its header.
fn split(payload: &[u8]) -> Result<Sections<'_>, CodecError> {
    let header = PayloadHeader::from_bytes(payload)?;
    if header.expected_payload_len() != Some(payload.len()) {
        return Err(SanityCheckFailure::Length.into());
    }
    let keys_len = payload.len() - HEADER_LEN - header.body_len as usize;
    let (key_bytes, body) = payload[HEADER_LEN..].split_at(keys_len);
    let stub_keys = key_bytes
        .chunks_exact(STUB_KEY_LEN)
        .map(|c| StubKey::from_raw(u32::from_le_bytes([c[0], c[1], c[2], c[3]])))
        .collect();
    Ok(Sections {
        key_bytes,
        stub_keys,
        body,
    })
}

impl ArtifactCodec for BincodeCodec {
    fn serialize(
        &self,
        function: &SharedFunction,
        flags: EngineFlags,
    ) -> Result<CompiledArtifact, CodecError> {
        let function_count =
            u32::try_from(function.function_count()).map_err(|_| CodecError::Serialization {
                reason: "function tree too large".to_string(),
            })?;
        let body = PayloadBody {
            function_count,
            top: FunctionRecord::from_function(function)?,
        };
        let body_bytes = bincode::serde::encode_to_vec(&body, bincode::config::standard())
            .map_err(|e| CodecError::Serialization {
                reason: e.to_string(),
            })?;

        let keys: Vec<StubKey> = function.stubs.iter().map(|stub| stub.key()).collect();
        let key_bytes: Vec<u8> = keys
            .iter()
            .flat_map(|key| key.as_raw().to_le_bytes())
            .collect();

        let too_large = |what: &str| CodecError::Serialization {
            reason: format!("{what} exceeds the payload limit"),
        };
        let header = PayloadHeader {
            magic: PAYLOAD_MAGIC,
            version_hash: header::version_hash(),
            source_hash: Fingerprint::of_source(&function.script.source).as_raw(),
            flags_hash: flags.hash(),
            num_stub_keys: u32::try_from(keys.len()).map_err(|_| too_large("stub list"))?,
            body_len: u32::try_from(body_bytes.len()).map_err(|_| too_large("body"))?,
            checksum: header::checksum(&key_bytes, &body_bytes),
        };

        let mut payload = Vec::with_capacity(HEADER_LEN + key_bytes.len() + body_bytes.len());
        payload.extend_from_slice(&header.to_bytes());
        payload.extend_from_slice(&key_bytes);
        payload.extend_from_slice(&body_bytes);

        let mut attachments = Vec::with_capacity(keys.len() + 1);
        attachments.push(AttachmentDescriptor::Source);
        attachments.extend(keys.into_iter().map(AttachmentDescriptor::CodeStub));

        tracing::debug!(
            payload_len = payload.len(),
            functions = function_count,
            attachments = attachments.len(),
            "serialized artifact"
        );
        Ok(CompiledArtifact {
            payload,
            attachments,
        })
    }

    fn inspect(
        &self,
        payload: &[u8],
        expected_source: Option<Fingerprint>,
        flags: EngineFlags,
    ) -> Result<Vec<AttachmentDescriptor>, CodecError> {
        let header = PayloadHeader::from_bytes(payload)?;
        if header.magic != PAYLOAD_MAGIC {
            return Err(SanityCheckFailure::Magic.into());
        }
        if header.version_hash != header::version_hash() {
            return Err(SanityCheckFailure::Version.into());
        }
        if let Some(expected) = expected_source {
            if header.source_hash != expected.as_raw() {
                return Err(SanityCheckFailure::Source.into());
            }
        }
        if header.flags_hash != flags.hash() {
            return Err(SanityCheckFailure::Flags.into());
        }
        let sections = split(payload)?;
        if header::checksum(sections.key_bytes, sections.body) != header.checksum {
            return Err(SanityCheckFailure::Checksum.into());
        }

        let mut descriptors = Vec::with_capacity(sections.stub_keys.len() + 1);
        descriptors.push(AttachmentDescriptor::Source);
        descriptors.extend(
            sections
                .stub_keys
                .into_iter()
                .map(AttachmentDescriptor::CodeStub),
        );
        Ok(descriptors)
    }

    fn reconstruct(
        &self,
        payload: &[u8],
        attachments: &[AttachedObject],
        limits: &ReconstructionLimits,
    ) -> Result<FunctionDescriptor, CodecError> {
        let sections = split(payload)?;
        let expected = sections.stub_keys.len() + 1;
        if attachments.len() != expected {
            return Err(CodecError::reconstruction(format!(
                "expected {expected} attached objects, got {}",
                attachments.len()
            )));
        }

        let Some(AttachedObject::Source(script)) = attachments.first() else {
            return Err(CodecError::reconstruction(
                "attachment 0 must be the source object",
            ));
        };
        let mut stubs: Vec<Arc<CodeStub>> = Vec::with_capacity(sections.stub_keys.len());
        for (slot, (object, key)) in attachments[1..]
            .iter()
            .zip(&sections.stub_keys)
            .enumerate()
        {
            match object {
                AttachedObject::CodeStub(stub) if stub.key() == *key => stubs.push(stub.clone()),
                other => {
                    return Err(CodecError::reconstruction(format!(
                        "attachment {} is {}, expected stub {key}",
                        slot + 1,
                        other.descriptor()
                    )))
                }
            }
        }

        let (body, read) = bincode::serde::decode_from_slice::<PayloadBody, _>(
            sections.body,
            bincode::config::standard(),
        )
        .map_err(|e| CodecError::reconstruction(format!("malformed body: {e}")))?;
        if read != sections.body.len() {
            return Err(CodecError::reconstruction("trailing bytes after body"));
        }
        if body.function_count > limits.max_functions {
            return Err(CodecError::reconstruction(format!(
                "payload reserves {} functions, limit is {}",
                body.function_count, limits.max_functions
            )));
        }

        let stubs: Arc<[Arc<CodeStub>]> = Arc::from(stubs);
        let mut rebuild = Rebuild {
            script,
            stubs: &stubs,
            remaining: body.function_count,
        };
        let function = rebuild.function(body.top)?;
        if rebuild.remaining != 0 {
            return Err(CodecError::reconstruction(format!(
                "payload reserves {} functions but holds {}",
                body.function_count,
                body.function_count - rebuild.remaining
            )));
        }
        Ok(function)
    }
}
