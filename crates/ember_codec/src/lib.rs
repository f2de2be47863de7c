//! Encoding compiled scripts as portable artifacts and decoding them again.
//!
//! An artifact travels as a container, a native-endian `u32` fingerprint
//! followed by an opaque payload. The payload is written and read by an
//! [`ArtifactCodec`]; the default [`BincodeCodec`] guards it with a header
//! carrying magic, version, source, flags, length and checksum fields.
//!
//! Objects that belong to the decoding engine rather than the artifact (the
//! script's source object and the shared code stubs) are not embedded.
//! The payload records them as ordered [`AttachmentDescriptor`]s and the
//! decoder supplies matching [`AttachedObject`]s in that exact order.
//!
//! The fingerprint used for the source check comes from the caller, never
//! from the container, and is only compared at all under
//! [`FingerprintPolicy::Enforced`](ember_common::FingerprintPolicy).

#![warn(missing_docs)]

pub mod artifact;
mod body;
pub mod codec;
pub mod container;
pub mod decode;
pub mod error;
pub mod header;

pub use artifact::{AttachedObject, AttachmentDescriptor, CachedData, CompiledArtifact};
pub use codec::{ArtifactCodec, BincodeCodec, ReconstructionLimits};
pub use decode::{decode, resolve_attachments, DecodeOptions};
pub use error::{CodecError, SanityCheckFailure};
