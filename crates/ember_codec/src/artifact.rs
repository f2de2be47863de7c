//! The compiled artifact and the objects re-attached when decoding it.

use ember_bytecode::{CodeStub, Script, StubKey};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::sync::Arc;

/// Describes one object that a payload refers to by position instead of
/// embedding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttachmentDescriptor {
    /// The source object of the script. Always the first attachment.
    Source,
    /// A shared code stub, identified by its stable key.
    CodeStub(StubKey),
}

impl fmt::Display for AttachmentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachmentDescriptor::Source => write!(f, "source"),
            AttachmentDescriptor::CodeStub(key) => write!(f, "stub {key}"),
        }
    }
}

/// An object supplied to reconstruction for one attachment slot.
#[derive(Debug, Clone)]
pub enum AttachedObject {
    /// The source object the rebuilt functions will point at.
    Source(Arc<Script>),
    /// A code stub from the decoding engine's stub cache.
    CodeStub(Arc<CodeStub>),
}

impl AttachedObject {
    /// Returns the descriptor this object satisfies.
    pub fn descriptor(&self) -> AttachmentDescriptor {
        match self {
            AttachedObject::Source(_) => AttachmentDescriptor::Source,
            AttachedObject::CodeStub(stub) => AttachmentDescriptor::CodeStub(stub.key()),
        }
    }
}

/// The serialized form of a compiled script.
///
/// `payload` is private to the codec that produced it. `attachments` lists,
/// in order, the objects a decoder must supply again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledArtifact {
    /// Opaque payload bytes.
    pub payload: Vec<u8>,
    /// Attachment descriptors: `Source` first, then stubs in first-use order.
    pub attachments: Vec<AttachmentDescriptor>,
}

/// Container bytes handed to a decoder, with a flag recording whether the
/// decoder rejected them.
#[derive(Debug, Default)]
pub struct CachedData {
    bytes: Vec<u8>,
    rejected: Cell<bool>,
}

impl CachedData {
    /// Wraps container bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            rejected: Cell::new(false),
        }
    }

    /// Returns the container bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns true if a decoder rejected these bytes.
    pub fn rejected(&self) -> bool {
        self.rejected.get()
    }

    /// Marks these bytes as rejected.
    pub fn reject(&self) {
        self.rejected.set(true);
    }
}
