//! Encoding artifacts into containers and decoding them back.

use crate::engine::Engine;
use crate::error::EngineError;
use ember_bytecode::FunctionDescriptor;
use ember_codec::{container, CachedData, CompiledArtifact};
use ember_common::Fingerprint;

impl Engine {
    /// Packs `artifact` behind `fingerprint` into container bytes.
    pub fn encode(&self, fingerprint: Fingerprint, artifact: &CompiledArtifact) -> Vec<u8> {
        container::encode(fingerprint, artifact)
    }

    /// Decodes container bytes into a runnable function.
    ///
    /// The fingerprint stored in `bytes` is ignored; `caller_fingerprint` is
    /// what the payload's source hash is compared with, and only under the
    /// enforced fingerprint policy.
    pub fn decode(
        &mut self,
        bytes: &[u8],
        caller_fingerprint: Fingerprint,
    ) -> Result<FunctionDescriptor, EngineError> {
        self.decode_cached(&CachedData::new(bytes.to_vec()), caller_fingerprint)
    }

    /// Like [`decode`](Engine::decode), marking `data` rejected when its
    /// sanity check fails.
    pub fn decode_cached(
        &mut self,
        data: &CachedData,
        caller_fingerprint: Fingerprint,
    ) -> Result<FunctionDescriptor, EngineError> {
        let options = self.decode_options(self.config.artifact.fingerprint_policy);
        ember_codec::decode(
            self.codec.as_ref(),
            data,
            caller_fingerprint,
            &mut self.stubs,
            &options,
        )
        .map_err(EngineError::Load)
    }
}
