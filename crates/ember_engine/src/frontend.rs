//! Source to artifact compilation.

use crate::engine::Engine;
use crate::error::EngineError;
use ember_bytecode::{FunctionDescriptor, Script};
use ember_codec::CompiledArtifact;
use ember_common::{Fingerprint, InternalError};
use ember_diagnostics::DiagnosticSink;
use std::sync::Arc;

impl Engine {
    /// Compiles `source` into an artifact and the fingerprint of `source`.
    ///
    /// Every function reachable from the top level is compiled to bytecode;
    /// the artifact carries no source text to compile anything later.
    pub fn compile(&mut self, source: &str) -> Result<(Fingerprint, CompiledArtifact), EngineError> {
        let function = self.compile_function(source)?;
        let artifact = self
            .codec
            .serialize(&function, self.flags)
            .map_err(|err| InternalError::new(format!("artifact serialization failed: {err}")))?;
        let fingerprint = Fingerprint::of_source(source);
        tracing::debug!(
            %fingerprint,
            functions = function.function_count(),
            payload_len = artifact.payload.len(),
            attachments = artifact.attachments.len(),
            "compiled artifact"
        );
        Ok((fingerprint, artifact))
    }

    /// Compiles `source` to a function without producing an artifact.
    pub fn compile_function(&mut self, source: &str) -> Result<FunctionDescriptor, EngineError> {
        let sink = DiagnosticSink::new();
        let program = ember_parser::parse_script(source, &self.interner, &sink);
        let function = ember_compiler::compile_program(
            &program,
            Arc::new(Script::new(source)),
            self.flags.language_mode,
            &self.interner,
            &mut self.stubs,
            &sink,
        )?;
        if sink.has_errors() {
            let err = EngineError::compile(sink.take_all());
            tracing::debug!(error = %err, "compilation failed");
            return Err(err);
        }
        Ok(function)
    }
}
