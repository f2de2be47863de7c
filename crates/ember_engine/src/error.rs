//! Engine-level error type.

use ember_cache::ContextId;
use ember_codec::CodecError;
use ember_common::InternalError;
use ember_config::ConfigError;
use ember_diagnostics::Diagnostic;
use ember_vm::RuntimeError;

/// Errors surfaced by [`Engine`](crate::Engine) operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The engine configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The source is not a valid script.
    #[error("compile error: {message}")]
    Compile {
        /// The first error reported.
        message: String,
        /// Every diagnostic reported, errors and warnings.
        diagnostics: Vec<Diagnostic>,
    },

    /// An artifact failed its sanity check or could not be reconstructed.
    /// The codec error is available through `source()`.
    #[error("could not load cached artifact")]
    Load(#[source] CodecError),

    /// Cached data offered for a compile request was rejected.
    #[error("cache rejected")]
    CacheRejected,

    /// The script threw.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// No context with this id exists.
    #[error("unknown context {0}")]
    UnknownContext(ContextId),

    /// An engine bug.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl EngineError {
    pub(crate) fn compile(diagnostics: Vec<Diagnostic>) -> Self {
        let message = diagnostics
            .iter()
            .find(|d| d.severity.rejects_script())
            .map_or_else(|| "compilation failed".to_string(), |d| d.message.clone());
        EngineError::Compile {
            message,
            diagnostics,
        }
    }

    /// Returns the codec error behind a [`Load`](EngineError::Load) failure.
    pub fn codec_error(&self) -> Option<&CodecError> {
        match self {
            EngineError::Load(err) => Some(err),
            _ => None,
        }
    }
}
