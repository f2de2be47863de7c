//! The lifecycle of one artifact through the engine.
//!
//! ```text
//! Created -> Encoded -> [externalized] -> Decoded -> Registered -> Executed
//!     \__________\_________________________\___________\________-> Failed(kind)
//! ```
//!
//! No step is retried: a failed artifact stays failed.

use crate::error::EngineError;
use ember_common::InternalError;
use std::fmt;

/// Why an artifact's lifecycle ended in failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The source did not compile.
    Compile,
    /// The payload failed its sanity check.
    Integrity,
    /// The payload could not be rebuilt into a function.
    Reconstruction,
    /// The cache refused the cached data.
    CacheRejected,
    /// The script threw.
    Runtime,
    /// Anything else.
    Other,
}

impl FailureKind {
    /// Classifies an engine error.
    pub fn of(err: &EngineError) -> Self {
        match err {
            EngineError::Compile { .. } => FailureKind::Compile,
            EngineError::Load(codec) if codec.is_integrity() => FailureKind::Integrity,
            EngineError::Load(_) => FailureKind::Reconstruction,
            EngineError::CacheRejected => FailureKind::CacheRejected,
            EngineError::Runtime(_) => FailureKind::Runtime,
            EngineError::Config(_) | EngineError::UnknownContext(_) | EngineError::Internal(_) => {
                FailureKind::Other
            }
        }
    }
}

/// A lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Started from source, not yet packed.
    Created,
    /// Packed into container bytes.
    Encoded,
    /// Rebuilt into a function.
    Decoded,
    /// Inserted into the compilation cache.
    Registered,
    /// Ran to completion.
    Executed,
    /// Stopped by an error.
    Failed(FailureKind),
}

impl LifecycleState {
    /// Returns true for `Executed` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, LifecycleState::Executed | LifecycleState::Failed(_))
    }

    fn successor(self) -> Option<LifecycleState> {
        match self {
            LifecycleState::Created => Some(LifecycleState::Encoded),
            LifecycleState::Encoded => Some(LifecycleState::Decoded),
            LifecycleState::Decoded => Some(LifecycleState::Registered),
            LifecycleState::Registered => Some(LifecycleState::Executed),
            LifecycleState::Executed | LifecycleState::Failed(_) => None,
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Created => f.write_str("created"),
            LifecycleState::Encoded => f.write_str("encoded"),
            LifecycleState::Decoded => f.write_str("decoded"),
            LifecycleState::Registered => f.write_str("registered"),
            LifecycleState::Executed => f.write_str("executed"),
            LifecycleState::Failed(kind) => write!(f, "failed({kind:?})"),
        }
    }
}

/// Tracks one artifact and rejects out-of-order transitions.
#[derive(Debug, Clone)]
pub struct ArtifactLifecycle {
    state: LifecycleState,
}

impl Default for ArtifactLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactLifecycle {
    /// Starts a lifecycle for a freshly compiled artifact.
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Created,
        }
    }

    /// Starts a lifecycle for container bytes received from outside.
    pub fn externalized() -> Self {
        Self {
            state: LifecycleState::Encoded,
        }
    }

    /// The current state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Moves to `next`, which must be the successor of the current state.
    pub fn advance(&mut self, next: LifecycleState) -> Result<(), InternalError> {
        if self.state.successor() != Some(next) {
            return Err(InternalError::new(format!(
                "invalid artifact transition {} -> {}",
                self.state, next
            )));
        }
        tracing::debug!(from = %self.state, to = %next, "artifact lifecycle");
        self.state = next;
        Ok(())
    }

    /// Records `err` as the end of the lifecycle and hands it back.
    ///
    /// A lifecycle that is already terminal keeps its state.
    pub fn fail(&mut self, err: EngineError) -> EngineError {
        if !self.state.is_terminal() {
            let next = LifecycleState::Failed(FailureKind::of(&err));
            tracing::debug!(from = %self.state, to = %next, error = %err, "artifact lifecycle");
            self.state = next;
        }
        err
    }
}
