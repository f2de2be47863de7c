//! Runtime error types.

use crate::value::Value;

/// Errors that end the execution of a script.
///
/// The language has no `try`, so every exception is uncaught; the variants
/// mirror the exception kinds a script can raise.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RuntimeError {
    /// Read of, or strict-mode assignment to, an undeclared variable.
    #[error("ReferenceError: {name} is not defined")]
    ReferenceError {
        /// The undeclared name.
        name: String,
    },

    /// An operation applied to a value of the wrong kind.
    #[error("TypeError: {message}")]
    TypeError {
        /// What went wrong.
        message: String,
    },

    /// The call depth limit was reached.
    #[error("RangeError: Maximum call stack size exceeded (limit {limit})")]
    StackOverflow {
        /// The configured depth limit.
        limit: usize,
    },

    /// A value thrown by `throw`.
    #[error("Uncaught {0}")]
    Uncaught(Value),

    /// The bytecode referenced something that does not exist.
    #[error("invalid bytecode: {reason}")]
    InvalidBytecode {
        /// Description of the inconsistency.
        reason: String,
    },
}

impl RuntimeError {
    pub(crate) fn type_error(message: impl Into<String>) -> Self {
        RuntimeError::TypeError {
            message: message.into(),
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        RuntimeError::InvalidBytecode {
            reason: reason.into(),
        }
    }
}
