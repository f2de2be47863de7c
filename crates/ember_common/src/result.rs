//! Common result and error types for the Ember engine.

/// The result type for fallible internal operations.
///
/// `Err` means a bug in Ember, not a problem with user input. User errors
/// are reported as diagnostics or as the error enums of the individual crates.
pub type EmberResult<T> = Result<T, InternalError>;

/// An internal engine error indicating a logic bug.
#[derive(Debug, thiserror::Error)]
#[error("internal engine error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let err = InternalError::new("stack imbalance");
        assert_eq!(format!("{err}"), "internal engine error: stack imbalance");
    }

    #[test]
    fn from_string() {
        let err: InternalError = "from string".to_string().into();
        assert_eq!(err.message, "from string");
    }
}
