//! Error types for artifact encoding and decoding.

/// The specific check a payload failed during its sanity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SanityCheckFailure {
    /// The bytes end before the fixed header or fingerprint does.
    #[error("payload is truncated")]
    Truncated,
    /// The payload does not start with the artifact magic number.
    #[error("magic number mismatch")]
    Magic,
    /// The payload was produced by a different engine build.
    #[error("engine version mismatch")]
    Version,
    /// The caller's fingerprint differs from the recorded source hash.
    #[error("source fingerprint mismatch")]
    Source,
    /// The payload was produced under different engine flags.
    #[error("engine flags mismatch")]
    Flags,
    /// The recorded lengths do not add up to the payload size.
    #[error("payload length mismatch")]
    Length,
    /// The payload content does not match its checksum.
    #[error("checksum mismatch")]
    Checksum,
}

/// Errors that can occur while encoding or decoding artifacts.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The bytes failed structural validation. The cached data should be
    /// treated as rejected.
    #[error("sanity check failed: {0}")]
    Integrity(SanityCheckFailure),

    /// The payload passed its sanity check but no valid function could be
    /// rebuilt from it with the supplied attachments.
    #[error("reconstruction failed: {reason}")]
    Reconstruction {
        /// Description of what did not match.
        reason: String,
    },

    /// The compiled function could not be written as a payload.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },
}

impl CodecError {
    pub(crate) fn reconstruction(reason: impl Into<String>) -> Self {
        CodecError::Reconstruction {
            reason: reason.into(),
        }
    }

    /// Returns true for sanity-check failures.
    pub fn is_integrity(&self) -> bool {
        matches!(self, CodecError::Integrity(_))
    }
}

impl From<SanityCheckFailure> for CodecError {
    fn from(failure: SanityCheckFailure) -> Self {
        CodecError::Integrity(failure)
    }
}
