//! Engine-wide modes and the frozen engine flags that shape generated code.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The language mode a script is compiled in.
///
/// Strict mode turns assignment to an undeclared variable into a
/// `ReferenceError`; sloppy mode creates a global instead. The mode is part
/// of every compilation cache key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageMode {
    /// Permissive legacy semantics.
    #[default]
    Sloppy,
    /// Strict semantics.
    Strict,
}

impl LanguageMode {
    /// Returns `true` for [`LanguageMode::Strict`].
    pub fn is_strict(self) -> bool {
        self == LanguageMode::Strict
    }
}

impl fmt::Display for LanguageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LanguageMode::Sloppy => write!(f, "sloppy"),
            LanguageMode::Strict => write!(f, "strict"),
        }
    }
}

/// How a decoder treats the fingerprint supplied by its caller.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintPolicy {
    /// The caller's fingerprint is not compared with the artifact. Any
    /// fingerprint loads any structurally valid artifact, which is what lets
    /// precompiled code be registered under a placeholder source key.
    #[default]
    Permissive,
    /// The caller's fingerprint must equal the source hash recorded in the
    /// artifact payload.
    Enforced,
}

impl fmt::Display for FingerprintPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FingerprintPolicy::Permissive => write!(f, "permissive"),
            FingerprintPolicy::Enforced => write!(f, "enforced"),
        }
    }
}

/// Engine flags fixed once when an engine is created.
///
/// Anything that changes the shape of generated bytecode lives here; the
/// hash of these flags is embedded in every artifact so that an artifact
/// produced under different flags fails its sanity check.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct EngineFlags {
    /// Language mode for every script compiled by the engine.
    pub language_mode: LanguageMode,
    /// Whether inner functions may be left uncompiled. Always `false` for
    /// engines that produce or consume artifacts.
    pub lazy_compilation: bool,
}

impl EngineFlags {
    /// Hashes the flags into the value embedded in artifact headers.
    pub fn hash(&self) -> u32 {
        let bytes = [
            match self.language_mode {
                LanguageMode::Sloppy => 0u8,
                LanguageMode::Strict => 1u8,
            },
            u8::from(self.lazy_compilation),
        ];
        xxhash_rust::xxh32::xxh32(&bytes, 0)
    }
}
