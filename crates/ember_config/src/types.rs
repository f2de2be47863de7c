//! Configuration types deserialized from `ember.toml`.

use ember_common::{EngineFlags, FingerprintPolicy, LanguageMode};
use serde::Deserialize;

/// Top-level engine configuration. Every section and field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Code generation and execution settings.
    #[serde(default)]
    pub engine: EngineSection,
    /// Compilation cache settings.
    #[serde(default)]
    pub cache: CacheSection,
    /// Artifact encode/decode settings.
    #[serde(default)]
    pub artifact: ArtifactSection,
}

impl EngineConfig {
    /// Returns the engine flags that are frozen into an engine at creation.
    pub fn flags(&self) -> EngineFlags {
        EngineFlags {
            language_mode: self.engine.language_mode,
            lazy_compilation: self.engine.lazy_compilation,
        }
    }
}

/// The `[engine]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSection {
    /// Language mode for every compiled script.
    #[serde(default)]
    pub language_mode: LanguageMode,
    /// Leave inner functions uncompiled until first call. Must be `false`.
    #[serde(default)]
    pub lazy_compilation: bool,
    /// Maximum interpreter call depth before a stack overflow error.
    #[serde(default = "default_max_call_depth")]
    pub max_call_depth: usize,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            language_mode: LanguageMode::default(),
            lazy_compilation: false,
            max_call_depth: default_max_call_depth(),
        }
    }
}

/// The `[cache]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheSection {
    /// Whether the compilation cache stores and serves entries.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Number of generations an unused entry survives before eviction.
    #[serde(default = "default_generations")]
    pub generations: usize,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            enabled: true,
            generations: default_generations(),
        }
    }
}

/// The `[artifact]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArtifactSection {
    /// How decoders treat caller-supplied fingerprints.
    #[serde(default)]
    pub fingerprint_policy: FingerprintPolicy,
    /// Source key that decoded functions are registered under.
    #[serde(default)]
    pub placeholder_key: String,
    /// Upper bound on the number of functions a payload may reconstruct.
    #[serde(default = "default_max_functions")]
    pub max_functions: usize,
}

impl Default for ArtifactSection {
    fn default() -> Self {
        Self {
            fingerprint_policy: FingerprintPolicy::default(),
            placeholder_key: String::new(),
            max_functions: default_max_functions(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_call_depth() -> usize {
    1024
}

fn default_generations() -> usize {
    4
}

fn default_max_functions() -> usize {
    65_536
}
