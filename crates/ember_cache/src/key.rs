//! Compilation cache keys.

use ember_common::LanguageMode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Opaque identifier of an execution context within one engine.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct ContextId(u32);

impl ContextId {
    /// Creates an ID from a raw `u32` index.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw `u32` index.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx#{}", self.0)
    }
}

/// Identifies one compilation cache entry.
///
/// `source` is the text a compile request is made with. For a function
/// registered from an artifact it is whatever placeholder the registrar was
/// given, usually the empty string.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct CacheKey {
    /// The source text, or a placeholder standing in for it.
    pub source: Arc<str>,
    /// The context the script belongs to.
    pub context: ContextId,
    /// The language mode it was compiled in.
    pub language_mode: LanguageMode,
}

impl CacheKey {
    /// Creates a key.
    pub fn new(source: impl Into<Arc<str>>, context: ContextId, language_mode: LanguageMode) -> Self {
        Self {
            source: source.into(),
            context,
            language_mode,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const PREVIEW: usize = 24;
        let preview: String = self.source.chars().take(PREVIEW).collect();
        let ellipsis = if self.source.chars().count() > PREVIEW { "..." } else { "" };
        write!(
            f,
            "{:?}{ellipsis} in {} ({})",
            preview, self.context, self.language_mode
        )
    }
}
