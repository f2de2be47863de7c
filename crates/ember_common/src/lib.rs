//! Shared foundational types used across the Ember script engine.
//!
//! This crate provides source fingerprints, interned identifiers, source spans,
//! engine-wide mode flags, and the internal error type shared by every stage
//! from parsing through artifact decoding and execution.

#![warn(missing_docs)]

pub mod fingerprint;
pub mod ident;
pub mod mode;
pub mod result;
pub mod span;

pub use fingerprint::Fingerprint;
pub use ident::{Ident, Interner};
pub use mode::{EngineFlags, FingerprintPolicy, LanguageMode};
pub use result::{EmberResult, InternalError};
pub use span::Span;
