//! The engine's compilation cache.
//!
//! Maps a script's source key, the context it runs in, and its language mode
//! to the compiled top-level function. The table is owned by one engine; it
//! is never a process global.

#![warn(missing_docs)]

pub mod key;
pub mod table;

pub use key::{CacheKey, ContextId};
pub use table::CompilationCache;
