//! The ember script engine and its precompiled-artifact path.
//!
//! A script travels through the engine in five steps:
//!
//! 1. [`Engine::compile`] turns source into a [`Fingerprint`](ember_common::Fingerprint)
//!    and a [`CompiledArtifact`].
//! 2. [`Engine::encode`] packs both into container bytes.
//! 3. [`Engine::decode`] rebuilds a function from container bytes and a
//!    fingerprint supplied by the caller.
//! 4. [`Engine::register`] puts the function into the compilation cache
//!    under a key of the caller's choosing, usually the empty placeholder.
//! 5. [`Engine::run`] executes it in the current context.
//!
//! [`host::compile_script`] and [`host::run_script`] drive the whole path
//! the way a host binding does.

#![warn(missing_docs)]

mod artifact;
pub mod engine;
pub mod error;
mod frontend;
mod harness;
pub mod host;
pub mod lifecycle;
mod registrar;

pub use engine::Engine;
pub use error::EngineError;
pub use host::{compile_script, run_script, HostError, HostValue};
pub use lifecycle::{ArtifactLifecycle, FailureKind, LifecycleState};

pub use ember_cache::ContextId;
pub use ember_codec::{CachedData, CompiledArtifact};
pub use ember_config::EngineConfig;
pub use ember_vm::Value;
