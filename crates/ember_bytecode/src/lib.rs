//! The in-memory compiled form of Ember scripts.
//!
//! This crate defines the bytecode [`Instr`] set and [`Constant`] pool
//! entries, the [`SharedFunction`] that carries one compiled function, the
//! [`Script`] source object a compiled tree points back to, and the shared
//! runtime [`CodeStub`]s that bytecode reaches through the script's stub
//! table. It is produced by the compiler, rebuilt by the artifact decoder,
//! and consumed by the interpreter.

#![warn(missing_docs)]

pub mod function;
pub mod instr;
pub mod stub;

pub use function::{FunctionDescriptor, Script, SharedFunction};
pub use instr::{Constant, Instr};
pub use stub::{BinaryKind, CodeStub, StubCache, StubKey, UnaryKind};
