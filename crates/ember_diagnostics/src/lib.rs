//! Diagnostic creation, accumulation, and rendering for script compilation.
//!
//! The lexer, parser, and bytecode compiler report user-facing problems as
//! structured [`Diagnostic`]s into a [`DiagnosticSink`]. A failed compilation
//! renders them with a [`DiagnosticRenderer`] into the message carried by the
//! engine's compile error.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, JsonRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
