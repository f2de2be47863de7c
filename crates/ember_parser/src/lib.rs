//! Hand-rolled recursive descent parser for Ember scripts.
//!
//! The main entry point is [`parse_script`], which lexes and parses source
//! text into a [`Program`]. Errors are reported to the diagnostic sink and
//! represented as `Error` nodes so that a single pass surfaces every problem.
//!
//! # Architecture
//!
//! - **Lexer** ([`lexer`]): source text to tokens, comments and string escapes.
//! - **Parser** ([`parser`]): statements by recursive descent, expressions by
//!   Pratt parsing, with semicolons optional at statement ends.
//! - **AST** ([`ast`]): node types with spans and serde support.

#![warn(missing_docs)]

/// AST node types for Ember scripts.
pub mod ast;
mod expr;
/// Lexical analyzer for Ember source text.
pub mod lexer;
/// Recursive descent parser with error recovery.
pub mod parser;
mod stmt;
/// Token types for the lexer.
pub mod token;

pub use ast::Program;
pub use token::{Token, TokenKind};

use ember_common::Interner;
use ember_diagnostics::DiagnosticSink;

/// Parses script source text into a [`Program`].
pub fn parse_script(source: &str, interner: &Interner, sink: &DiagnosticSink) -> Program {
    let tokens = lexer::lex(source, sink);
    let mut parser = parser::ScriptParser::new(tokens, source, interner, sink);
    parser.parse_program()
}
