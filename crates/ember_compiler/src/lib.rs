//! AST-to-bytecode compiler for Ember scripts.
//!
//! Lowers a parsed [`Program`] into a tree of [`SharedFunction`]s. Every
//! function reachable from the top level is compiled up front; there is no
//! lazy path, since a decoded artifact has no source text left to compile
//! from. Operators and calls are emitted as stub invocations, and the stubs a
//! script uses form one table in first-use order shared by the whole tree.
//!
//! User-facing errors are emitted to the [`DiagnosticSink`]; only internal
//! bugs return `Err`.
//!
//! [`SharedFunction`]: ember_bytecode::SharedFunction

#![warn(missing_docs)]

mod builder;
pub mod context;
pub mod errors;
mod expr;
mod stmt;

use context::CompileContext;
use ember_bytecode::{CodeStub, FunctionDescriptor, Instr, Script, StubCache};
use ember_common::{EmberResult, Interner, InternalError, LanguageMode};
use ember_diagnostics::DiagnosticSink;
use ember_parser::Program;
use std::sync::Arc;

/// Compiles a parsed script into its top-level function.
///
/// The result is meaningful only if `sink` holds no errors afterwards.
pub fn compile_program(
    program: &Program,
    script: Arc<Script>,
    mode: LanguageMode,
    interner: &Interner,
    stubs: &mut StubCache,
    sink: &DiagnosticSink,
) -> EmberResult<FunctionDescriptor> {
    let mut ctx = CompileContext::new(interner, sink, mode);
    stmt::compile_block(&mut ctx, &program.body);
    ctx.emit(Instr::LoadCompletion);
    ctx.emit(Instr::Return);

    if ctx.functions.len() != 1 {
        return Err(InternalError::new(format!(
            "function stack holds {} entries after compiling the script",
            ctx.functions.len()
        )));
    }
    let table: Arc<[Arc<CodeStub>]> = ctx
        .stub_table
        .iter()
        .map(|stub| stubs.get_or_create(*stub))
        .collect();
    let Some(top) = ctx.functions.pop() else {
        return Err(InternalError::new("missing script function"));
    };
    let function = top.finish(mode, &script, &table);
    tracing::debug!(
        functions = function.function_count(),
        stubs = table.len(),
        %mode,
        "compiled script"
    );
    Ok(function)
}
