//! Mutable compilation state shared by statement and expression lowering.
//!
//! [`CompileContext`] holds the stack of functions being built (the script
//! at the bottom), the script-wide stub table in first-use order, and the
//! names the script declares with `let`/`const`.

use crate::builder::{FunctionBuilder, Local};
use crate::errors;
use ember_bytecode::{CodeStub, Constant, Instr, StubKey};
use ember_common::{Ident, Interner, LanguageMode, Span};
use ember_diagnostics::DiagnosticSink;
use std::collections::{HashMap, HashSet};

/// How an identifier resolves at a use site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resolved {
    /// A slot of the current function.
    Local(Local),
    /// A local of an enclosing function, which nested functions cannot see.
    Captured,
    /// A global of the running context.
    Global,
}

/// Mutable state carried through lowering.
pub struct CompileContext<'a> {
    pub(crate) interner: &'a Interner,
    pub(crate) sink: &'a DiagnosticSink,
    pub(crate) mode: LanguageMode,
    pub(crate) functions: Vec<FunctionBuilder>,
    pub(crate) stub_table: Vec<CodeStub>,
    stub_slots: HashMap<StubKey, u16>,
    lexical_globals: HashSet<Ident>,
}

impl<'a> CompileContext<'a> {
    /// Creates a context positioned at the top level of a new script.
    pub fn new(interner: &'a Interner, sink: &'a DiagnosticSink, mode: LanguageMode) -> Self {
        Self {
            interner,
            sink,
            mode,
            functions: vec![FunctionBuilder::script()],
            stub_table: Vec::new(),
            stub_slots: HashMap::new(),
            lexical_globals: HashSet::new(),
        }
    }

    pub(crate) fn current(&mut self) -> &mut FunctionBuilder {
        let last = self.functions.len() - 1;
        &mut self.functions[last]
    }

    pub(crate) fn in_script(&self) -> bool {
        self.functions.len() == 1
    }

    pub(crate) fn emit(&mut self, instr: Instr) -> usize {
        self.current().emit(instr)
    }

    pub(crate) fn name(&self, ident: Ident) -> &'a str {
        self.interner.resolve(ident)
    }

    /// Program counter of the next instruction, as a jump operand.
    pub(crate) fn label(&mut self, span: Span) -> u32 {
        let pc = self.current().next_pc();
        match u32::try_from(pc) {
            Ok(pc) => pc,
            Err(_) => {
                self.sink
                    .emit(errors::error_limit("instructions", u32::MAX as usize, span));
                0
            }
        }
    }

    pub(crate) fn patch_to_here(&mut self, at: usize, span: Span) {
        let target = self.label(span);
        self.current().patch_jump(at, target);
    }

    pub(crate) fn constant(&mut self, constant: Constant, span: Span) -> u32 {
        let index = self.current().constant_index(constant);
        match u32::try_from(index) {
            Ok(index) => index,
            Err(_) => {
                self.sink
                    .emit(errors::error_limit("constants", u32::MAX as usize, span));
                0
            }
        }
    }

    /// Constant index of the string naming `ident`, for global access.
    pub(crate) fn name_constant(&mut self, ident: Ident, span: Span) -> u32 {
        let name = self.name(ident);
        self.constant(Constant::Str(name.into()), span)
    }

    /// Emits an invocation of `stub`, adding it to the stub table on first use.
    pub(crate) fn invoke_stub(&mut self, stub: CodeStub, span: Span) {
        let key = stub.key();
        let slot = match self.stub_slots.get(&key) {
            Some(slot) => *slot,
            None => match u16::try_from(self.stub_table.len()) {
                Ok(slot) => {
                    self.stub_table.push(stub);
                    self.stub_slots.insert(key, slot);
                    slot
                }
                Err(_) => {
                    self.sink
                        .emit(errors::error_limit("distinct stubs", u16::MAX as usize, span));
                    0
                }
            },
        };
        self.emit(Instr::InvokeStub(slot));
    }

    pub(crate) fn resolve(&self, name: Ident) -> Resolved {
        let Some((current, enclosing)) = self.functions.split_last() else {
            return Resolved::Global;
        };
        if current.is_script {
            return Resolved::Global;
        }
        if let Some(local) = current.lookup(name) {
            return Resolved::Local(local);
        }
        let captured = enclosing
            .iter()
            .filter(|f| !f.is_script)
            .any(|f| f.lookup(name).is_some());
        if captured {
            Resolved::Captured
        } else {
            Resolved::Global
        }
    }

    /// Declares a local in the current function, reporting slot exhaustion.
    pub(crate) fn declare_local(
        &mut self,
        name: Ident,
        is_const: bool,
        lexical: bool,
        span: Span,
    ) -> u16 {
        match self.current().declare_local(name, is_const, lexical) {
            Some(slot) => slot,
            None => {
                self.sink
                    .emit(errors::error_limit("locals", u16::MAX as usize, span));
                0
            }
        }
    }

    /// Records a top-level `let`/`const`, reporting a redeclaration.
    pub(crate) fn declare_lexical_global(&mut self, name: Ident, span: Span) {
        if !self.lexical_globals.insert(name) {
            self.sink.emit(errors::error_duplicate(self.name(name), span));
        }
    }
}
