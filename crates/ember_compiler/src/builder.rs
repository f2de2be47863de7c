//! Per-function code buffers and lexical scopes.

use ember_bytecode::{CodeStub, Constant, Instr, Script, SharedFunction};
use ember_common::{Ident, LanguageMode};
use std::collections::HashMap;
use std::sync::Arc;

/// A local variable slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Local {
    pub slot: u16,
    pub is_const: bool,
    /// True for `let`/`const`, which may not be redeclared in their scope.
    pub lexical: bool,
}

/// A function under construction.
///
/// The top-level script is a builder with `is_script` set; its declarations
/// become globals and it never allocates locals.
#[derive(Debug)]
pub(crate) struct FunctionBuilder {
    pub name: Option<Arc<str>>,
    pub arity: u16,
    pub is_script: bool,
    pub scopes: Vec<HashMap<Ident, Local>>,
    pub num_locals: usize,
    pub code: Vec<Instr>,
    pub constants: Vec<Constant>,
    pub children: Vec<FunctionBuilder>,
}

impl FunctionBuilder {
    pub fn script() -> Self {
        Self::new(None, true)
    }

    pub fn function(name: Option<Arc<str>>) -> Self {
        Self::new(name, false)
    }

    fn new(name: Option<Arc<str>>, is_script: bool) -> Self {
        Self {
            name,
            arity: 0,
            is_script,
            scopes: vec![HashMap::new()],
            num_locals: 0,
            code: Vec::new(),
            constants: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn emit(&mut self, instr: Instr) -> usize {
        self.code.push(instr);
        self.code.len() - 1
    }

    /// Index of the next instruction to be emitted.
    pub fn next_pc(&self) -> usize {
        self.code.len()
    }

    /// Points the jump at `at` to `target`.
    pub fn patch_jump(&mut self, at: usize, target: u32) {
        match &mut self.code[at] {
            Instr::Jump(t) | Instr::JumpIfFalse(t) => *t = target,
            other => unreachable!("patch_jump on non-jump instruction {other}"),
        }
    }

    /// Sets the child index of the `MakeFunction` at `at`.
    pub fn patch_function(&mut self, at: usize, child: u32) {
        match &mut self.code[at] {
            Instr::MakeFunction(c) => *c = child,
            other => unreachable!("patch_function on {other}"),
        }
    }

    /// Returns the pool index for `constant`, adding it if absent.
    pub fn constant_index(&mut self, constant: Constant) -> usize {
        if let Some(i) = self.constants.iter().position(|c| c.same_entry(&constant)) {
            return i;
        }
        self.constants.push(constant);
        self.constants.len() - 1
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Looks `name` up from the innermost scope outwards.
    pub fn lookup(&self, name: Ident) -> Option<Local> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name).copied())
    }

    /// Returns the binding for `name` in the innermost scope only.
    pub fn lookup_innermost(&self, name: Ident) -> Option<Local> {
        self.scopes.last().and_then(|scope| scope.get(&name).copied())
    }

    /// Allocates a fresh slot bound to `name` in the innermost scope.
    /// Returns `None` once the slot space is exhausted, so the total number
    /// of locals always fits in a `u16`.
    pub fn declare_local(&mut self, name: Ident, is_const: bool, lexical: bool) -> Option<u16> {
        if self.num_locals >= usize::from(u16::MAX) {
            return None;
        }
        let slot = u16::try_from(self.num_locals).ok()?;
        self.num_locals += 1;
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(
                name,
                Local {
                    slot,
                    is_const,
                    lexical,
                },
            );
        }
        Some(slot)
    }

    /// Converts this builder and its children into shared functions.
    pub fn finish(
        self,
        mode: LanguageMode,
        script: &Arc<Script>,
        stubs: &Arc<[Arc<CodeStub>]>,
    ) -> Arc<SharedFunction> {
        let children = self
            .children
            .into_iter()
            .map(|child| child.finish(mode, script, stubs))
            .collect();
        Arc::new(SharedFunction::new(
            self.name,
            self.arity,
            u16::try_from(self.num_locals).unwrap_or(u16::MAX),
            mode,
            self.code,
            self.constants,
            children,
            script.clone(),
            stubs.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_are_deduplicated() {
        let mut b = FunctionBuilder::script();
        let a = b.constant_index(Constant::Str("x".into()));
        let n = b.constant_index(Constant::Number(1.0));
        assert_eq!(b.constant_index(Constant::Str("x".into())), a);
        assert_eq!(b.constant_index(Constant::Number(1.0)), n);
        assert_eq!(b.constants.len(), 2);
    }

    #[test]
    fn jumps_are_patched() {
        let mut b = FunctionBuilder::script();
        let at = b.emit(Instr::JumpIfFalse(0));
        b.emit(Instr::Pop);
        b.patch_jump(at, 2);
        assert_eq!(b.code[0], Instr::JumpIfFalse(2));
    }

    #[test]
    fn scopes_shadow_and_pop() {
        let mut b = FunctionBuilder::function(None);
        let x = Ident::from_raw(0);
        let outer = b.declare_local(x, false, true).unwrap();
        b.push_scope();
        assert!(b.lookup_innermost(x).is_none());
        let inner = b.declare_local(x, true, true).unwrap();
        assert_ne!(outer, inner);
        assert_eq!(b.lookup(x).map(|l| l.slot), Some(inner));
        b.pop_scope();
        assert_eq!(b.lookup(x).map(|l| l.slot), Some(outer));
        assert_eq!(b.num_locals, 2);
    }

    #[test]
    fn local_slots_stop_at_u16_max() {
        let mut b = FunctionBuilder::function(None);
        for i in 0..u32::from(u16::MAX) {
            assert_eq!(
                b.declare_local(Ident::from_raw(i), false, false),
                Some(i as u16)
            );
        }
        assert_eq!(b.declare_local(Ident::from_raw(70_000), false, false), None);
        assert_eq!(b.num_locals, usize::from(u16::MAX));
        let function = b.finish(
            LanguageMode::Sloppy,
            &Arc::new(Script::placeholder()),
            &Arc::from(Vec::new()),
        );
        assert_eq!(function.num_locals, u16::MAX);
    }
}
