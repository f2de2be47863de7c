//! Bytecode instructions and constant pool entries.
//!
//! The interpreter is a stack machine. Operands are indices into the owning
//! function's constant pool, local slots, child functions, instruction
//! stream, or the script-wide stub table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// One bytecode instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instr {
    /// Push constant `n` of the function's pool.
    LoadConst(u32),
    /// Push `undefined`.
    LoadUndefined,
    /// Push `null`.
    LoadNull,
    /// Push `true`.
    LoadTrue,
    /// Push `false`.
    LoadFalse,
    /// Push local slot `n`.
    LoadLocal(u16),
    /// Store the top of stack into local slot `n` without popping.
    StoreLocal(u16),
    /// Push the global named by string constant `n`.
    LoadGlobal(u32),
    /// Store the top of stack into the global named by string constant `n`
    /// without popping.
    StoreGlobal(u32),
    /// Pop a value and declare it as a mutable global named by constant `n`.
    DeclareGlobal(u32),
    /// Pop a value and declare it as a read-only global named by constant `n`.
    DeclareConst(u32),
    /// Push a function value for child function `n`.
    MakeFunction(u32),
    /// Discard the top of stack.
    Pop,
    /// Duplicate the top of stack.
    Dup,
    /// Jump to instruction `n`.
    Jump(u32),
    /// Pop a value and jump to instruction `n` if it is falsy.
    JumpIfFalse(u32),
    /// Run stub `n` of the script's stub table on the operand stack.
    InvokeStub(u16),
    /// Pop a value and record it as the script's completion value.
    SetCompletion,
    /// Push the recorded completion value.
    LoadCompletion,
    /// Pop a value and throw it.
    Throw,
    /// Pop a value and return it to the caller.
    Return,
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::LoadConst(n) => write!(f, "load.const {n}"),
            Instr::LoadUndefined => write!(f, "load.undefined"),
            Instr::LoadNull => write!(f, "load.null"),
            Instr::LoadTrue => write!(f, "load.true"),
            Instr::LoadFalse => write!(f, "load.false"),
            Instr::LoadLocal(n) => write!(f, "load.local {n}"),
            Instr::StoreLocal(n) => write!(f, "store.local {n}"),
            Instr::LoadGlobal(n) => write!(f, "load.global {n}"),
            Instr::StoreGlobal(n) => write!(f, "store.global {n}"),
            Instr::DeclareGlobal(n) => write!(f, "declare.global {n}"),
            Instr::DeclareConst(n) => write!(f, "declare.const {n}"),
            Instr::MakeFunction(n) => write!(f, "make.function {n}"),
            Instr::Pop => write!(f, "pop"),
            Instr::Dup => write!(f, "dup"),
            Instr::Jump(n) => write!(f, "jump {n}"),
            Instr::JumpIfFalse(n) => write!(f, "jump.if_false {n}"),
            Instr::InvokeStub(n) => write!(f, "invoke.stub {n}"),
            Instr::SetCompletion => write!(f, "completion.set"),
            Instr::LoadCompletion => write!(f, "completion.load"),
            Instr::Throw => write!(f, "throw"),
            Instr::Return => write!(f, "return"),
        }
    }
}

/// An entry in a function's constant pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constant {
    /// A number literal.
    Number(f64),
    /// A string literal or a global variable name.
    Str(Arc<str>),
}

impl Constant {
    /// Returns the string payload, if this is a string constant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Constant::Str(s) => Some(s),
            Constant::Number(_) => None,
        }
    }

    /// Returns true if both constants are the same pool entry.
    ///
    /// Numbers compare by bit pattern so that `0` and `-0` stay distinct and
    /// `NaN` can be deduplicated.
    pub fn same_entry(&self, other: &Constant) -> bool {
        match (self, other) {
            (Constant::Number(a), Constant::Number(b)) => a.to_bits() == b.to_bits(),
            (Constant::Str(a), Constant::Str(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instr_display() {
        assert_eq!(Instr::LoadConst(3).to_string(), "load.const 3");
        assert_eq!(Instr::JumpIfFalse(12).to_string(), "jump.if_false 12");
        assert_eq!(Instr::Return.to_string(), "return");
    }

    #[test]
    fn constant_as_str() {
        assert_eq!(Constant::Str("x".into()).as_str(), Some("x"));
        assert_eq!(Constant::Number(1.0).as_str(), None);
    }

    #[test]
    fn same_entry_distinguishes_signed_zero() {
        assert!(!Constant::Number(0.0).same_entry(&Constant::Number(-0.0)));
        assert!(Constant::Number(f64::NAN).same_entry(&Constant::Number(f64::NAN)));
        assert!(!Constant::Number(1.0).same_entry(&Constant::Str("1".into())));
    }

    #[test]
    fn instr_serde_roundtrip() {
        let code = vec![Instr::LoadLocal(2), Instr::InvokeStub(0), Instr::Return];
        let json = serde_json::to_string(&code).unwrap();
        let back: Vec<Instr> = serde_json::from_str(&json).unwrap();
        assert_eq!(code, back);
    }
}
