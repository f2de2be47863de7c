//! The serialized function tree and its reconstruction.
//!
//! In a serialized body, `InvokeStub` operands are attachment slots rather
//! than stub table indices: slot 0 is the source object and slot `i + 1` is
//! stub `i`.

use crate::error::CodecError;
use ember_bytecode::{CodeStub, Constant, Instr, Script, SharedFunction};
use ember_common::LanguageMode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct PayloadBody {
    /// Number of functions in the tree, reserved before rebuilding it.
    pub function_count: u32,
    pub top: FunctionRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct FunctionRecord {
    pub name: Option<Arc<str>>,
    pub arity: u16,
    pub num_locals: u16,
    pub language_mode: LanguageMode,
    pub code: Vec<Instr>,
    pub constants: Vec<Constant>,
    pub children: Vec<FunctionRecord>,
}

impl FunctionRecord {
    pub fn from_function(function: &SharedFunction) -> Result<Self, CodecError> {
        let code = function
            .code
            .iter()
            .map(|instr| match instr {
                Instr::InvokeStub(index) => index
                    .checked_add(1)
                    .map(Instr::InvokeStub)
                    .ok_or_else(|| CodecError::Serialization {
                        reason: format!("stub index {index} has no attachment slot"),
                    }),
                other => Ok(*other),
            })
            .collect::<Result<Vec<_>, _>>()?;
        let children = function
            .children
            .iter()
            .map(|child| FunctionRecord::from_function(child))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name: function.name.clone(),
            arity: function.arity,
            num_locals: function.num_locals,
            language_mode: function.language_mode,
            code,
            constants: function.constants.clone(),
            children,
        })
    }
}

/// Objects shared by every function rebuilt from one payload.
pub(crate) struct Rebuild<'a> {
    pub script: &'a Arc<Script>,
    pub stubs: &'a Arc<[Arc<CodeStub>]>,
    pub remaining: u32,
}

impl Rebuild<'_> {
    /// Validates `record` and rebuilds it with its children.
    pub fn function(&mut self, record: FunctionRecord) -> Result<Arc<SharedFunction>, CodecError> {
        self.remaining = self.remaining.checked_sub(1).ok_or_else(|| {
            CodecError::reconstruction("function tree is larger than its reservation")
        })?;

        let name = record.name.as_deref().unwrap_or("<anonymous>").to_string();
        if record.num_locals < record.arity {
            return Err(CodecError::reconstruction(format!(
                "function `{name}` has {} locals for {} parameters",
                record.num_locals, record.arity
            )));
        }
        match record.code.last() {
            Some(Instr::Return | Instr::Throw | Instr::Jump(_)) => {}
            _ => {
                return Err(CodecError::reconstruction(format!(
                    "function `{name}` does not end in a terminator"
                )))
            }
        }

        let code = record
            .code
            .iter()
            .enumerate()
            .map(|(pc, instr)| self.check_instr(&record, pc, *instr))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|reason| CodecError::reconstruction(format!("function `{name}`: {reason}")))?;

        let children = record
            .children
            .into_iter()
            .map(|child| self.function(child))
            .collect::<Result<Vec<_>, _>>()?;

        let mut function = SharedFunction::new(
            record.name,
            record.arity,
            record.num_locals,
            record.language_mode,
            code,
            record.constants,
            children,
            self.script.clone(),
            self.stubs.clone(),
        );
        function.mark_deserialized();
        Ok(Arc::new(function))
    }

    /// Checks one instruction's operand and maps attachment slots back to
    /// stub table indices.
    fn check_instr(&self, record: &FunctionRecord, pc: usize, instr: Instr) -> Result<Instr, String> {
        let in_range = |index: u32, len: usize| usize::try_from(index).is_ok_and(|i| i < len);
        let ok = match instr {
            Instr::LoadConst(n) => in_range(n, record.constants.len()),
            Instr::LoadGlobal(n)
            | Instr::StoreGlobal(n)
            | Instr::DeclareGlobal(n)
            | Instr::DeclareConst(n) => usize::try_from(n)
                .ok()
                .and_then(|i| record.constants.get(i))
                .is_some_and(|c| c.as_str().is_some()),
            Instr::LoadLocal(n) | Instr::StoreLocal(n) => n < record.num_locals,
            Instr::MakeFunction(n) => in_range(n, record.children.len()),
            Instr::Jump(t) | Instr::JumpIfFalse(t) => in_range(t, record.code.len()),
            Instr::InvokeStub(slot) => {
                if slot == 0 || usize::from(slot) > self.stubs.len() {
                    return Err(format!("instruction {pc} invokes attachment slot {slot}"));
                }
                return Ok(Instr::InvokeStub(slot - 1));
            }
            Instr::LoadUndefined
            | Instr::LoadNull
            | Instr::LoadTrue
            | Instr::LoadFalse
            | Instr::Pop
            | Instr::Dup
            | Instr::SetCompletion
            | Instr::LoadCompletion
            | Instr::Throw
            | Instr::Return => true,
        };
        if ok {
            Ok(instr)
        } else {
            Err(format!("instruction {pc} (`{instr}`) has an invalid operand"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_bytecode::{BinaryKind, StubCache};

    fn record(code: Vec<Instr>) -> FunctionRecord {
        FunctionRecord {
            name: Some("f".into()),
            arity: 1,
            num_locals: 1,
            language_mode: LanguageMode::Sloppy,
            code,
            constants: vec![Constant::Number(1.0), Constant::Str("g".into())],
            children: Vec::new(),
        }
    }

    fn rebuild(record: FunctionRecord, reservation: u32) -> Result<Arc<SharedFunction>, CodecError> {
        let mut cache = StubCache::new();
        let stubs: Arc<[Arc<CodeStub>]> =
            Arc::from(vec![cache.get_or_create(CodeStub::Binary(BinaryKind::Add))]);
        let script = Arc::new(Script::placeholder());
        let mut rebuild = Rebuild {
            script: &script,
            stubs: &stubs,
            remaining: reservation,
        };
        rebuild.function(record)
    }

    #[test]
    fn stub_slots_map_back_to_indices() {
        let f = rebuild(
            record(vec![
                Instr::LoadLocal(0),
                Instr::LoadConst(0),
                Instr::InvokeStub(1),
                Instr::Return,
            ]),
            1,
        )
        .unwrap();
        assert_eq!(f.code[2], Instr::InvokeStub(0));
        assert!(f.is_deserialized());
        assert!(f.script.is_placeholder());
    }

    #[test]
    fn slot_zero_is_not_a_stub() {
        let err = rebuild(record(vec![Instr::InvokeStub(0), Instr::Return]), 1).unwrap_err();
        assert!(err.to_string().contains("attachment slot 0"));
    }

    #[test]
    fn operands_are_validated() {
        let bad = [
            Instr::LoadConst(2),
            Instr::LoadGlobal(0),
            Instr::LoadLocal(1),
            Instr::MakeFunction(0),
            Instr::Jump(9),
            Instr::InvokeStub(2),
        ];
        for instr in bad {
            let result = rebuild(record(vec![instr, Instr::Return]), 1);
            assert!(
                matches!(result, Err(CodecError::Reconstruction { .. })),
                "{instr} should be rejected"
            );
        }
        assert!(rebuild(record(vec![Instr::LoadGlobal(1), Instr::Return]), 1).is_ok());
    }

    #[test]
    fn missing_terminator_is_rejected() {
        assert!(rebuild(record(vec![Instr::LoadNull]), 1).is_err());
        assert!(rebuild(record(vec![]), 1).is_err());
    }

    #[test]
    fn reservation_is_enforced() {
        let mut parent = record(vec![Instr::MakeFunction(0), Instr::Return]);
        parent.children.push(record(vec![Instr::LoadNull, Instr::Return]));
        assert!(rebuild(parent.clone(), 2).is_ok());
        let err = rebuild(parent, 1).unwrap_err();
        assert!(err.to_string().contains("reservation"));
    }

    #[test]
    fn locals_cover_parameters() {
        let mut r = record(vec![Instr::LoadUndefined, Instr::Return]);
        r.num_locals = 0;
        assert!(rebuild(r, 1).is_err());
    }
}
