//! The bytecode interpreter.
//!
//! Calls do not recurse on the Rust stack: each script call pushes a
//! [`Frame`] and `Return` pops it, so the depth limit is the only bound on
//! script recursion.

use crate::error::RuntimeError;
use crate::globals::Globals;
use crate::stubs;
use crate::value::Value;
use ember_bytecode::{CodeStub, FunctionDescriptor, Instr, SharedFunction};
use tracing::{debug, trace};

/// Default call depth limit.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1024;

/// Executes compiled functions against a set of globals.
#[derive(Debug, Clone, Copy)]
pub struct Interpreter {
    max_call_depth: usize,
}

struct Frame {
    function: FunctionDescriptor,
    pc: usize,
    locals: Vec<Value>,
    stack_base: usize,
}

impl Frame {
    fn new(function: FunctionDescriptor, mut args: Vec<Value>, stack_base: usize) -> Self {
        args.truncate(usize::from(function.arity));
        args.resize(usize::from(function.num_locals).max(args.len()), Value::Undefined);
        Self {
            function,
            pc: 0,
            locals: args,
            stack_base,
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CALL_DEPTH)
    }
}

impl Interpreter {
    /// Creates an interpreter that allows at most `max_call_depth` active
    /// frames, the top-level script included.
    pub fn new(max_call_depth: usize) -> Self {
        Self {
            max_call_depth: max_call_depth.max(1),
        }
    }

    /// The configured call depth limit.
    pub fn max_call_depth(&self) -> usize {
        self.max_call_depth
    }

    /// Runs a top-level function and returns its result.
    ///
    /// For a compiled script this is the completion value of the last
    /// expression statement executed, or `undefined`.
    pub fn run(
        &self,
        function: &FunctionDescriptor,
        globals: &mut Globals,
    ) -> Result<Value, RuntimeError> {
        debug!(
            function = function.display_name(),
            deserialized = function.is_deserialized(),
            "running function"
        );
        let mut frames = vec![Frame::new(function.clone(), Vec::new(), 0)];
        let mut stack: Vec<Value> = Vec::new();
        let mut completion = Value::Undefined;

        loop {
            let Some(frame) = frames.last_mut() else {
                return Err(RuntimeError::invalid("no active frame"));
            };
            let instr = frame.function.code.get(frame.pc).copied().ok_or_else(|| {
                RuntimeError::invalid(format!(
                    "'{}' ran past its last instruction",
                    frame.function.display_name()
                ))
            })?;
            frame.pc += 1;

            match instr {
                Instr::LoadConst(n) => {
                    let constant = frame.function.constants.get(n as usize).ok_or_else(|| {
                        RuntimeError::invalid(format!("constant {n} out of range"))
                    })?;
                    stack.push(Value::from(constant));
                }
                Instr::LoadUndefined => stack.push(Value::Undefined),
                Instr::LoadNull => stack.push(Value::Null),
                Instr::LoadTrue => stack.push(Value::Bool(true)),
                Instr::LoadFalse => stack.push(Value::Bool(false)),
                Instr::LoadLocal(n) => {
                    let value = frame
                        .locals
                        .get(usize::from(n))
                        .cloned()
                        .ok_or_else(|| RuntimeError::invalid(format!("local {n} out of range")))?;
                    stack.push(value);
                }
                Instr::StoreLocal(n) => {
                    let value = peek(&stack)?.clone();
                    let slot = frame
                        .locals
                        .get_mut(usize::from(n))
                        .ok_or_else(|| RuntimeError::invalid(format!("local {n} out of range")))?;
                    *slot = value;
                }
                Instr::LoadGlobal(n) => {
                    let name = global_name(&frame.function, n)?;
                    stack.push(globals.read(name)?);
                }
                Instr::StoreGlobal(n) => {
                    let name = global_name(&frame.function, n)?;
                    let value = peek(&stack)?.clone();
                    globals.assign(name, value, frame.function.language_mode.is_strict())?;
                }
                Instr::DeclareGlobal(n) => {
                    let name = global_name(&frame.function, n)?;
                    let value = pop(&mut stack)?;
                    globals.declare(name, value, false);
                }
                Instr::DeclareConst(n) => {
                    let name = global_name(&frame.function, n)?;
                    let value = pop(&mut stack)?;
                    globals.declare(name, value, true);
                }
                Instr::MakeFunction(n) => {
                    let child = frame.function.children.get(n as usize).cloned().ok_or_else(|| {
                        RuntimeError::invalid(format!("child function {n} out of range"))
                    })?;
                    stack.push(Value::Function(child));
                }
                Instr::Pop => {
                    pop(&mut stack)?;
                }
                Instr::Dup => {
                    let value = peek(&stack)?.clone();
                    stack.push(value);
                }
                Instr::Jump(target) => frame.pc = target as usize,
                Instr::JumpIfFalse(target) => {
                    if !pop(&mut stack)?.is_truthy() {
                        frame.pc = target as usize;
                    }
                }
                Instr::InvokeStub(n) => {
                    let stub = **frame.function.stubs.get(usize::from(n)).ok_or_else(|| {
                        RuntimeError::invalid(format!("stub slot {n} out of range"))
                    })?;
                    match stub {
                        CodeStub::Binary(kind) => {
                            let right = pop(&mut stack)?;
                            let left = pop(&mut stack)?;
                            stack.push(stubs::binary(kind, &left, &right));
                        }
                        CodeStub::Unary(kind) => {
                            let operand = pop(&mut stack)?;
                            stack.push(stubs::unary(kind, &operand));
                        }
                        CodeStub::Call { argc } => {
                            let argc = usize::from(argc);
                            if stack.len() < frame.stack_base + argc + 1 {
                                return Err(RuntimeError::invalid("operand stack underflow"));
                            }
                            let args = stack.split_off(stack.len() - argc);
                            let callee = match pop(&mut stack)? {
                                Value::Function(callee) => callee,
                                other => {
                                    return Err(RuntimeError::type_error(format!(
                                        "{} is not a function",
                                        describe(&other)
                                    )))
                                }
                            };
                            if frames.len() >= self.max_call_depth {
                                return Err(RuntimeError::StackOverflow {
                                    limit: self.max_call_depth,
                                });
                            }
                            trace!(callee = callee.display_name(), argc, "call");
                            frames.push(Frame::new(callee, args, stack.len()));
                        }
                    }
                }
                Instr::SetCompletion => completion = pop(&mut stack)?,
                Instr::LoadCompletion => stack.push(completion.clone()),
                Instr::Throw => return Err(RuntimeError::Uncaught(pop(&mut stack)?)),
                Instr::Return => {
                    let value = pop(&mut stack)?;
                    let stack_base = frame.stack_base;
                    frames.pop();
                    stack.truncate(stack_base);
                    if frames.is_empty() {
                        return Ok(value);
                    }
                    stack.push(value);
                }
            }
        }
    }
}

fn pop(stack: &mut Vec<Value>) -> Result<Value, RuntimeError> {
    stack
        .pop()
        .ok_or_else(|| RuntimeError::invalid("operand stack underflow"))
}

fn peek(stack: &[Value]) -> Result<&Value, RuntimeError> {
    stack
        .last()
        .ok_or_else(|| RuntimeError::invalid("operand stack underflow"))
}

fn global_name(function: &SharedFunction, index: u32) -> Result<&str, RuntimeError> {
    function
        .constants
        .get(index as usize)
        .and_then(|c| c.as_str())
        .ok_or_else(|| RuntimeError::invalid(format!("constant {index} is not a name")))
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{s}\""),
        other => other.to_string(),
    }
}
