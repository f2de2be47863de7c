//! Compiled functions and the script source object they belong to.

use crate::instr::{Constant, Instr};
use crate::stub::CodeStub;
use ember_common::LanguageMode;
use std::fmt::{self, Write as _};
use std::sync::Arc;

/// The source object of a compiled script.
///
/// Functions built by the compiler point at the real source. Functions
/// rebuilt from an artifact point at whatever source object the decoder was
/// handed, conventionally the empty placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Script {
    /// The script text.
    pub source: Arc<str>,
}

impl Script {
    /// Creates a script object over `source`.
    pub fn new(source: impl Into<Arc<str>>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// The empty-source placeholder used when reconstructing artifacts.
    pub fn placeholder() -> Self {
        Self::new("")
    }

    /// Returns true if this is the empty placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.source.is_empty()
    }
}

/// A compiled function: code, constants, nested functions and the links to
/// its script and the script's stub table.
///
/// The top-level script is itself a `SharedFunction` with arity zero.
#[derive(Debug, Clone)]
pub struct SharedFunction {
    /// The declared name, if any.
    pub name: Option<Arc<str>>,
    /// Number of declared parameters. Parameters occupy the first local slots.
    pub arity: u16,
    /// Total local slots including parameters.
    pub num_locals: u16,
    /// The language mode the function was compiled in.
    pub language_mode: LanguageMode,
    /// The instruction stream.
    pub code: Vec<Instr>,
    /// The constant pool.
    pub constants: Vec<Constant>,
    /// Nested functions, referenced by `MakeFunction`.
    pub children: Vec<Arc<SharedFunction>>,
    /// The script this function belongs to.
    pub script: Arc<Script>,
    /// The script-wide stub table, referenced by `InvokeStub`.
    pub stubs: Arc<[Arc<CodeStub>]>,
    deserialized: bool,
}

/// A handle to a compiled function as the engine passes it around.
pub type FunctionDescriptor = Arc<SharedFunction>;

impl SharedFunction {
    /// Creates a function that was compiled in this process.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: Option<Arc<str>>,
        arity: u16,
        num_locals: u16,
        language_mode: LanguageMode,
        code: Vec<Instr>,
        constants: Vec<Constant>,
        children: Vec<Arc<SharedFunction>>,
        script: Arc<Script>,
        stubs: Arc<[Arc<CodeStub>]>,
    ) -> Self {
        Self {
            name,
            arity,
            num_locals,
            language_mode,
            code,
            constants,
            children,
            script,
            stubs,
            deserialized: false,
        }
    }

    /// Flags this function as rebuilt from an artifact.
    pub fn mark_deserialized(&mut self) {
        self.deserialized = true;
    }

    /// Returns true if this function was rebuilt from an artifact.
    pub fn is_deserialized(&self) -> bool {
        self.deserialized
    }

    /// Returns the declared name, or `<anonymous>`.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }

    /// Counts this function and all nested functions.
    pub fn function_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|child| child.function_count())
            .sum::<usize>()
    }

    /// Renders a human-readable listing of this function and its children.
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        self.disassemble_into(&mut out, 0);
        out
    }

    fn disassemble_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        let _ = writeln!(
            out,
            "{indent}function {} (arity {}, locals {})",
            self.display_name(),
            self.arity,
            self.num_locals
        );
        for (i, constant) in self.constants.iter().enumerate() {
            let _ = match constant {
                Constant::Number(n) => writeln!(out, "{indent}  const {i}: {n}"),
                Constant::Str(s) => writeln!(out, "{indent}  const {i}: {s:?}"),
            };
        }
        for (pc, instr) in self.code.iter().enumerate() {
            match instr {
                Instr::InvokeStub(n) => {
                    let stub = self.stubs.get(usize::from(*n));
                    let _ = match stub {
                        Some(stub) => writeln!(out, "{indent}  {pc:4}  {instr}  ; {stub}"),
                        None => writeln!(out, "{indent}  {pc:4}  {instr}"),
                    };
                }
                _ => {
                    let _ = writeln!(out, "{indent}  {pc:4}  {instr}");
                }
            }
        }
        for child in &self.children {
            child.disassemble_into(out, depth + 1);
        }
    }
}

impl fmt::Display for SharedFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "function {}", self.display_name())
    }
}
