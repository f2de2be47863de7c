//! Global bindings of one execution context.

use crate::error::RuntimeError;
use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct Binding {
    value: Value,
    is_const: bool,
}

/// The global variables of a context.
///
/// Re-declaring a name replaces its binding, so running the same script
/// twice in one context succeeds.
#[derive(Debug, Clone, Default)]
pub struct Globals {
    bindings: HashMap<Arc<str>, Binding>,
}

impl Globals {
    /// Creates an empty set of globals.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `name`, replacing any existing binding.
    pub fn declare(&mut self, name: &str, value: Value, is_const: bool) {
        self.bindings
            .insert(name.into(), Binding { value, is_const });
    }

    /// Returns the value of `name`, if declared.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name).map(|b| &b.value)
    }

    /// Reads `name`, failing with a `ReferenceError` if it is undeclared.
    pub fn read(&self, name: &str) -> Result<Value, RuntimeError> {
        self.get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::ReferenceError {
                name: name.to_string(),
            })
    }

    /// Assigns to `name`.
    ///
    /// Assigning to a constant is a `TypeError`. An undeclared name is a
    /// `ReferenceError` in strict mode and is created in sloppy mode.
    pub fn assign(&mut self, name: &str, value: Value, strict: bool) -> Result<(), RuntimeError> {
        match self.bindings.get_mut(name) {
            Some(binding) if binding.is_const => Err(RuntimeError::type_error(format!(
                "Assignment to constant variable '{name}'."
            ))),
            Some(binding) => {
                binding.value = value;
                Ok(())
            }
            None if strict => Err(RuntimeError::ReferenceError {
                name: name.to_string(),
            }),
            None => {
                self.declare(name, value, false);
                Ok(())
            }
        }
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true if nothing is declared.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
