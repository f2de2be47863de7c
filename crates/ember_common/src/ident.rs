//! Names that appear in scripts, interned once per engine.
//!
//! The parser interns every identifier token and the compiler resolves
//! scopes by comparing [`Ident`]s, so a name is hashed once no matter how
//! many functions refer to it.

use lasso::ThreadedRodeo;
use serde::{Deserialize, Serialize};

/// A variable, parameter or function name.
///
/// Only meaningful together with the [`Interner`] that produced it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Ident(u32);

impl Ident {
    /// Wraps a raw index. Used by tests that build ASTs by hand.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// The raw index.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

// SAFETY: round-trips through `usize` and refuses indices above `u32::MAX`.
unsafe impl lasso::Key for Ident {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn try_from_usize(int: usize) -> Option<Self> {
        u32::try_from(int).ok().map(Ident)
    }
}

/// Name table owned by an engine and lent to its parser and compiler.
pub struct Interner {
    names: ThreadedRodeo<Ident>,
}

impl Interner {
    /// An empty table.
    pub fn new() -> Self {
        Self {
            names: ThreadedRodeo::new(),
        }
    }

    /// Returns the [`Ident`] for `name`, adding it on first sight.
    pub fn get_or_intern(&self, name: &str) -> Ident {
        self.names.get_or_intern(name)
    }

    /// The source text of `ident`.
    ///
    /// # Panics
    ///
    /// Panics if `ident` came from another interner.
    pub fn resolve(&self, ident: Ident) -> &str {
        self.names.resolve(&ident)
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_name_resolves_to_its_source_text() {
        let interner = Interner::new();
        let greeting = interner.get_or_intern("greeting");
        assert_eq!(interner.resolve(greeting), "greeting");
    }

    #[test]
    fn a_name_used_in_two_functions_is_one_ident() {
        let interner = Interner::new();
        let in_foo = interner.get_or_intern("counter");
        let in_bar = interner.get_or_intern("counter");
        assert_eq!(in_foo, in_bar);
        assert_eq!(interner.resolve(in_bar), "counter");
    }

    #[test]
    fn names_are_case_sensitive() {
        let interner = Interner::new();
        assert_ne!(interner.get_or_intern("value"), interner.get_or_intern("Value"));
    }

    #[test]
    fn raw_index_survives_a_round_trip() {
        let interner = Interner::new();
        let id = interner.get_or_intern("$_tmp");
        assert_eq!(Ident::from_raw(id.as_raw()), id);
    }
}
