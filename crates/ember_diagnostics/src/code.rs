//! Diagnostic codes with category prefixes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The category of a diagnostic code, determining its prefix letter.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Lexical and syntax errors, prefixed with `E`.
    Syntax,
    /// Scope and semantic errors found by the compiler, prefixed with `S`.
    Semantic,
    /// Warnings, prefixed with `W`.
    Warning,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Syntax => 'E',
            Category::Semantic => 'S',
            Category::Warning => 'W',
        }
    }
}

/// A category prefix plus a number, displayed as e.g. `E101` or `S203`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The category of this diagnostic.
    pub category: Category,
    /// The numeric identifier within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Invalid character, unterminated string or comment.
    pub const LEX: DiagnosticCode = DiagnosticCode::new(Category::Syntax, 100);
    /// Unexpected token.
    pub const PARSE: DiagnosticCode = DiagnosticCode::new(Category::Syntax, 101);
    /// Invalid assignment target.
    pub const ASSIGN_TARGET: DiagnosticCode = DiagnosticCode::new(Category::Syntax, 102);
    /// Assignment to a `const` binding.
    pub const CONST_ASSIGN: DiagnosticCode = DiagnosticCode::new(Category::Semantic, 201);
    /// Duplicate declaration in one scope.
    pub const DUPLICATE: DiagnosticCode = DiagnosticCode::new(Category::Semantic, 202);
    /// Reference to a local of an enclosing function.
    pub const CAPTURE: DiagnosticCode = DiagnosticCode::new(Category::Semantic, 203);
    /// `return` outside of a function body.
    pub const RETURN_OUTSIDE: DiagnosticCode = DiagnosticCode::new(Category::Semantic, 204);
    /// A per-function limit (locals, constants, arguments) was exceeded.
    pub const LIMIT: DiagnosticCode = DiagnosticCode::new(Category::Semantic, 205);

    /// Creates a new diagnostic code.
    pub const fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_prefixes() {
        assert_eq!(Category::Syntax.prefix(), 'E');
        assert_eq!(Category::Semantic.prefix(), 'S');
        assert_eq!(Category::Warning.prefix(), 'W');
    }

    #[test]
    fn display_format() {
        assert_eq!(DiagnosticCode::PARSE.to_string(), "E101");
        assert_eq!(DiagnosticCode::CAPTURE.to_string(), "S203");
        assert_eq!(DiagnosticCode::new(Category::Warning, 7).to_string(), "W007");
    }
}
