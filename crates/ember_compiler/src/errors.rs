//! Diagnostic helpers for compile errors.
//!
//! Syntax-level problems found while lowering use the `E1xx` codes shared
//! with the parser; scoping problems use `S2xx`.

use ember_common::Span;
use ember_diagnostics::{Diagnostic, DiagnosticCode};

/// Creates a diagnostic for an assignment to a `const` binding.
pub fn error_const_assign(name: &str, span: Span) -> Diagnostic {
    Diagnostic::error(
        DiagnosticCode::CONST_ASSIGN,
        format!("assignment to constant variable `{name}`"),
        span,
    )
}

/// Creates a diagnostic for a `let`/`const` that redeclares a name.
pub fn error_duplicate(name: &str, span: Span) -> Diagnostic {
    Diagnostic::error(
        DiagnosticCode::DUPLICATE,
        format!("identifier `{name}` has already been declared"),
        span,
    )
}

/// Creates a diagnostic for a parameter name used twice in strict mode.
pub fn error_duplicate_param(name: &str, span: Span) -> Diagnostic {
    Diagnostic::error(
        DiagnosticCode::DUPLICATE,
        format!("duplicate parameter name `{name}` not allowed in strict mode"),
        span,
    )
}

/// Creates a diagnostic for a reference to a local of an enclosing function.
pub fn error_capture(name: &str, span: Span) -> Diagnostic {
    Diagnostic::error(
        DiagnosticCode::CAPTURE,
        format!("cannot capture `{name}` from an enclosing function"),
        span,
    )
    .with_note("nested functions can only see their own locals and globals")
}

/// Creates a diagnostic for `return` at the top level of a script.
pub fn error_return_outside(span: Span) -> Diagnostic {
    Diagnostic::error(
        DiagnosticCode::RETURN_OUTSIDE,
        "illegal return statement outside of a function",
        span,
    )
}

/// Creates a diagnostic when a function exceeds an encoding limit.
pub fn error_limit(what: &str, max: usize, span: Span) -> Diagnostic {
    Diagnostic::error(
        DiagnosticCode::LIMIT,
        format!("too many {what} (at most {max} allowed)"),
        span,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_diagnostics::Severity;

    #[test]
    fn capture_has_note() {
        let diag = error_capture("x", Span::new(3, 4));
        assert_eq!(diag.code, DiagnosticCode::CAPTURE);
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.notes.len(), 1);
    }

    #[test]
    fn limit_message() {
        let diag = error_limit("locals", 65535, Span::DUMMY);
        assert_eq!(diag.message, "too many locals (at most 65535 allowed)");
    }
}
