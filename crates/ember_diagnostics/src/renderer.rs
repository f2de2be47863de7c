//! Rendering of diagnostics for terminals and machines.

use crate::diagnostic::Diagnostic;

/// Formats a diagnostic against the script it was reported for.
pub trait DiagnosticRenderer {
    /// Renders one diagnostic. `name` labels the script in location lines.
    fn render(&self, diag: &Diagnostic, name: &str, source: &str) -> String;

    /// Renders every diagnostic, one after another.
    fn render_all(&self, diags: &[Diagnostic], name: &str, source: &str) -> String {
        diags
            .iter()
            .map(|d| self.render(d, name, source))
            .collect::<Vec<_>>()
            .join("")
    }
}

/// Renders diagnostics in a rustc-like layout:
///
/// ```text
/// error[E101]: expected ')', found '{'
///   --> script.js:1:15
///    |
///  1 | function foo( {
///    |               ^
/// ```
pub struct TerminalRenderer;

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic, name: &str, source: &str) -> String {
        let mut out = format!("{}[{}]: {}\n", diag.severity, diag.code, diag.message);

        if !diag.span.is_dummy() {
            let (line, col) = diag.span.line_col(source);
            let line_num = line.to_string();
            let padding = " ".repeat(line_num.len());
            let line_text = source_line(source, diag.span.start);
            let carets = "^".repeat(diag.span.len().max(1) as usize);
            let col_padding = " ".repeat(col.saturating_sub(1) as usize);

            out.push_str(&format!("{padding}--> {name}:{line}:{col}\n"));
            out.push_str(&format!("{padding} |\n"));
            out.push_str(&format!("{line_num} | {line_text}\n"));
            out.push_str(&format!("{padding} | {col_padding}{carets}\n"));
        }

        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        out
    }
}

/// Renders each diagnostic as one JSON object per line.
pub struct JsonRenderer;

impl DiagnosticRenderer for JsonRenderer {
    fn render(&self, diag: &Diagnostic, name: &str, source: &str) -> String {
        let (line, column) = if diag.span.is_dummy() {
            (0, 0)
        } else {
            diag.span.line_col(source)
        };
        let value = serde_json::json!({
            "severity": diag.severity.to_string(),
            "code": diag.code.to_string(),
            "message": diag.message,
            "file": name,
            "line": line,
            "column": column,
            "notes": diag.notes,
        });
        format!("{value}\n")
    }
}

fn source_line(source: &str, byte_offset: u32) -> &str {
    let offset = (byte_offset as usize).min(source.len());
    let start = source[..offset].rfind('\n').map_or(0, |pos| pos + 1);
    let end = source[offset..]
        .find('\n')
        .map_or(source.len(), |pos| offset + pos);
    &source[start..end]
}
