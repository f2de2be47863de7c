//! Core parser infrastructure and top-level parsing.
//!
//! [`ScriptParser`] provides the primitive operations (advance, eat, expect)
//! and error recovery; statements live in `stmt.rs` and expressions in
//! `expr.rs`.

use crate::ast::Program;
use crate::token::{Token, TokenKind};
use ember_common::{Ident, Interner, Span};
use ember_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};

/// Nested expressions and statements deeper than this are rejected with a
/// [`DiagnosticCode::LIMIT`] error instead of being descended into.
pub const MAX_NESTING_DEPTH: usize = 512;

/// A recursive descent parser over a token stream.
///
/// Errors are reported to the diagnostic sink and represented as `Error`
/// nodes in the AST.
pub struct ScriptParser<'src> {
    pub(crate) tokens: Vec<Token>,
    pub(crate) pos: usize,
    pub(crate) source: &'src str,
    pub(crate) interner: &'src Interner,
    pub(crate) sink: &'src DiagnosticSink,
    depth: usize,
}

impl<'src> ScriptParser<'src> {
    /// Creates a parser over tokens lexed from `source`.
    pub fn new(
        tokens: Vec<Token>,
        source: &'src str,
        interner: &'src Interner,
        sink: &'src DiagnosticSink,
    ) -> Self {
        Self {
            tokens,
            pos: 0,
            source,
            interner,
            sink,
            depth: 0,
        }
    }

    // ========================================================================
    // Primitive operations
    // ========================================================================

    pub(crate) fn current(&self) -> TokenKind {
        self.tokens[self.pos].kind
    }

    pub(crate) fn current_span(&self) -> Span {
        self.tokens[self.pos].span
    }

    pub(crate) fn current_text(&self) -> &'src str {
        self.current_span().text(self.source)
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.current() == kind
    }

    pub(crate) fn at_eof(&self) -> bool {
        self.at(TokenKind::Eof)
    }

    pub(crate) fn peek_kind(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map_or(TokenKind::Eof, |t| t.kind)
    }

    pub(crate) fn prev_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            self.current_span()
        }
    }

    pub(crate) fn advance(&mut self) {
        if !self.at_eof() {
            self.pos += 1;
        }
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.expected(&kind.to_string());
            false
        }
    }

    /// Expects an identifier, returning `None` (after reporting) if absent.
    pub(crate) fn expect_ident(&mut self) -> Option<(Ident, Span)> {
        if self.at(TokenKind::Identifier) {
            let ident = self.interner.get_or_intern(self.current_text());
            let span = self.current_span();
            self.advance();
            Some((ident, span))
        } else {
            self.expected("identifier");
            None
        }
    }

    // ========================================================================
    // Error handling and recovery
    // ========================================================================

    pub(crate) fn error_at(&self, code: DiagnosticCode, msg: impl Into<String>, span: Span) {
        self.sink.emit(Diagnostic::error(code, msg, span));
    }

    pub(crate) fn expected(&self, what: &str) {
        // The lexer has already reported malformed tokens.
        if self.at(TokenKind::Error) {
            return;
        }
        self.error_at(
            DiagnosticCode::PARSE,
            format!("expected {what}, found {}", self.current()),
            self.current_span(),
        );
    }

    /// Enters one level of nesting. At [`MAX_NESTING_DEPTH`] this reports the
    /// limit, skips the nested construct and returns `false`; the caller must
    /// not descend and must not call [`exit_nesting`](Self::exit_nesting).
    pub(crate) fn enter_nesting(&mut self) -> bool {
        if self.depth < MAX_NESTING_DEPTH {
            self.depth += 1;
            return true;
        }
        self.error_at(
            DiagnosticCode::LIMIT,
            format!("nesting too deep (at most {MAX_NESTING_DEPTH} levels allowed)"),
            self.current_span(),
        );
        self.skip_balanced();
        false
    }

    pub(crate) fn exit_nesting(&mut self) {
        self.depth -= 1;
    }

    /// Skips a run of tokens with balanced brackets, stopping before an
    /// unmatched closer or a `;` outside any bracket.
    fn skip_balanced(&mut self) {
        let mut open = 0usize;
        while !self.at_eof() {
            match self.current() {
                TokenKind::LeftParen | TokenKind::LeftBrace => open += 1,
                TokenKind::RightParen | TokenKind::RightBrace => {
                    if open == 0 {
                        return;
                    }
                    open -= 1;
                }
                TokenKind::Semicolon if open == 0 => return,
                _ => {}
            }
            self.advance();
        }
    }

    /// Skips tokens until a plausible statement boundary, consuming a `;`.
    pub(crate) fn recover_to_statement_boundary(&mut self) {
        while !self.at_eof() {
            match self.current() {
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::RightBrace
                | TokenKind::Function
                | TokenKind::Let
                | TokenKind::Const
                | TokenKind::Var
                | TokenKind::Return
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Throw => return,
                _ => self.advance(),
            }
        }
    }

    // ========================================================================
    // Top-level parsing
    // ========================================================================

    /// Parses a complete script.
    pub fn parse_program(&mut self) -> Program {
        let mut body = Vec::new();
        while !self.at_eof() {
            let before = self.pos;
            body.push(self.parse_stmt());
            if self.pos == before {
                // No progress: skip the offending token.
                self.advance();
            }
        }
        let end = self.current_span().end;
        Program {
            body,
            span: Span::new(0, end),
        }
    }
}
