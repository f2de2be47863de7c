//! Lexical analyzer for script source text.
//!
//! Converts source text into [`Token`]s, skipping whitespace and `//` / `/* */`
//! comments. Malformed input is reported to the [`DiagnosticSink`] and
//! produces [`TokenKind::Error`] tokens so that parsing can continue.

use crate::token::{lookup_keyword, Token, TokenKind};
use ember_common::Span;
use ember_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};

/// Lexes script source into tokens. The result always ends with [`TokenKind::Eof`].
pub fn lex(source: &str, sink: &DiagnosticSink) -> Vec<Token> {
    let mut lexer = Lexer {
        source,
        bytes: source.as_bytes(),
        pos: 0,
        sink,
    };
    lexer.lex_all()
}

/// Decodes the escapes of a string literal. `raw` includes the quotes.
pub fn unescape_string(raw: &str) -> String {
    let inner = if raw.len() >= 2 {
        &raw[1..raw.len() - 1]
    } else {
        ""
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    sink: &'a DiagnosticSink,
}

impl Lexer<'_> {
    fn lex_all(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            if self.pos >= self.bytes.len() {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    span: Span::new(self.pos as u32, self.pos as u32),
                });
                break;
            }
            tokens.push(self.next_token());
        }
        tokens
    }

    fn peek(&self) -> u8 {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> u8 {
        self.bytes.get(self.pos + offset).copied().unwrap_or(0)
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start as u32, self.pos as u32)
    }

    fn error(&self, msg: &str, span: Span) {
        self.sink
            .emit(Diagnostic::error(DiagnosticCode::LEX, msg, span));
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            if self.peek() == b'/' && self.peek_at(1) == b'/' {
                while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
                    self.pos += 1;
                }
                continue;
            }
            if self.peek() == b'/' && self.peek_at(1) == b'*' {
                let start = self.pos;
                self.pos += 2;
                loop {
                    if self.pos >= self.bytes.len() {
                        self.error("unterminated block comment", self.span_from(start));
                        break;
                    }
                    if self.bytes[self.pos] == b'*' && self.peek_at(1) == b'/' {
                        self.pos += 2;
                        break;
                    }
                    self.pos += 1;
                }
                continue;
            }
            break;
        }
    }

    fn next_token(&mut self) -> Token {
        let start = self.pos;
        let b = self.peek();

        if is_ident_start(b) {
            while is_ident_continue(self.peek()) {
                self.pos += 1;
            }
            let text = &self.source[start..self.pos];
            let kind = lookup_keyword(text).unwrap_or(TokenKind::Identifier);
            return Token {
                kind,
                span: self.span_from(start),
            };
        }

        if b.is_ascii_digit() || (b == b'.' && self.peek_at(1).is_ascii_digit()) {
            return self.lex_number(start);
        }

        if b == b'\'' || b == b'"' {
            return self.lex_string(start, b);
        }

        self.lex_operator(start)
    }

    fn lex_number(&mut self, start: usize) -> Token {
        while self.peek().is_ascii_digit() {
            self.pos += 1;
        }
        if self.peek() == b'.' {
            self.pos += 1;
            while self.peek().is_ascii_digit() {
                self.pos += 1;
            }
        }
        if matches!(self.peek(), b'e' | b'E') {
            let sign = usize::from(matches!(self.peek_at(1), b'+' | b'-'));
            if self.peek_at(1 + sign).is_ascii_digit() {
                self.pos += 1 + sign;
                while self.peek().is_ascii_digit() {
                    self.pos += 1;
                }
            }
        }
        if is_ident_start(self.peek()) {
            while is_ident_continue(self.peek()) {
                self.pos += 1;
            }
            self.error("identifier starts immediately after numeric literal", self.span_from(start));
            return Token {
                kind: TokenKind::Error,
                span: self.span_from(start),
            };
        }
        Token {
            kind: TokenKind::Number,
            span: self.span_from(start),
        }
    }

    fn lex_string(&mut self, start: usize, quote: u8) -> Token {
        self.pos += 1;
        loop {
            match self.peek() {
                0 if self.pos >= self.bytes.len() => {
                    self.error("unterminated string literal", self.span_from(start));
                    return Token {
                        kind: TokenKind::Error,
                        span: self.span_from(start),
                    };
                }
                b'\n' => {
                    self.error("unterminated string literal", self.span_from(start));
                    return Token {
                        kind: TokenKind::Error,
                        span: self.span_from(start),
                    };
                }
                b'\\' => {
                    self.pos += 1;
                    if self.pos < self.bytes.len() {
                        self.pos += utf8_len(self.peek());
                    }
                }
                c if c == quote => {
                    self.pos += 1;
                    return Token {
                        kind: TokenKind::String,
                        span: self.span_from(start),
                    };
                }
                c => self.pos += utf8_len(c),
            }
        }
    }

    fn lex_operator(&mut self, start: usize) -> Token {
        let b = self.peek();
        let next = self.peek_at(1);
        let (kind, len) = match b {
            b'(' => (TokenKind::LeftParen, 1),
            b')' => (TokenKind::RightParen, 1),
            b'{' => (TokenKind::LeftBrace, 1),
            b'}' => (TokenKind::RightBrace, 1),
            b',' => (TokenKind::Comma, 1),
            b';' => (TokenKind::Semicolon, 1),
            b'+' => (TokenKind::Plus, 1),
            b'-' => (TokenKind::Minus, 1),
            b'*' => (TokenKind::Star, 1),
            b'/' => (TokenKind::Slash, 1),
            b'%' => (TokenKind::Percent, 1),
            b'=' if next == b'=' && self.peek_at(2) == b'=' => (TokenKind::EqEqEq, 3),
            b'=' if next == b'=' => (TokenKind::EqEq, 2),
            b'=' => (TokenKind::Assign, 1),
            b'!' if next == b'=' && self.peek_at(2) == b'=' => (TokenKind::NotEqEq, 3),
            b'!' if next == b'=' => (TokenKind::NotEq, 2),
            b'!' => (TokenKind::Bang, 1),
            b'<' if next == b'=' => (TokenKind::LessEq, 2),
            b'<' => (TokenKind::Less, 1),
            b'>' if next == b'=' => (TokenKind::GreaterEq, 2),
            b'>' => (TokenKind::Greater, 1),
            b'&' if next == b'&' => (TokenKind::AndAnd, 2),
            b'|' if next == b'|' => (TokenKind::OrOr, 2),
            _ => {
                self.pos += utf8_len(b);
                let span = self.span_from(start);
                let text = &self.source[start..self.pos];
                self.error(&format!("unexpected character '{text}'"), span);
                return Token {
                    kind: TokenKind::Error,
                    span,
                };
            }
        };
        self.pos += len;
        Token {
            kind,
            span: self.span_from(start),
        }
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Length of the UTF-8 sequence introduced by `lead`.
fn utf8_len(lead: u8) -> usize {
    match lead {
        0xF0..=0xFF => 4,
        0xE0..=0xEF => 3,
        0xC0..=0xDF => 2,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let sink = DiagnosticSink::new();
        let tokens = lex(source, &sink);
        assert!(!sink.has_errors(), "{:?}", sink.diagnostics());
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn function_declaration() {
        assert_eq!(
            kinds("function foo(){return 'Hello '}"),
            vec![
                TokenKind::Function,
                TokenKind::Identifier,
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::LeftBrace,
                TokenKind::Return,
                TokenKind::String,
                TokenKind::RightBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn maximal_munch_operators() {
        assert_eq!(
            kinds("a === b !== c == d != e <= f >= g && h || !i"),
            vec![
                TokenKind::Identifier,
                TokenKind::EqEqEq,
                TokenKind::Identifier,
                TokenKind::NotEqEq,
                TokenKind::Identifier,
                TokenKind::EqEq,
                TokenKind::Identifier,
                TokenKind::NotEq,
                TokenKind::Identifier,
                TokenKind::LessEq,
                TokenKind::Identifier,
                TokenKind::GreaterEq,
                TokenKind::Identifier,
                TokenKind::AndAnd,
                TokenKind::Identifier,
                TokenKind::OrOr,
                TokenKind::Bang,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn numbers() {
        let src = "1 2.5 .5 1e3 2E-2";
        let sink = DiagnosticSink::new();
        let tokens = lex(src, &sink);
        let texts: Vec<&str> = tokens[..5].iter().map(|t| t.span.text(src)).collect();
        assert_eq!(texts, vec!["1", "2.5", ".5", "1e3", "2E-2"]);
        assert!(tokens[..5].iter().all(|t| t.kind == TokenKind::Number));
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("// line\n/* block\n */ x"),
            vec![TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn unterminated_string_reports_error() {
        let sink = DiagnosticSink::new();
        let tokens = lex("'abc", &sink);
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert!(sink.has_errors());
    }

    #[test]
    fn unexpected_character() {
        let sink = DiagnosticSink::new();
        let tokens = lex("a # b", &sink);
        assert_eq!(tokens[1].kind, TokenKind::Error);
        assert_eq!(sink.error_count(), 1);
    }

    #[test]
    fn non_ascii_inside_string() {
        let src = "'héllo'";
        let sink = DiagnosticSink::new();
        let tokens = lex(src, &sink);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(unescape_string(tokens[0].span.text(src)), "héllo");
    }

    #[test]
    fn unescape() {
        assert_eq!(unescape_string(r#"'a\nb\'c\\'"#), "a\nb'c\\");
        assert_eq!(unescape_string(r#""tab\t""#), "tab\t");
    }
}
