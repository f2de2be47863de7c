//! Token types for the script lexer.

use ember_common::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A token kind.
///
/// Literal values are not stored in the token; the parser reads them from
/// the source text through the token's span.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum TokenKind {
    // === Keywords ===
    /// `const`
    Const,
    /// `else`
    Else,
    /// `false`
    False,
    /// `function`
    Function,
    /// `if`
    If,
    /// `let`
    Let,
    /// `null`
    Null,
    /// `return`
    Return,
    /// `throw`
    Throw,
    /// `true`
    True,
    /// `typeof`
    Typeof,
    /// `undefined`
    Undefined,
    /// `var`
    Var,
    /// `while`
    While,

    // === Literals ===
    /// An identifier.
    Identifier,
    /// A numeric literal.
    Number,
    /// A single- or double-quoted string literal.
    String,

    // === Punctuation ===
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `,`
    Comma,
    /// `;`
    Semicolon,

    // === Operators ===
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `!`
    Bang,
    /// `=`
    Assign,
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    /// `===`
    EqEqEq,
    /// `!==`
    NotEqEq,
    /// `<`
    Less,
    /// `<=`
    LessEq,
    /// `>`
    Greater,
    /// `>=`
    GreaterEq,
    /// `&&`
    AndAnd,
    /// `||`
    OrOr,

    // === Special ===
    /// A malformed token; a diagnostic has already been emitted.
    Error,
    /// End of input.
    Eof,
}

impl TokenKind {
    /// Returns `true` for keywords that may not be used as identifiers.
    pub fn is_keyword(self) -> bool {
        lookup_keyword_kinds().contains(&self)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Const => "'const'",
            TokenKind::Else => "'else'",
            TokenKind::False => "'false'",
            TokenKind::Function => "'function'",
            TokenKind::If => "'if'",
            TokenKind::Let => "'let'",
            TokenKind::Null => "'null'",
            TokenKind::Return => "'return'",
            TokenKind::Throw => "'throw'",
            TokenKind::True => "'true'",
            TokenKind::Typeof => "'typeof'",
            TokenKind::Undefined => "'undefined'",
            TokenKind::Var => "'var'",
            TokenKind::While => "'while'",
            TokenKind::Identifier => "identifier",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::LeftParen => "'('",
            TokenKind::RightParen => "')'",
            TokenKind::LeftBrace => "'{'",
            TokenKind::RightBrace => "'}'",
            TokenKind::Comma => "','",
            TokenKind::Semicolon => "';'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Bang => "'!'",
            TokenKind::Assign => "'='",
            TokenKind::EqEq => "'=='",
            TokenKind::NotEq => "'!='",
            TokenKind::EqEqEq => "'==='",
            TokenKind::NotEqEq => "'!=='",
            TokenKind::Less => "'<'",
            TokenKind::LessEq => "'<='",
            TokenKind::Greater => "'>'",
            TokenKind::GreaterEq => "'>='",
            TokenKind::AndAnd => "'&&'",
            TokenKind::OrOr => "'||'",
            TokenKind::Error => "invalid token",
            TokenKind::Eof => "end of input",
        };
        f.write_str(text)
    }
}

/// A token: its kind and where it came from.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Token {
    /// The token kind.
    pub kind: TokenKind,
    /// The source span of the token text.
    pub span: Span,
}

/// Looks up a keyword by its exact spelling.
pub fn lookup_keyword(text: &str) -> Option<TokenKind> {
    match text {
        "const" => Some(TokenKind::Const),
        "else" => Some(TokenKind::Else),
        "false" => Some(TokenKind::False),
        "function" => Some(TokenKind::Function),
        "if" => Some(TokenKind::If),
        "let" => Some(TokenKind::Let),
        "null" => Some(TokenKind::Null),
        "return" => Some(TokenKind::Return),
        "throw" => Some(TokenKind::Throw),
        "true" => Some(TokenKind::True),
        "typeof" => Some(TokenKind::Typeof),
        "undefined" => Some(TokenKind::Undefined),
        "var" => Some(TokenKind::Var),
        "while" => Some(TokenKind::While),
        _ => None,
    }
}

fn lookup_keyword_kinds() -> &'static [TokenKind] {
    &[
        TokenKind::Const,
        TokenKind::Else,
        TokenKind::False,
        TokenKind::Function,
        TokenKind::If,
        TokenKind::Let,
        TokenKind::Null,
        TokenKind::Return,
        TokenKind::Throw,
        TokenKind::True,
        TokenKind::Typeof,
        TokenKind::Undefined,
        TokenKind::Var,
        TokenKind::While,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_case_sensitive() {
        assert_eq!(lookup_keyword("function"), Some(TokenKind::Function));
        assert_eq!(lookup_keyword("Function"), None);
        assert_eq!(lookup_keyword("foo"), None);
    }

    #[test]
    fn is_keyword() {
        assert!(TokenKind::Return.is_keyword());
        assert!(!TokenKind::Identifier.is_keyword());
        assert!(!TokenKind::Plus.is_keyword());
    }

    #[test]
    fn display_quotes_punctuation() {
        assert_eq!(TokenKind::RightParen.to_string(), "')'");
        assert_eq!(TokenKind::Eof.to_string(), "end of input");
    }
}
