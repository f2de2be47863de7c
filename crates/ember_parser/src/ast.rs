//! AST node types produced by the script parser.
//!
//! Every node carries its source [`Span`]. Parse errors are represented by
//! `Error` variants so that later stages can skip them after diagnostics
//! have been reported.

use ember_common::{Ident, Span};
use serde::{Deserialize, Serialize};

/// A parsed script: the top-level statement list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Top-level statements in source order.
    pub body: Vec<Stmt>,
    /// Span of the whole script.
    pub span: Span,
}

/// A function declaration or function expression.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    /// The function name; `None` for anonymous function expressions.
    pub name: Option<Ident>,
    /// Parameter names in order.
    pub params: Vec<(Ident, Span)>,
    /// The function body.
    pub body: Vec<Stmt>,
    /// Span of the whole function.
    pub span: Span,
}

/// The declaration keyword used for a variable.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum DeclKind {
    /// `var`
    Var,
    /// `let`
    Let,
    /// `const`
    Const,
}

/// A statement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// `function name(...) { ... }`
    Function(FunctionDecl),
    /// `let|const|var name [= init]`
    Declare {
        /// The declaration keyword.
        kind: DeclKind,
        /// The declared name.
        name: Ident,
        /// The initializer, if any.
        init: Option<Expr>,
        /// Source span.
        span: Span,
    },
    /// `return [value]`
    Return {
        /// The returned expression, if any.
        value: Option<Expr>,
        /// Source span.
        span: Span,
    },
    /// `if (condition) then [else otherwise]`
    If {
        /// The condition.
        condition: Expr,
        /// The consequent.
        then_branch: Box<Stmt>,
        /// The alternative, if any.
        else_branch: Option<Box<Stmt>>,
        /// Source span.
        span: Span,
    },
    /// `while (condition) body`
    While {
        /// The loop condition.
        condition: Expr,
        /// The loop body.
        body: Box<Stmt>,
        /// Source span.
        span: Span,
    },
    /// `throw value`
    Throw {
        /// The thrown expression.
        value: Expr,
        /// Source span.
        span: Span,
    },
    /// `{ ... }`
    Block {
        /// The statements of the block.
        body: Vec<Stmt>,
        /// Source span.
        span: Span,
    },
    /// An expression evaluated for its value or side effects.
    Expr(Expr),
    /// A lone `;`.
    Empty(Span),
    /// A statement that failed to parse.
    Error(Span),
}

impl Stmt {
    /// Returns the source span of this statement.
    pub fn span(&self) -> Span {
        match self {
            Stmt::Function(f) => f.span,
            Stmt::Declare { span, .. }
            | Stmt::Return { span, .. }
            | Stmt::If { span, .. }
            | Stmt::While { span, .. }
            | Stmt::Throw { span, .. }
            | Stmt::Block { span, .. } => *span,
            Stmt::Expr(e) => e.span(),
            Stmt::Empty(span) | Stmt::Error(span) => *span,
        }
    }
}

/// Binary operators, including the short-circuiting logical ones.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `===`
    StrictEq,
    /// `!==`
    StrictNotEq,
    /// `&&`
    And,
    /// `||`
    Or,
}

/// Prefix operators.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `!`
    Not,
    /// `-`
    Neg,
    /// `+`
    Plus,
    /// `typeof`
    Typeof,
}

/// An expression.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// A numeric literal.
    Number(f64, Span),
    /// A string literal with escapes decoded.
    Str(String, Span),
    /// `true` / `false`.
    Bool(bool, Span),
    /// `null`.
    Null(Span),
    /// `undefined`.
    Undefined(Span),
    /// A variable reference.
    Ident(Ident, Span),
    /// `name = value`
    Assign {
        /// The assigned variable.
        target: Ident,
        /// The assigned value.
        value: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// `left op right`
    Binary {
        /// Left operand.
        left: Box<Expr>,
        /// The operator.
        op: BinaryOp,
        /// Right operand.
        right: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// `op operand`
    Unary {
        /// The operator.
        op: UnaryOp,
        /// The operand.
        operand: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// `callee(args...)`
    Call {
        /// The called expression.
        callee: Box<Expr>,
        /// Arguments in order.
        args: Vec<Expr>,
        /// Source span.
        span: Span,
    },
    /// `function [name](...) { ... }` in expression position.
    Function(Box<FunctionDecl>),
    /// An expression that failed to parse.
    Error(Span),
}

impl Expr {
    /// Returns the source span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Expr::Number(_, span)
            | Expr::Str(_, span)
            | Expr::Bool(_, span)
            | Expr::Null(span)
            | Expr::Undefined(span)
            | Expr::Ident(_, span)
            | Expr::Error(span) => *span,
            Expr::Assign { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Call { span, .. } => *span,
            Expr::Function(f) => f.span,
        }
    }
}
