//! Pratt expression parser.
//!
//! | BP (L,R)  | Operators |
//! |-----------|-----------|
//! | (1,2)     | `\|\|` |
//! | (3,4)     | `&&` |
//! | (5,6)     | `==` `!=` `===` `!==` |
//! | (7,8)     | `<` `<=` `>` `>=` |
//! | (9,10)    | `+` `-` |
//! | (11,12)   | `*` `/` `%` |
//! | prefix 13 | `!` `-` `+` `typeof` |
//! | postfix   | call `(...)` |
//!
//! Assignment is right-associative and sits below every binary operator.

use crate::ast::*;
use crate::lexer::unescape_string;
use crate::parser::ScriptParser;
use crate::token::TokenKind;
use ember_diagnostics::DiagnosticCode;

const PREFIX_BP: u8 = 13;

fn infix_binding_power(op: BinaryOp) -> (u8, u8) {
    match op {
        BinaryOp::Or => (1, 2),
        BinaryOp::And => (3, 4),
        BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::StrictEq | BinaryOp::StrictNotEq => (5, 6),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => (7, 8),
        BinaryOp::Add | BinaryOp::Sub => (9, 10),
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => (11, 12),
    }
}

impl ScriptParser<'_> {
    /// Parses an expression, including assignment.
    pub fn parse_expr(&mut self) -> Expr {
        let start = self.current_span();
        if !self.enter_nesting() {
            return Expr::Error(start);
        }
        let expr = self.parse_assignment();
        self.exit_nesting();
        expr
    }

    fn parse_assignment(&mut self) -> Expr {
        let lhs = self.parse_expr_bp(0);
        if !self.at(TokenKind::Assign) {
            return lhs;
        }
        let op_span = self.current_span();
        self.advance();
        let value = self.parse_expr();
        match lhs {
            Expr::Ident(target, span) => {
                let span = span.merge(value.span());
                Expr::Assign {
                    target,
                    value: Box::new(value),
                    span,
                }
            }
            Expr::Error(span) => Expr::Error(span.merge(value.span())),
            other => {
                self.error_at(
                    DiagnosticCode::ASSIGN_TARGET,
                    "invalid assignment target",
                    other.span().merge(op_span),
                );
                Expr::Error(other.span().merge(value.span()))
            }
        }
    }

    pub(crate) fn parse_expr_bp(&mut self, min_bp: u8) -> Expr {
        let start = self.current_span();
        if !self.enter_nesting() {
            return Expr::Error(start);
        }
        let expr = self.parse_operators(min_bp);
        self.exit_nesting();
        expr
    }

    fn parse_operators(&mut self, min_bp: u8) -> Expr {
        let mut lhs = self.parse_prefix_expr();

        loop {
            if self.at(TokenKind::LeftParen) {
                lhs = self.parse_call(lhs);
                continue;
            }

            let Some(op) = self.current_as_binary_op() else {
                break;
            };
            let (l_bp, r_bp) = infix_binding_power(op);
            if l_bp < min_bp {
                break;
            }
            self.advance();

            let rhs = self.parse_expr_bp(r_bp);
            let span = lhs.span().merge(rhs.span());
            lhs = Expr::Binary {
                left: Box::new(lhs),
                op,
                right: Box::new(rhs),
                span,
            };
        }

        lhs
    }

    fn parse_prefix_expr(&mut self) -> Expr {
        let start = self.current_span();

        if let Some(op) = self.current_as_unary_op() {
            self.advance();
            let operand = self.parse_expr_bp(PREFIX_BP);
            let span = start.merge(operand.span());
            return Expr::Unary {
                op,
                operand: Box::new(operand),
                span,
            };
        }

        match self.current() {
            TokenKind::Number => {
                let text = self.current_text();
                self.advance();
                match text.parse::<f64>() {
                    Ok(value) => Expr::Number(value, start),
                    Err(_) => {
                        self.error_at(
                            DiagnosticCode::LEX,
                            format!("invalid number literal `{text}`"),
                            start,
                        );
                        Expr::Error(start)
                    }
                }
            }
            TokenKind::String => {
                let value = unescape_string(self.current_text());
                self.advance();
                Expr::Str(value, start)
            }
            TokenKind::True | TokenKind::False => {
                let value = self.at(TokenKind::True);
                self.advance();
                Expr::Bool(value, start)
            }
            TokenKind::Null => {
                self.advance();
                Expr::Null(start)
            }
            TokenKind::Undefined => {
                self.advance();
                Expr::Undefined(start)
            }
            TokenKind::Identifier => {
                let ident = self.interner.get_or_intern(self.current_text());
                self.advance();
                Expr::Ident(ident, start)
            }
            TokenKind::Function => Expr::Function(Box::new(self.parse_function())),
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_expr();
                self.expect(TokenKind::RightParen);
                inner
            }
            TokenKind::Error => {
                self.advance();
                Expr::Error(start)
            }
            _ => {
                self.expected("expression");
                Expr::Error(start)
            }
        }
    }

    fn parse_call(&mut self, callee: Expr) -> Expr {
        self.advance(); // (
        let mut args = Vec::new();
        while !self.at(TokenKind::RightParen) && !self.at_eof() {
            args.push(self.parse_expr());
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RightParen);
        let span = callee.span().merge(self.prev_span());
        Expr::Call {
            callee: Box::new(callee),
            args,
            span,
        }
    }

    fn current_as_binary_op(&self) -> Option<BinaryOp> {
        let op = match self.current() {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Mod,
            TokenKind::Less => BinaryOp::Lt,
            TokenKind::LessEq => BinaryOp::Le,
            TokenKind::Greater => BinaryOp::Gt,
            TokenKind::GreaterEq => BinaryOp::Ge,
            TokenKind::EqEq => BinaryOp::Eq,
            TokenKind::NotEq => BinaryOp::NotEq,
            TokenKind::EqEqEq => BinaryOp::StrictEq,
            TokenKind::NotEqEq => BinaryOp::StrictNotEq,
            TokenKind::AndAnd => BinaryOp::And,
            TokenKind::OrOr => BinaryOp::Or,
            _ => return None,
        };
        Some(op)
    }

    fn current_as_unary_op(&self) -> Option<UnaryOp> {
        match self.current() {
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Typeof => Some(UnaryOp::Typeof),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::lexer;
    use crate::parser::ScriptParser;
    use ember_common::Interner;
    use ember_diagnostics::DiagnosticSink;

    use super::*;

    fn parse_expr_str(source: &str) -> Expr {
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let tokens = lexer::lex(source, &sink);
        let mut parser = ScriptParser::new(tokens, source, &interner, &sink);
        let expr = parser.parse_expr();
        assert!(
            !sink.has_errors(),
            "unexpected errors: {:?}",
            sink.diagnostics()
        );
        expr
    }

    #[test]
    fn number_literal() {
        assert!(matches!(parse_expr_str("42"), Expr::Number(n, _) if n == 42.0));
        assert!(matches!(parse_expr_str("1.5e2"), Expr::Number(n, _) if n == 150.0));
    }

    #[test]
    fn string_literal_unescaped() {
        match parse_expr_str("'Hello\\n'") {
            Expr::Str(s, _) => assert_eq!(s, "Hello\n"),
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn keyword_literals() {
        assert!(matches!(parse_expr_str("true"), Expr::Bool(true, _)));
        assert!(matches!(parse_expr_str("null"), Expr::Null(_)));
        assert!(matches!(parse_expr_str("undefined"), Expr::Undefined(_)));
    }

    #[test]
    fn multiplication_binds_tighter() {
        match parse_expr_str("1 + 2 * 3") {
            Expr::Binary { op, right, .. } => {
                assert_eq!(op, BinaryOp::Add);
                assert!(matches!(*right, Expr::Binary { op: BinaryOp::Mul, .. }));
            }
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn addition_is_left_associative() {
        match parse_expr_str("a + b + c") {
            Expr::Binary { left, op, .. } => {
                assert_eq!(op, BinaryOp::Add);
                assert!(matches!(*left, Expr::Binary { op: BinaryOp::Add, .. }));
            }
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn logical_precedence() {
        match parse_expr_str("a || b && c") {
            Expr::Binary { op, right, .. } => {
                assert_eq!(op, BinaryOp::Or);
                assert!(matches!(*right, Expr::Binary { op: BinaryOp::And, .. }));
            }
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn unary_binds_tighter_than_binary() {
        match parse_expr_str("-a * b") {
            Expr::Binary { left, op, .. } => {
                assert_eq!(op, BinaryOp::Mul);
                assert!(matches!(*left, Expr::Unary { op: UnaryOp::Neg, .. }));
            }
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn typeof_operator() {
        assert!(matches!(
            parse_expr_str("typeof x"),
            Expr::Unary { op: UnaryOp::Typeof, .. }
        ));
    }

    #[test]
    fn parenthesized_grouping() {
        match parse_expr_str("(1 + 2) * 3") {
            Expr::Binary { left, op, .. } => {
                assert_eq!(op, BinaryOp::Mul);
                assert!(matches!(*left, Expr::Binary { op: BinaryOp::Add, .. }));
            }
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn call_with_arguments() {
        match parse_expr_str("f(1, 'x', g())") {
            Expr::Call { callee, args, .. } => {
                assert!(matches!(*callee, Expr::Ident(..)));
                assert_eq!(args.len(), 3);
                assert!(matches!(args[2], Expr::Call { .. }));
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn chained_calls() {
        match parse_expr_str("f()()") {
            Expr::Call { callee, .. } => assert!(matches!(*callee, Expr::Call { .. })),
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn call_binds_tighter_than_addition() {
        match parse_expr_str("foo() + bar()") {
            Expr::Binary { left, right, .. } => {
                assert!(matches!(*left, Expr::Call { .. }));
                assert!(matches!(*right, Expr::Call { .. }));
            }
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn assignment_is_right_associative() {
        match parse_expr_str("a = b = 1") {
            Expr::Assign { value, .. } => assert!(matches!(*value, Expr::Assign { .. })),
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn function_expression() {
        match parse_expr_str("function (x, y) { return x }") {
            Expr::Function(f) => {
                assert!(f.name.is_none());
                assert_eq!(f.params.len(), 2);
                assert_eq!(f.body.len(), 1);
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn invalid_assignment_target_reported() {
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let source = "1 = 2";
        let tokens = lexer::lex(source, &sink);
        let mut parser = ScriptParser::new(tokens, source, &interner, &sink);
        let expr = parser.parse_expr();
        assert!(matches!(expr, Expr::Error(_)));
        let diags = sink.take_all();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagnosticCode::ASSIGN_TARGET);
    }

    #[test]
    fn missing_operand_reported() {
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let source = "1 +";
        let tokens = lexer::lex(source, &sink);
        let mut parser = ScriptParser::new(tokens, source, &interner, &sink);
        let _ = parser.parse_expr();
        assert!(sink.has_errors());
    }

    #[test]
    fn deep_parentheses_hit_nesting_limit() {
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let source = format!("{}1{}", "(".repeat(5000), ")".repeat(5000));
        let tokens = lexer::lex(&source, &sink);
        let mut parser = ScriptParser::new(tokens, &source, &interner, &sink);
        let expr = parser.parse_expr();
        assert!(matches!(expr, Expr::Error(_)));
        assert!(parser.at_eof());
        let diags = sink.take_all();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagnosticCode::LIMIT);
    }

    #[test]
    fn long_unary_chain_hits_nesting_limit() {
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let source = format!("{}x", "!".repeat(5000));
        let tokens = lexer::lex(&source, &sink);
        let mut parser = ScriptParser::new(tokens, &source, &interner, &sink);
        let _ = parser.parse_expr();
        let diags = sink.take_all();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagnosticCode::LIMIT);
    }

    #[test]
    fn moderate_nesting_parses() {
        let source = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        assert!(matches!(parse_expr_str(&source), Expr::Number(n, _) if n == 1.0));
    }
}
