//! Statement parsing.

use crate::ast::{DeclKind, Expr, FunctionDecl, Stmt};
use crate::parser::ScriptParser;
use crate::token::TokenKind;
use ember_diagnostics::DiagnosticCode;

impl ScriptParser<'_> {
    /// Parses one statement.
    pub fn parse_stmt(&mut self) -> Stmt {
        let start = self.current_span();
        if !self.enter_nesting() {
            self.eat(TokenKind::Semicolon);
            return Stmt::Error(start.merge(self.prev_span()));
        }
        let stmt = self.parse_stmt_inner();
        self.exit_nesting();
        stmt
    }

    fn parse_stmt_inner(&mut self) -> Stmt {
        match self.current() {
            TokenKind::Function if self.peek_kind(1) == TokenKind::Identifier => {
                Stmt::Function(self.parse_function())
            }
            TokenKind::Let => self.parse_declare(DeclKind::Let),
            TokenKind::Const => self.parse_declare(DeclKind::Const),
            TokenKind::Var => self.parse_declare(DeclKind::Var),
            TokenKind::Return => self.parse_return(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Throw => self.parse_throw(),
            TokenKind::LeftBrace => self.parse_block(),
            TokenKind::Semicolon => {
                let span = self.current_span();
                self.advance();
                Stmt::Empty(span)
            }
            TokenKind::RightBrace => {
                let span = self.current_span();
                self.expected("statement");
                self.advance();
                Stmt::Error(span)
            }
            _ => {
                let start = self.current_span();
                let expr = self.parse_expr();
                if matches!(expr, Expr::Error(_)) {
                    self.recover_to_statement_boundary();
                    return Stmt::Error(start.merge(self.prev_span()));
                }
                self.eat(TokenKind::Semicolon);
                Stmt::Expr(expr)
            }
        }
    }

    /// Parses `function [name](params) { body }`. The current token is `function`.
    pub(crate) fn parse_function(&mut self) -> FunctionDecl {
        let start = self.current_span();
        self.expect(TokenKind::Function);
        let name = if self.at(TokenKind::Identifier) {
            self.expect_ident().map(|(ident, _)| ident)
        } else {
            None
        };

        let mut params = Vec::new();
        if self.expect(TokenKind::LeftParen) {
            while !self.at(TokenKind::RightParen) && !self.at_eof() {
                match self.expect_ident() {
                    Some(param) => params.push(param),
                    None => break,
                }
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RightParen);
        }

        let body = self.parse_braced_body();
        FunctionDecl {
            name,
            params,
            body,
            span: start.merge(self.prev_span()),
        }
    }

    fn parse_braced_body(&mut self) -> Vec<Stmt> {
        let mut body = Vec::new();
        if !self.expect(TokenKind::LeftBrace) {
            return body;
        }
        while !self.at(TokenKind::RightBrace) && !self.at_eof() {
            let before = self.pos;
            body.push(self.parse_stmt());
            if self.pos == before {
                self.advance();
            }
        }
        self.expect(TokenKind::RightBrace);
        body
    }

    fn parse_block(&mut self) -> Stmt {
        let start = self.current_span();
        let body = self.parse_braced_body();
        Stmt::Block {
            body,
            span: start.merge(self.prev_span()),
        }
    }

    fn parse_declare(&mut self, kind: DeclKind) -> Stmt {
        let start = self.current_span();
        self.advance();
        let Some((name, _)) = self.expect_ident() else {
            self.recover_to_statement_boundary();
            return Stmt::Error(start.merge(self.prev_span()));
        };
        let init = if self.eat(TokenKind::Assign) {
            Some(self.parse_expr())
        } else {
            None
        };
        if kind == DeclKind::Const && init.is_none() {
            self.error_at(
                DiagnosticCode::PARSE,
                "missing initializer in const declaration",
                start.merge(self.prev_span()),
            );
        }
        self.eat(TokenKind::Semicolon);
        Stmt::Declare {
            kind,
            name,
            init,
            span: start.merge(self.prev_span()),
        }
    }

    fn parse_return(&mut self) -> Stmt {
        let start = self.current_span();
        self.advance();
        let value = match self.current() {
            TokenKind::Semicolon | TokenKind::RightBrace | TokenKind::Eof => None,
            _ => Some(self.parse_expr()),
        };
        self.eat(TokenKind::Semicolon);
        Stmt::Return {
            value,
            span: start.merge(self.prev_span()),
        }
    }

    fn parse_throw(&mut self) -> Stmt {
        let start = self.current_span();
        self.advance();
        let value = self.parse_expr();
        self.eat(TokenKind::Semicolon);
        Stmt::Throw {
            value,
            span: start.merge(self.prev_span()),
        }
    }

    fn parse_if(&mut self) -> Stmt {
        let start = self.current_span();
        self.advance();
        self.expect(TokenKind::LeftParen);
        let condition = self.parse_expr();
        self.expect(TokenKind::RightParen);
        let then_branch = Box::new(self.parse_stmt());
        let else_branch = if self.eat(TokenKind::Else) {
            Some(Box::new(self.parse_stmt()))
        } else {
            None
        };
        Stmt::If {
            condition,
            then_branch,
            else_branch,
            span: start.merge(self.prev_span()),
        }
    }

    fn parse_while(&mut self) -> Stmt {
        let start = self.current_span();
        self.advance();
        self.expect(TokenKind::LeftParen);
        let condition = self.parse_expr();
        self.expect(TokenKind::RightParen);
        let body = Box::new(self.parse_stmt());
        Stmt::While {
            condition,
            body,
            span: start.merge(self.prev_span()),
        }
    }
}
