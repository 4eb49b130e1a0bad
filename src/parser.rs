use std::borrow::Cow;

use tracing::{debug, trace};

use crate::{
    ast,
    common::ParseError,
    stack::ensure_sufficient_stack,
    token::{Token, TokenKind},
    value::Value,
};

#[derive(Debug, Clone)]
struct Parser<'a> {
    tokens: &'a [Token],
    current: usize,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Parser {
            tokens,
            current: 0,
            errors: Vec::new(),
        }
    }

    // `parse` guarantees a trailing EOF, so `current` never runs past it.
    fn peek(&self) -> &'a Token {
        let idx = self.current.min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn previous(&self) -> &'a Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn check(&self, kind: TokenKind) -> bool {
        !self.at_end() && self.peek().kind == kind
    }

    fn advance(&mut self) -> &'a Token {
        if !self.at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn matches(&mut self, kinds: &[TokenKind]) -> bool {
        if kinds.iter().any(|kind| self.check(*kind)) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Result<&'a Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.peek().parse_error(message))
        }
    }

    /// Skips to the next statement boundary after a syntax error.
    fn synchronize(&mut self) {
        self.advance();

        while !self.at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }

            if self.peek().kind.starts_declaration() {
                return;
            }

            self.advance();
        }
    }

    fn parse_declaration(&mut self) -> Option<ast::Stmt> {
        let result = ensure_sufficient_stack(|| {
            if self.matches(&[TokenKind::Var]) {
                self.parse_var_decl()
            } else {
                self.parse_stmt()
            }
        });

        match result {
            Ok(stmt) => Some(stmt),
            Err(error) => {
                trace!(%error, "synchronizing after parse error");
                self.errors.push(error);
                self.synchronize();
                None
            }
        }
    }

    fn parse_var_decl(&mut self) -> Result<ast::Stmt, ParseError> {
        let ident = self.expect(TokenKind::Ident, "Expect variable name.")?.clone();

        let init = if self.matches(&[TokenKind::Equal]) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        self.expect(
            TokenKind::Semicolon,
            "Expect ';' after variable declaration.",
        )?;

        Ok(ast::VarDecl { ident, init }.into())
    }

    fn parse_stmt(&mut self) -> Result<ast::Stmt, ParseError> {
        if self.matches(&[TokenKind::Print]) {
            let keyword = self.previous().clone();
            let expr = self.parse_expr()?;
            self.expect(TokenKind::Semicolon, "Expect ';' after value.")?;
            return Ok(ast::PrintStmt { keyword, expr }.into());
        }

        if self.matches(&[TokenKind::LeftBrace]) {
            return Ok(self.parse_block()?.into());
        }

        let expr = self.parse_expr()?;
        self.expect(TokenKind::Semicolon, "Expect ';' after expression.")?;
        Ok(ast::ExprStmt { expr }.into())
    }

    // Errors inside the block are recovered by `parse_declaration`; only the
    // closing brace can fail here.
    fn parse_block(&mut self) -> Result<ast::Block, ParseError> {
        let mut stmts = Vec::new();

        while !self.check(TokenKind::RightBrace) && !self.at_end() {
            if let Some(stmt) = self.parse_declaration() {
                stmts.push(stmt);
            }
        }

        self.expect(TokenKind::RightBrace, "Expect '}' after block.")?;

        Ok(ast::Block { stmts })
    }

    fn parse_expr(&mut self) -> Result<ast::Expr, ParseError> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<ast::Expr, ParseError> {
        ensure_sufficient_stack(|| {
            let expr = self.parse_equality()?;

            if self.matches(&[TokenKind::Equal]) {
                let equals = self.previous();
                let value = self.parse_assignment()?;

                if let ast::Expr::Var(var_expr) = &expr {
                    return Ok(ast::AssignExpr {
                        ident: var_expr.ident.clone(),
                        value: Box::new(value),
                    }
                    .into());
                }

                // reported, but the parse carries on with the left-hand side
                self.errors
                    .push(equals.parse_error("Invalid assignment target."));
            }

            Ok(expr)
        })
    }

    /// Parses one left-associative precedence level.
    fn parse_binary(
        &mut self,
        ops: &[TokenKind],
        operand: fn(&mut Self) -> Result<ast::Expr, ParseError>,
    ) -> Result<ast::Expr, ParseError> {
        let mut expr = operand(self)?;

        while self.matches(ops) {
            let op = self.previous().clone();
            let right = operand(self)?;
            expr = ast::BinaryExpr {
                op,
                left: Box::new(expr),
                right: Box::new(right),
            }
            .into();
        }

        Ok(expr)
    }

    fn parse_equality(&mut self) -> Result<ast::Expr, ParseError> {
        self.parse_binary(
            &[TokenKind::BangEqual, TokenKind::EqualEqual],
            Self::parse_comparison,
        )
    }

    fn parse_comparison(&mut self) -> Result<ast::Expr, ParseError> {
        self.parse_binary(
            &[
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
            ],
            Self::parse_term,
        )
    }

    fn parse_term(&mut self) -> Result<ast::Expr, ParseError> {
        self.parse_binary(&[TokenKind::Minus, TokenKind::Plus], Self::parse_factor)
    }

    fn parse_factor(&mut self) -> Result<ast::Expr, ParseError> {
        self.parse_binary(&[TokenKind::Slash, TokenKind::Star], Self::parse_unary)
    }

    fn parse_unary(&mut self) -> Result<ast::Expr, ParseError> {
        ensure_sufficient_stack(|| {
            if self.matches(&[TokenKind::Bang, TokenKind::Minus]) {
                let op = self.previous().clone();
                let expr = self.parse_unary()?;
                return Ok(ast::UnaryExpr {
                    op,
                    expr: Box::new(expr),
                }
                .into());
            }

            self.parse_primary()
        })
    }

    fn parse_primary(&mut self) -> Result<ast::Expr, ParseError> {
        let token = self.peek();

        let expr = match token.kind {
            TokenKind::False => ast::Lit {
                value: Value::Bool(false),
            }
            .into(),
            TokenKind::True => ast::Lit {
                value: Value::Bool(true),
            }
            .into(),
            TokenKind::Nil => ast::Lit { value: Value::Nil }.into(),
            TokenKind::Number | TokenKind::String => match &token.literal {
                Some(literal) => ast::Lit {
                    value: literal.clone().into(),
                }
                .into(),
                None => return Err(token.parse_error("Expect expression.")),
            },
            TokenKind::Ident => ast::VarExpr {
                ident: token.clone(),
            }
            .into(),
            TokenKind::LeftParen => {
                self.advance();
                let inner = ensure_sufficient_stack(|| self.parse_expr())?;
                self.expect(TokenKind::RightParen, "Expect ')' after expression.")?;
                return Ok(ast::Grouping {
                    expr: Box::new(inner),
                }
                .into());
            }
            _ => return Err(token.parse_error("Expect expression.")),
        };

        self.advance();
        Ok(expr)
    }
}

/// Parses a token sequence, normally the output of [`crate::lexer::scan`].
///
/// A sequence that does not end in EOF is parsed as if it did. Statements
/// that failed to parse are dropped and their errors collected, so the
/// statements are only safe to execute when the error list is empty.
pub fn parse(tokens: &[Token]) -> (Vec<ast::Stmt>, Vec<ParseError>) {
    let mut stmts = Vec::new();

    let tokens = match tokens.last() {
        None => return (stmts, Vec::new()),
        Some(last) if last.kind == TokenKind::Eof => Cow::Borrowed(tokens),
        Some(last) => {
            let mut owned = tokens.to_vec();
            owned.push(Token::new(TokenKind::Eof, "", last.line));
            Cow::Owned(owned)
        }
    };

    let mut parser = Parser::new(&tokens);
    while !parser.at_end() {
        if let Some(stmt) = parser.parse_declaration() {
            stmts.push(stmt);
        }
    }

    debug!(
        statements = stmts.len(),
        errors = parser.errors.len(),
        "parsed tokens"
    );

    (stmts, parser.errors)
}
