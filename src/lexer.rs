use tracing::debug;

use crate::{
    common::ScanError,
    token::{Literal, Token, TokenKind},
};

#[derive(Debug, Clone)]
pub struct Lexer {
    source: Vec<char>,
    tokens: Vec<Token>,
    errors: Vec<ScanError>,

    start: usize,
    current: usize,
    line: usize,
}

impl Lexer {
    pub fn from_str(source: &str) -> Self {
        Lexer {
            source: source.chars().collect(),
            tokens: Vec::new(),
            errors: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
        }
    }

    fn at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> char {
        let c = self.peek();
        self.current += 1;
        c
    }

    // '\0' stands in for end of input
    fn peek(&self) -> char {
        self.source.get(self.current).copied().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        self.source.get(self.current + 1).copied().unwrap_or('\0')
    }

    fn matches(&mut self, expected: char) -> bool {
        if self.at_end() || self.source[self.current] != expected {
            return false;
        }

        self.current += 1;
        true
    }

    fn lexeme(&self) -> String {
        self.source[self.start..self.current].iter().collect()
    }

    fn push_token(&mut self, kind: TokenKind) {
        let token = Token::new(kind, self.lexeme(), self.line);
        self.tokens.push(token);
    }

    fn push_literal(&mut self, kind: TokenKind, literal: Literal) {
        let token = Token::new(kind, self.lexeme(), self.line).with_literal(literal);
        self.tokens.push(token);
    }

    fn error(&mut self, line: usize, message: &str) {
        self.errors.push(ScanError {
            line,
            message: message.into(),
        });
    }

    fn lex_string(&mut self) {
        let start_line = self.line;

        while !self.at_end() && self.peek() != '"' {
            if self.peek() == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.at_end() {
            self.error(start_line, "Unterminated string.");
            return;
        }

        self.advance(); // the closing '"'

        let contents = self.source[self.start + 1..self.current - 1]
            .iter()
            .collect();
        self.push_literal(TokenKind::String, Literal::String(contents));
    }

    fn lex_number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        // digits with at most one inner '.', always a valid f64
        let number = self.lexeme().parse().unwrap_or_default();
        self.push_literal(TokenKind::Number, Literal::Number(number));
    }

    fn lex_ident(&mut self) {
        while is_ident_continue(self.peek()) {
            self.advance();
        }

        let kind = TokenKind::from_keyword_str(&self.lexeme()).unwrap_or(TokenKind::Ident);
        self.push_token(kind);
    }

    fn lex_token(&mut self) {
        let c = self.advance();

        match c {
            '(' => self.push_token(TokenKind::LeftParen),
            ')' => self.push_token(TokenKind::RightParen),
            '{' => self.push_token(TokenKind::LeftBrace),
            '}' => self.push_token(TokenKind::RightBrace),
            ',' => self.push_token(TokenKind::Comma),
            '.' => self.push_token(TokenKind::Dot),
            '-' => self.push_token(TokenKind::Minus),
            '+' => self.push_token(TokenKind::Plus),
            ';' => self.push_token(TokenKind::Semicolon),
            '*' => self.push_token(TokenKind::Star),
            '!' => {
                if self.matches('=') {
                    self.push_token(TokenKind::BangEqual)
                } else {
                    self.push_token(TokenKind::Bang)
                }
            }
            '=' => {
                if self.matches('=') {
                    self.push_token(TokenKind::EqualEqual)
                } else {
                    self.push_token(TokenKind::Equal)
                }
            }
            '<' => {
                if self.matches('=') {
                    self.push_token(TokenKind::LessEqual)
                } else {
                    self.push_token(TokenKind::Less)
                }
            }
            '>' => {
                if self.matches('=') {
                    self.push_token(TokenKind::GreaterEqual)
                } else {
                    self.push_token(TokenKind::Greater)
                }
            }
            '/' => {
                if self.matches('/') {
                    while !self.at_end() && self.peek() != '\n' {
                        self.advance();
                    }
                } else {
                    self.push_token(TokenKind::Slash)
                }
            }

            ' ' | '\r' | '\t' => {}
            '\n' => self.line += 1,

            '"' => self.lex_string(),

            _ if c.is_ascii_digit() => self.lex_number(),
            _ if is_ident_start(c) => self.lex_ident(),

            _ => self.error(self.line, "Unexpected character."),
        }
    }

    pub fn lex(mut self) -> (Vec<Token>, Vec<ScanError>) {
        while !self.at_end() {
            self.start = self.current;
            self.lex_token();
        }

        self.tokens.push(Token::new(TokenKind::Eof, "", self.line));

        debug!(
            tokens = self.tokens.len(),
            errors = self.errors.len(),
            "scanned source"
        );

        (self.tokens, self.errors)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

/// Scans `source` into tokens, always terminated by a single EOF token.
pub fn scan(source: &str) -> (Vec<Token>, Vec<ScanError>) {
    Lexer::from_str(source).lex()
}
