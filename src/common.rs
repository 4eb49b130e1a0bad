//! Diagnostics shared by every stage of the pipeline.
//!
//! Each stage owns one error type. Their `Display` output is the exact
//! diagnostic text printed to the user.

use thiserror::Error;

use crate::token::{Token, TokenKind};

/// A lexical error. Collected; scanning continues past it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("[line {line}] Error: {message}")]
pub struct ScanError {
    pub line: usize,
    pub message: String,
}

/// A syntax error at a specific token.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("[line {}] Error{}: {}", .token.line, location(.token), .message)]
pub struct ParseError {
    pub token: Token,
    pub message: String,
}

/// A failed dynamic check during execution. The first one ends the run.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("[line {}] Error: {}", .token.line, .message)]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl Token {
    pub fn parse_error(&self, message: &str) -> ParseError {
        ParseError {
            token: self.clone(),
            message: message.into(),
        }
    }

    pub fn runtime_error(&self, message: impl Into<String>) -> RuntimeError {
        RuntimeError {
            token: self.clone(),
            message: message.into(),
        }
    }
}

fn location(token: &Token) -> String {
    if token.kind == TokenKind::Eof {
        " at end".to_string()
    } else {
        format!(" at '{}'", token.lexeme)
    }
}

/// The failure of one pass through the pipeline, tagged by the stage that
/// stopped it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoxError {
    #[error("{}", join_lines(.0))]
    Scan(Vec<ScanError>),
    #[error("{}", join_lines(.0))]
    Parse(Vec<ParseError>),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl LoxError {
    /// True for errors found before anything was executed.
    pub fn is_static(&self) -> bool {
        matches!(self, LoxError::Scan(_) | LoxError::Parse(_))
    }
}

fn join_lines<T: ToString>(errors: &[T]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_error_names_the_offending_lexeme() {
        let token = Token::new(TokenKind::Ident, "foo", 4);
        assert_eq!(
            token.parse_error("Expect ';' after value.").to_string(),
            "[line 4] Error at 'foo': Expect ';' after value."
        );
    }

    #[test]
    fn parse_error_at_eof_says_at_end() {
        let token = Token::new(TokenKind::Eof, "", 9);
        assert_eq!(
            token.parse_error("Expect expression.").to_string(),
            "[line 9] Error at end: Expect expression."
        );
    }

    #[test]
    fn scan_and_runtime_errors_have_no_location() {
        let scan = ScanError {
            line: 2,
            message: "Unexpected character.".into(),
        };
        assert_eq!(scan.to_string(), "[line 2] Error: Unexpected character.");

        let runtime = Token::new(TokenKind::Ident, "x", 7).runtime_error("Undefined variable 'x'.");
        assert_eq!(runtime.to_string(), "[line 7] Error: Undefined variable 'x'.");
    }

    #[test]
    fn lox_error_renders_one_diagnostic_per_line() {
        let error = LoxError::Scan(vec![
            ScanError {
                line: 1,
                message: "Unexpected character.".into(),
            },
            ScanError {
                line: 3,
                message: "Unterminated string.".into(),
            },
        ]);
        assert!(error.is_static());
        assert_eq!(
            error.to_string(),
            "[line 1] Error: Unexpected character.\n[line 3] Error: Unterminated string."
        );
    }
}
