//! # lox-lang
//!
//! A tree-walking interpreter for a small subset of Lox: numbers, strings,
//! booleans, `nil`, variables, blocks and `print`.
//!
//! Source goes through three stages, each of which reports its own errors:
//! [`lexer::scan`], [`parser::parse`] and [`Interpreter::interpret`]. A stage
//! that reports errors stops the pipeline.

pub mod ast;
pub mod common;
pub mod environment;
pub mod interpreter;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod printer;
pub mod stack;
pub mod token;
pub mod value;

pub use common::{LoxError, ParseError, RuntimeError, ScanError};
pub use interpreter::Interpreter;
pub use output::Output;
pub use value::Value;

/// Scans, parses and executes `source` on `interpreter`.
///
/// Bindings made by earlier calls stay visible, which is what the REPL relies
/// on.
///
/// ```
/// use lox_lang::{run, Interpreter, Output};
///
/// let mut interpreter = Interpreter::with_output(Output::buffer());
/// run("var a = 1; { var a = 2; print a; } print a;", &mut interpreter).unwrap();
/// assert_eq!(interpreter.output().lines(), ["2", "1"]);
///
/// let error = run("print 1 + \"b\";", &mut interpreter).unwrap_err();
/// assert_eq!(error.to_string(), "[line 1] Error: Operands must be two numbers or two strings.");
/// ```
pub fn run(source: &str, interpreter: &mut Interpreter) -> Result<(), LoxError> {
    let (tokens, scan_errors) = lexer::scan(source);
    if !scan_errors.is_empty() {
        return Err(LoxError::Scan(scan_errors));
    }

    let (stmts, parse_errors) = parser::parse(&tokens);
    if !parse_errors.is_empty() {
        return Err(LoxError::Parse(parse_errors));
    }

    interpreter.interpret(&stmts)?;
    Ok(())
}
