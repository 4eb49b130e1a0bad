use std::{
    fs,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;
use lox_lang::{lexer, parser, printer, run, Interpreter, LoxError};
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// A tree-walking interpreter for Lox.
///
/// With no script, starts an interactive prompt.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Print the scanned tokens instead of running the program.
    #[arg(long, conflicts_with = "ast")]
    tokens: bool,

    /// Print the parsed syntax tree instead of running the program.
    #[arg(long)]
    ast: bool,

    /// Script to run.
    script: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    Run,
    Tokens,
    Ast,
}

impl Args {
    fn mode(&self) -> Mode {
        if self.tokens {
            Mode::Tokens
        } else if self.ast {
            Mode::Ast
        } else {
            Mode::Run
        }
    }
}

const EXIT_DATA_ERR: u8 = 65;
const EXIT_SOFTWARE: u8 = 70;
const EXIT_IO_ERR: u8 = 74;

#[derive(Debug, Error)]
enum Failure {
    #[error(transparent)]
    Lox(#[from] LoxError),
    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl Failure {
    fn exit_code(&self) -> u8 {
        match self {
            Failure::Lox(error) if error.is_static() => EXIT_DATA_ERR,
            Failure::Lox(_) => EXIT_SOFTWARE,
            Failure::Io(_) => EXIT_IO_ERR,
        }
    }
}

fn execute(source: &str, mode: Mode, interpreter: &mut Interpreter) -> Result<(), Failure> {
    match mode {
        Mode::Run => Ok(run(source, interpreter)?),
        Mode::Tokens => {
            let (tokens, errors) = lexer::scan(source);
            let mut stdout = io::stdout().lock();
            for token in &tokens {
                writeln!(stdout, "{token}")?;
            }
            if errors.is_empty() {
                Ok(())
            } else {
                Err(LoxError::Scan(errors).into())
            }
        }
        Mode::Ast => {
            let (tokens, errors) = lexer::scan(source);
            if !errors.is_empty() {
                return Err(LoxError::Scan(errors).into());
            }
            let (stmts, errors) = parser::parse(&tokens);
            let mut stdout = io::stdout().lock();
            for stmt in &stmts {
                writeln!(stdout, "{}", printer::print_stmt(stmt))?;
            }
            if errors.is_empty() {
                Ok(())
            } else {
                Err(LoxError::Parse(errors).into())
            }
        }
    }
}

fn run_file(path: &Path, mode: Mode) -> ExitCode {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("Failed to read '{}': {error}", path.display());
            return ExitCode::from(EXIT_IO_ERR);
        }
    };

    debug!(path = %path.display(), bytes = source.len(), "running script");

    let mut interpreter = Interpreter::new();
    match execute(&source, mode, &mut interpreter) {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            eprintln!("{failure}");
            ExitCode::from(failure.exit_code())
        }
    }
}

fn run_prompt(mode: Mode) -> ExitCode {
    let mut interpreter = Interpreter::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        let mut stdout = io::stdout().lock();
        if let Err(error) = write!(stdout, "> ").and_then(|()| stdout.flush()) {
            eprintln!("Failed to write output: {error}");
            return ExitCode::from(EXIT_IO_ERR);
        }
        drop(stdout);

        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(error)) => {
                eprintln!("Failed to read input: {error}");
                return ExitCode::from(EXIT_IO_ERR);
            }
            None => {
                // the session is over either way
                let _ = writeln!(io::stdout());
                return ExitCode::SUCCESS;
            }
        };

        // a bad line is reported and forgotten
        match execute(&line, mode, &mut interpreter) {
            Ok(()) => {}
            Err(Failure::Io(error)) => {
                eprintln!("Failed to write output: {error}");
                return ExitCode::from(EXIT_IO_ERR);
            }
            Err(failure) => eprintln!("{failure}"),
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mode = args.mode();

    match &args.script {
        Some(path) => run_file(path, mode),
        None => run_prompt(mode),
    }
}
