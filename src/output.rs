//! Where `print` statements write.
//!
//! The interpreter never touches stdout directly; the embedding program picks
//! the destination.

use std::io::{self, Write};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Output {
    /// Writes each line to stdout.
    #[default]
    Stdout,
    /// Keeps every line in memory.
    Buffer(Vec<String>),
}

impl Output {
    pub fn buffer() -> Self {
        Output::Buffer(Vec::new())
    }

    /// Emits one line. Only stdout can fail, e.g. when the reader of a pipe
    /// has gone away.
    pub fn println(&mut self, line: &str) -> io::Result<()> {
        match self {
            Output::Stdout => writeln!(io::stdout().lock(), "{line}"),
            Output::Buffer(lines) => {
                lines.push(line.to_string());
                Ok(())
            }
        }
    }

    /// Lines captured so far; always empty for stdout.
    pub fn lines(&self) -> &[String] {
        match self {
            Output::Stdout => &[],
            Output::Buffer(lines) => lines,
        }
    }
}
