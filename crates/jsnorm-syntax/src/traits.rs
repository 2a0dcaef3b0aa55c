//! Traits for source readers and writers.

use crate::ir::Program;

/// Error that can occur when reading source code into the syntax tree.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("unsupported syntax: {0}")]
    Unsupported(String),

    #[error("expected {expected}, got {got}")]
    UnexpectedNode { expected: String, got: String },
}

/// A reader parses source code into the syntax tree.
pub trait Reader: Send + Sync {
    /// Language identifier (e.g., "javascript").
    fn language(&self) -> &'static str;

    /// File extensions this reader handles (e.g., &["js", "mjs"]).
    fn extensions(&self) -> &'static [&'static str];

    /// Parse source code into a program.
    fn read(&self, source: &str) -> Result<Program, ReadError>;
}

/// A writer emits the syntax tree as source code.
pub trait Writer: Send + Sync {
    /// Language identifier (e.g., "javascript").
    fn language(&self) -> &'static str;

    /// File extension for output (e.g., "js").
    fn extension(&self) -> &'static str;

    /// Emit the program as source code.
    fn write(&self, program: &Program) -> String;
}
