//! Source locations and the shared error taxonomy.

use std::path::PathBuf;

/// A single line in a source file, for error reporting.
///
/// `line` is 0-indexed internally; `Display` renders 1-indexed, matching
/// how editors and compiler diagnostics usually report line numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: PathBuf,
    pub line: usize,
}

impl SourceLocation {
    pub fn new(file: impl Into<PathBuf>, line: usize) -> Self {
        SourceLocation {
            file: file.into(),
            line,
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line + 1)
    }
}

/// The four kinds of failure a toolchain stage can report.
#[derive(Debug)]
pub enum ToolError {
    /// A file could not be read or written.
    Io(std::io::Error),
    /// A token could not be formed from the input text.
    Lexical { at: SourceLocation, message: String },
    /// Tokens were well-formed but did not match the grammar.
    Syntax { at: SourceLocation, message: String },
    /// The input parsed but violates a naming or scoping rule.
    Semantic { at: SourceLocation, message: String },
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolError::Io(e) => write!(f, "{}", e),
            ToolError::Lexical { at, message } => write!(f, "{}: lexical error: {}", at, message),
            ToolError::Syntax { at, message } => write!(f, "{}: syntax error: {}", at, message),
            ToolError::Semantic { at, message } => {
                write!(f, "{}: semantic error: {}", at, message)
            }
        }
    }
}

impl std::error::Error for ToolError {}

impl From<std::io::Error> for ToolError {
    fn from(e: std::io::Error) -> Self {
        ToolError::Io(e)
    }
}
