//! Error and diagnostic types for sqlcanon

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for sqlcanon operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors. Each one aborts the file it was raised for.
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("lex error at line {line}, column {col}: {reason}")]
    #[diagnostic(code(sqlcanon::lex_error))]
    LexError {
        offset: usize,
        line: usize,
        col: usize,
        reason: String,
        #[label("here")]
        span: Option<(usize, usize)>,
    },

    #[error("parse error at line {line}, column {col}: {message}")]
    #[diagnostic(code(sqlcanon::parse_error))]
    ParseError {
        offset: usize,
        line: usize,
        col: usize,
        message: String,
        #[label("here")]
        span: Option<(usize, usize)>,
    },

    #[error("formatter invariant violated in statement at line {line}: {message}")]
    #[diagnostic(
        code(sqlcanon::invariant_violation),
        help("the formatted output would not be equivalent to the input; the file was left untouched")
    )]
    FormatterInvariantViolation {
        offset: usize,
        line: usize,
        message: String,
        #[label("statement starts here")]
        span: Option<(usize, usize)>,
    },

    #[error("resource limit exceeded: {what} is {actual} bytes, limit is {limit}")]
    #[diagnostic(code(sqlcanon::resource_limit))]
    ResourceLimitExceeded {
        what: String,
        actual: usize,
        limit: usize,
    },

    #[error("formatting cancelled")]
    #[diagnostic(code(sqlcanon::cancelled))]
    Cancelled,

    #[error("IO error: {0}")]
    #[diagnostic(code(sqlcanon::io_error))]
    IoError(#[from] std::io::Error),

    #[error("config error: {message}")]
    #[diagnostic(code(sqlcanon::config_error))]
    ConfigError { message: String },
}

impl Error {
    /// Build a `LexError` at `offset`, resolving line and column from `input`.
    pub fn lex(input: &str, offset: usize, reason: impl Into<String>) -> Self {
        let (line, col) = offset_to_line_col(input, offset);
        Error::LexError {
            offset,
            line,
            col,
            reason: reason.into(),
            span: Some((offset, 1)),
        }
    }

    /// Build a `ParseError` at `offset`, resolving line and column from `input`.
    pub fn parse(input: &str, offset: usize, message: impl Into<String>) -> Self {
        let (line, col) = offset_to_line_col(input, offset);
        Error::ParseError {
            offset,
            line,
            col,
            message: message.into(),
            span: Some((offset, 1)),
        }
    }

    /// Build a `FormatterInvariantViolation` for the statement at `offset`.
    pub fn invariant(input: &str, offset: usize, len: usize, message: impl Into<String>) -> Self {
        let (line, _) = offset_to_line_col(input, offset);
        Error::FormatterInvariantViolation {
            offset,
            line,
            message: message.into(),
            span: Some((offset, len)),
        }
    }

    /// Byte offset the error points at, when it has one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::LexError { offset, .. }
            | Error::ParseError { offset, .. }
            | Error::FormatterInvariantViolation { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

/// Kind of a non-fatal diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A statement could not be restructured and was passed through unchanged.
    PartiallyFormatted,
    /// A statement contains a character the lexer does not know; it was passed through unchanged.
    LexError,
}

/// A warning attached to a formatting result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatDiagnostic {
    pub kind: DiagnosticKind,
    /// Byte offset of the statement (or character) the warning refers to
    pub offset: usize,
    pub line: usize,
    pub col: usize,
    pub message: String,
}

impl FormatDiagnostic {
    pub fn new(kind: DiagnosticKind, input: &str, offset: usize, message: impl Into<String>) -> Self {
        let (line, col) = offset_to_line_col(input, offset);
        Self {
            kind,
            offset,
            line,
            col,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FormatDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.kind {
            DiagnosticKind::PartiallyFormatted => "partially formatted",
            DiagnosticKind::LexError => "lex error",
        };
        write!(f, "{}:{}: {}: {}", self.line, self.col, label, self.message)
    }
}

/// Calculate line and column number (both 1-indexed) from a byte offset
pub fn offset_to_line_col(input: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for (i, c) in input.char_indices() {
        if i >= offset {
            break;
        }
        if c == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}
