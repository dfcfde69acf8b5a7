//! sqlcanon - An opinionated SQL formatter with leading commas and river alignment
//!
//! This library provides the formatting pipeline used by the sqlcanon CLI:
//! lex, split into statements, parse each statement shallowly, render it with
//! a [`StylePolicy`], and verify that the rendering lexes back to the same
//! tokens before accepting it.

pub mod ast;
pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod formatter;
pub mod parser;
pub mod verify;

pub use batch::{BatchReport, BatchRunner, CancellationToken, Mode, Outcome, SourceUnit, UnitReport};
pub use error::{DiagnosticKind, Error, FormatDiagnostic, Result};
pub use formatter::rules::{Case, ClauseKind, CommaPosition, StyleOverride, StylePolicy, StyleRule};

/// Size guards for pathological inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_file_bytes: usize,
    pub max_statement_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_file_bytes: 16 * 1024 * 1024,
            max_statement_bytes: 1024 * 1024,
        }
    }
}

/// Result of formatting one input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatted {
    pub text: String,
    /// Statements that were passed through unchanged
    pub diagnostics: Vec<FormatDiagnostic>,
}

/// Result of checking one input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub is_canonical: bool,
    pub diagnostics: Vec<FormatDiagnostic>,
    /// Unified diff from the input to its canonical form, when they differ
    pub diff: Option<String>,
}

/// Format SQL text
pub fn format(input: &str, policy: &StylePolicy) -> Result<Formatted> {
    format_with_limits(input, policy, &Limits::default(), None)
}

/// Check if SQL text is already in canonical form
pub fn check(input: &str, policy: &StylePolicy) -> Result<CheckOutcome> {
    check_with_limits(input, policy, &Limits::default(), None)
}

/// Format SQL text, enforcing size limits and stopping between statements
/// once `cancel` fires.
pub fn format_with_limits(
    input: &str,
    policy: &StylePolicy,
    limits: &Limits,
    cancel: Option<&CancellationToken>,
) -> Result<Formatted> {
    if input.len() > limits.max_file_bytes {
        return Err(Error::ResourceLimitExceeded {
            what: "file".to_string(),
            actual: input.len(),
            limit: limits.max_file_bytes,
        });
    }

    let (file, issues) = parser::split(input)?;
    log::debug!("formatting {} statement(s)", file.statements.len());

    let mut rendered = Vec::with_capacity(file.statements.len());
    let mut diagnostics = Vec::new();

    for raw in file.statements {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(Error::Cancelled);
        }

        let size = raw.end() - raw.start();
        if size > limits.max_statement_bytes {
            return Err(Error::ResourceLimitExceeded {
                what: "statement".to_string(),
                actual: size,
                limit: limits.max_statement_bytes,
            });
        }

        let (statement, diagnostic) = parser::build_statement(input, raw, &issues);
        if let Some(diagnostic) = diagnostic {
            log::warn!("{}", diagnostic);
            diagnostics.push(diagnostic);
        }

        let text = formatter::render_statement(&statement, policy);
        verify::verify_round_trip(input, &statement, &text)?;
        rendered.push(text);
    }

    Ok(Formatted {
        text: formatter::assemble(&rendered, &file.trailing_trivia),
        diagnostics,
    })
}

/// Check SQL text against its canonical form. Trailing newlines are ignored.
pub fn check_with_limits(
    input: &str,
    policy: &StylePolicy,
    limits: &Limits,
    cancel: Option<&CancellationToken>,
) -> Result<CheckOutcome> {
    let formatted = format_with_limits(input, policy, limits, cancel)?;
    let is_canonical = formatted.text.trim_end_matches('\n') == input.trim_end_matches('\n');
    let diff = (!is_canonical).then(|| unified_diff(input, &formatted.text));

    Ok(CheckOutcome {
        is_canonical,
        diagnostics: formatted.diagnostics,
        diff,
    })
}

/// Unified diff from `original` to `formatted`
pub fn unified_diff(original: &str, formatted: &str) -> String {
    let diff = similar::TextDiff::from_lines(original, formatted);
    diff.unified_diff()
        .context_radius(3)
        .header("original", "formatted")
        .to_string()
}
