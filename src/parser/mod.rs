//! SQL parser
//!
//! Parsing runs in three passes: the lexer turns bytes into tokens, the
//! splitter groups tokens into statements, and the statement builders give
//! each statement a shallow structure. A statement that does not fit any known
//! shape is kept as written.

pub mod cursor;
pub mod expr;
pub mod keywords;
pub mod lexer;
pub mod splitter;
pub mod stmt;

use crate::ast::{OpaqueStatement, SourceStatement, Statement, TokenRun};
use crate::error::{DiagnosticKind, FormatDiagnostic, Result};
use lexer::{tokenize_recovering, LexIssue, Token, TokenStream};
use splitter::{split_statements, RawStatement, SplitFile};

/// All statements of one input
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFile {
    pub statements: Vec<SourceStatement>,
    /// Comments after the last statement
    pub trailing_trivia: Vec<Token>,
    pub diagnostics: Vec<FormatDiagnostic>,
}

/// Lex and split `input` without building statements
pub fn split(input: &str) -> Result<(SplitFile, Vec<LexIssue>)> {
    let (tokens, issues) = tokenize_recovering(input)?;
    let file = split_statements(input, TokenStream::from_tokens(tokens))?;
    Ok((file, issues))
}

/// Parse SQL input into statements
pub fn parse(input: &str) -> Result<ParsedFile> {
    let (file, issues) = split(input)?;

    let mut statements = Vec::with_capacity(file.statements.len());
    let mut diagnostics = Vec::new();
    for raw in file.statements {
        let (statement, diagnostic) = build_statement(input, raw, &issues);
        statements.push(statement);
        diagnostics.extend(diagnostic);
    }

    Ok(ParsedFile {
        statements,
        trailing_trivia: file.trailing_trivia,
        diagnostics,
    })
}

/// Give one raw statement its structure.
///
/// Statements containing an unknown character, or whose shape does not match
/// their leading keyword, come back as [`Statement::Other`] together with a
/// diagnostic.
pub fn build_statement(
    input: &str,
    raw: RawStatement,
    issues: &[LexIssue],
) -> (SourceStatement, Option<FormatDiagnostic>) {
    let start = raw.start();
    let end = raw.end();

    let lex_issue = issues
        .iter()
        .find(|issue| issue.offset >= start && issue.offset < end);

    let (statement, diagnostic) = match lex_issue {
        Some(issue) => {
            log::debug!("statement at byte {} kept verbatim: {}", start, issue.reason);
            (
                None,
                Some(FormatDiagnostic::new(
                    DiagnosticKind::LexError,
                    input,
                    issue.offset,
                    issue.reason.clone(),
                )),
            )
        }
        None => match stmt::parse_statement(&raw.tokens) {
            Ok(statement) => (statement, None),
            Err(mismatch) => {
                log::debug!(
                    "statement at byte {} kept verbatim: {}",
                    start,
                    mismatch.reason
                );
                (
                    None,
                    Some(FormatDiagnostic::new(
                        DiagnosticKind::PartiallyFormatted,
                        input,
                        start,
                        mismatch.reason,
                    )),
                )
            }
        },
    };

    let statement = statement.unwrap_or_else(|| {
        Statement::Other(OpaqueStatement {
            tokens: TokenRun::new(raw.tokens.clone()),
            carried_comments: raw.carried_comments().to_vec(),
            text: input[start..end].to_string(),
        })
    });

    (
        SourceStatement {
            statement,
            semicolon: raw.semicolon,
            start,
            end,
            tokens: raw.tokens,
        },
        diagnostic,
    )
}
