//! Round-trip verification
//!
//! Every rendered statement is lexed again and compared with the tokens it was
//! rendered from. Only whitespace and the letter case of keywords and
//! identifiers may differ; comments must survive in order.

use crate::ast::SourceStatement;
use crate::error::{Error, Result};
use crate::parser::lexer::{tokenize_recovering, Token, TokenKind, TokenStream};

/// Check that `rendered` is token-for-token equivalent to `stmt`.
///
/// `input` is the original file text, used only for error positions.
pub fn verify_round_trip(input: &str, stmt: &SourceStatement, rendered: &str) -> Result<()> {
    let violation = |message: String| {
        log::error!("round-trip check failed for statement at byte {}: {}", stmt.start, message);
        Error::invariant(input, stmt.start, stmt.end.saturating_sub(stmt.start), message)
    };

    let (tokens, _) = tokenize_recovering(rendered)
        .map_err(|e| violation(format!("rendered text does not lex: {}", e)))?;
    let relexed = TokenStream::from_tokens(tokens);

    let expected: Vec<&Token> = stmt.tokens.iter().chain(stmt.semicolon.as_ref()).collect();
    if relexed.tokens.len() != expected.len() {
        return Err(violation(format!(
            "expected {} tokens, rendered text has {}",
            expected.len(),
            relexed.tokens.len()
        )));
    }

    for (original, actual) in expected.iter().zip(&relexed.tokens) {
        if !same_token(original, actual) {
            return Err(violation(format!(
                "`{}` ({:?}) was rendered as `{}` ({:?})",
                original.text, original.kind, actual.text, actual.kind
            )));
        }
    }

    let expected_comments = comment_texts(expected.iter().copied(), &[]);
    let actual_comments = comment_texts(relexed.tokens.iter(), &relexed.trailing_trivia);
    if expected_comments != actual_comments {
        return Err(violation("comments were lost or reordered".to_string()));
    }

    Ok(())
}

fn same_token(original: &Token, actual: &Token) -> bool {
    original.kind == actual.kind
        && match original.kind {
            TokenKind::Keyword | TokenKind::Identifier => original.text.eq_ignore_ascii_case(&actual.text),
            _ => original.text == actual.text,
        }
}

fn comment_texts<'t>(tokens: impl Iterator<Item = &'t Token>, trailing: &'t [Token]) -> Vec<&'t str> {
    tokens
        .flat_map(|t| t.leading_trivia.iter())
        .chain(trailing)
        .filter(|t| t.kind.is_comment())
        .map(|t| t.text.trim_end())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    fn first_statement(sql: &str) -> SourceStatement {
        parser::parse(sql).unwrap().statements.remove(0)
    }

    #[test]
    fn whitespace_and_case_may_change() {
        let stmt = first_statement("select  A from t;");
        assert!(verify_round_trip("", &stmt, "SELECT a\n  FROM t;").is_ok());
    }

    #[test]
    fn changed_literal_is_a_violation() {
        let stmt = first_statement("SELECT 'a'");
        let err = verify_round_trip("", &stmt, "SELECT 'A'").unwrap_err();
        assert!(matches!(err, Error::FormatterInvariantViolation { .. }));
    }

    #[test]
    fn dropped_comment_is_a_violation() {
        let stmt = first_statement("SELECT /* keep */ 1");
        assert!(verify_round_trip("", &stmt, "SELECT 1").is_err());
    }

    #[test]
    fn quoted_identifier_case_matters() {
        let stmt = first_statement("SELECT \"Name\" FROM t");
        assert!(verify_round_trip("", &stmt, "SELECT \"name\" FROM t").is_err());
    }
}
