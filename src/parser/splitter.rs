//! Statement splitting
//!
//! Groups a token stream into top-level statements on `;` tokens that sit at
//! parenthesis depth zero. Quotes and comments are already single tokens, so
//! only the depth counter matters here.

use crate::error::{Error, Result};
use crate::parser::lexer::{Token, TokenStream};

/// One statement's tokens, without its terminator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawStatement {
    pub tokens: Vec<Token>,
    pub semicolon: Option<Token>,
    /// How many of the first token's leading comments came from empty
    /// statements before this one
    pub carried: usize,
}

impl RawStatement {
    /// Byte offset where the statement's own text starts, its leading
    /// comments included. Carried comments sit before an earlier `;` and
    /// are not part of it.
    pub fn start(&self) -> usize {
        self.tokens.first().map_or(0, |first| {
            first
                .leading_trivia
                .get(self.carried)
                .map_or(first.start, |t| t.start)
        })
    }

    /// Comments carried over from empty statements
    pub fn carried_comments(&self) -> &[Token] {
        self.tokens
            .first()
            .map_or(&[][..], |first| &first.leading_trivia[..self.carried])
    }

    /// Byte offset one past the last significant token
    pub fn end(&self) -> usize {
        self.tokens.last().map_or(0, |t| t.end)
    }
}

/// Result of splitting a file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitFile {
    pub statements: Vec<RawStatement>,
    /// Comments after the last statement
    pub trailing_trivia: Vec<Token>,
}

/// Split `stream` into statements. `input` is only used for error positions.
///
/// Parentheses must balance across the whole file; an unmatched `(` or `)` is
/// a hard error pointing at the offending token.
pub fn split_statements(input: &str, stream: TokenStream) -> Result<SplitFile> {
    check_balance(input, &stream.tokens)?;

    let mut statements = Vec::new();
    let mut current: Vec<Token> = Vec::new();
    // Comments carried over from dropped empty statements
    let mut carried: Vec<Token> = Vec::new();
    let mut current_carried = 0usize;
    let mut depth = 0usize;
    let mut blocks = BlockTracker::default();

    for mut token in stream.tokens {
        if token.is_punct('(') {
            depth += 1;
        } else if token.is_punct(')') {
            depth = depth.saturating_sub(1);
        }

        if token.is_punct(';') && depth == 0 && !blocks.inside() {
            if current.is_empty() {
                carried.append(&mut token.leading_trivia);
                continue;
            }
            statements.push(RawStatement {
                tokens: std::mem::take(&mut current),
                semicolon: Some(token),
                carried: std::mem::take(&mut current_carried),
            });
            blocks = BlockTracker::default();
            continue;
        }

        if current.is_empty() && !carried.is_empty() {
            current_carried = carried.len();
            carried.append(&mut token.leading_trivia);
            token.leading_trivia = std::mem::take(&mut carried);
        }
        blocks.observe(&current, &token);
        current.push(token);
    }

    if !current.is_empty() {
        statements.push(RawStatement {
            tokens: current,
            semicolon: None,
            carried: current_carried,
        });
    }

    carried.extend(stream.trailing_trivia);
    log::trace!("split input into {} statement(s)", statements.len());

    Ok(SplitFile {
        statements,
        trailing_trivia: carried,
    })
}

fn check_balance(input: &str, tokens: &[Token]) -> Result<()> {
    let mut open: Vec<&Token> = Vec::new();
    for token in tokens {
        if token.is_punct('(') {
            open.push(token);
        } else if token.is_punct(')') && open.pop().is_none() {
            return Err(Error::parse(input, token.start, "unmatched `)`"));
        }
    }
    match open.pop() {
        // Report the innermost unclosed paren
        Some(token) => Err(Error::parse(input, token.start, "unmatched `(`")),
        None => Ok(()),
    }
}

/// Tracks `BEGIN ... END` bodies of `CREATE TRIGGER`, where `;` does not end
/// the statement.
#[derive(Debug, Default)]
struct BlockTracker {
    is_trigger: bool,
    depth: usize,
}

impl BlockTracker {
    fn inside(&self) -> bool {
        self.depth > 0
    }

    fn observe(&mut self, current: &[Token], token: &Token) {
        if current.first().is_some_and(|t| t.is_keyword("CREATE")) && token.is_keyword("TRIGGER") {
            self.is_trigger = true;
        }
        if !self.is_trigger {
            return;
        }
        if token.is_keyword("BEGIN") || (self.depth > 0 && token.is_keyword("CASE")) {
            self.depth += 1;
        } else if token.is_keyword("END") && self.depth > 0 {
            self.depth -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::tokenize;

    fn split(input: &str) -> Result<SplitFile> {
        split_statements(input, TokenStream::from_tokens(tokenize(input).unwrap()))
    }

    #[test]
    fn trigger_body_stays_whole() {
        let sql = "CREATE TRIGGER t AFTER INSERT ON a BEGIN UPDATE b SET x = 1; END; SELECT 1";
        let file = split(sql).unwrap();
        assert_eq!(file.statements.len(), 2);
        assert!(file.statements[0].tokens.last().unwrap().is_keyword("END"));
    }

    #[test]
    fn comments_of_empty_statements_move_forward() {
        let file = split("/* a */ ; SELECT 1").unwrap();
        assert_eq!(file.statements.len(), 1);
        assert_eq!(file.statements[0].tokens[0].leading_trivia.len(), 1);
        assert_eq!(file.statements[0].carried, 1);
    }

    #[test]
    fn carried_comments_are_not_part_of_the_statement_text() {
        let sql = "/* a */ ; -- b\nDROP TABLE x";
        let file = split(sql).unwrap();
        let raw = &file.statements[0];
        assert_eq!(raw.carried_comments().len(), 1);
        assert_eq!(&sql[raw.start()..raw.end()], "-- b\nDROP TABLE x");
    }
}
