//! Token cursor used by the statement builders

use crate::ast::TokenRun;
use crate::parser::lexer::Token;

/// Why a statement did not match a known shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub offset: usize,
    pub reason: String,
}

pub type Shape<T> = std::result::Result<T, Mismatch>;

/// A cursor over one statement's significant tokens
pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    /// Offset reported when a mismatch happens at end of input
    end_offset: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        let end_offset = tokens.last().map_or(0, |t| t.end);
        Self {
            tokens,
            pos: 0,
            end_offset,
        }
    }

    pub fn current(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    pub fn peek_at(&self, offset: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + offset)
    }

    pub fn previous(&self) -> Option<&'a Token> {
        self.pos.checked_sub(1).and_then(|i| self.tokens.get(i))
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Tokens from `start` up to the cursor
    pub fn slice_from(&self, start: usize) -> TokenRun {
        TokenRun::new(self.tokens[start..self.pos].to_vec())
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    /// Is the current token the keyword `word`?
    pub fn check(&self, word: &str) -> bool {
        self.current().is_some_and(|t| t.is_keyword(word))
    }

    /// Does the keyword sequence `words` start at the cursor?
    pub fn check_seq(&self, words: &[&str]) -> bool {
        words
            .iter()
            .enumerate()
            .all(|(i, w)| self.peek_at(i).is_some_and(|t| t.is_keyword(w)))
    }

    pub fn check_punct(&self, c: char) -> bool {
        self.current().is_some_and(|t| t.is_punct(c))
    }

    /// Consume the keyword `word` if present
    pub fn consume(&mut self, word: &str) -> Option<Token> {
        if self.check(word) {
            self.advance().cloned()
        } else {
            None
        }
    }

    pub fn consume_punct(&mut self, c: char) -> Option<Token> {
        if self.check_punct(c) {
            self.advance().cloned()
        } else {
            None
        }
    }

    /// Consume the keyword `word` or fail
    pub fn expect(&mut self, word: &str) -> Shape<Token> {
        self.consume(word)
            .ok_or_else(|| self.mismatch(format!("expected `{}`", word)))
    }

    pub fn expect_punct(&mut self, c: char) -> Shape<Token> {
        self.consume_punct(c)
            .ok_or_else(|| self.mismatch(format!("expected `{}`", c)))
    }

    /// Build a mismatch at the current position
    pub fn mismatch(&self, reason: impl Into<String>) -> Mismatch {
        Mismatch {
            offset: self.current().map_or(self.end_offset, |t| t.start),
            reason: reason.into(),
        }
    }

    /// Fail unless every token was consumed
    pub fn expect_eof(&self) -> Shape<()> {
        match self.current() {
            None => Ok(()),
            Some(t) => Err(self.mismatch(format!("unexpected `{}`", t.text))),
        }
    }

    /// Take tokens until `stop` matches at parenthesis depth zero, or until
    /// the input ends. `stop` receives the cursor positioned at the candidate.
    pub fn take_until(&mut self, stop: impl Fn(&Parser<'a>) -> bool) -> TokenRun {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(token) = self.current() {
            if depth == 0 && stop(self) {
                break;
            }
            if token.is_punct('(') {
                depth += 1;
            } else if token.is_punct(')') {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            self.pos += 1;
        }
        TokenRun::new(self.tokens[start..self.pos].to_vec())
    }

    /// Take the rest of the input
    pub fn take_rest(&mut self) -> TokenRun {
        let run = TokenRun::new(self.tokens[self.pos..].to_vec());
        self.pos = self.tokens.len();
        run
    }

    /// Take a balanced `( ... )` group. Returns the open token, the inner
    /// tokens and the close token.
    pub fn take_group(&mut self) -> Shape<(Token, &'a [Token], Token)> {
        let open = self.expect_punct('(')?;
        let start = self.pos;
        let close = matching_close(self.tokens, start - 1)
            .ok_or_else(|| self.mismatch("unbalanced parentheses"))?;
        self.pos = close + 1;
        Ok((open, &self.tokens[start..close], self.tokens[close].clone()))
    }
}

/// Index of the `)` matching the `(` at `open`
pub fn matching_close(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        if token.is_punct('(') {
            depth += 1;
        } else if token.is_punct(')') {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}
