//! SQL tokenization
//!
//! This module handles breaking SQL input into classified tokens. The lexer is
//! lossless: concatenating the text of every token returned by [`tokenize`]
//! reproduces the input exactly.

use crate::error::{Error, Result};
use crate::parser::keywords;

/// Token classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword,
    Identifier,
    QuotedIdentifier,
    StringLiteral,
    NumberLiteral,
    Punctuation,
    Operator,
    LineComment,
    BlockComment,
    Whitespace,
}

impl TokenKind {
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::LineComment | TokenKind::BlockComment | TokenKind::Whitespace
        )
    }

    pub fn is_comment(self) -> bool {
        matches!(self, TokenKind::LineComment | TokenKind::BlockComment)
    }
}

/// A single lexed token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset one past the last character
    pub end: usize,
    /// 1-indexed line of the first character
    pub line: usize,
    /// 1-indexed column of the first character
    pub col: usize,
    /// Comments that precede this token. Only populated on significant tokens
    /// inside a [`TokenStream`].
    pub leading_trivia: Vec<Token>,
}

impl Token {
    /// Is this a keyword token spelled `word` (case-insensitive)?
    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text.eq_ignore_ascii_case(word)
    }

    /// Is this a keyword among `words`?
    pub fn is_any_keyword(&self, words: &[&str]) -> bool {
        words.iter().any(|w| self.is_keyword(w))
    }

    /// Is this the punctuation character `c`?
    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punctuation && self.text.len() == 1 && self.text.starts_with(c)
    }

    /// Is this an operator spelled `op`?
    pub fn is_operator(&self, op: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == op
    }

    /// Unquoted word (keyword or identifier)
    pub fn is_word(&self) -> bool {
        matches!(self.kind, TokenKind::Keyword | TokenKind::Identifier)
    }

    /// Bind parameters (`?`, `$1`, `:name`, `@name`) keep their case.
    pub fn is_parameter(&self) -> bool {
        self.kind == TokenKind::Identifier && self.text.starts_with(['?', '$', ':', '@'])
    }

    /// Start of the first leading comment, or of the token itself
    pub fn full_start(&self) -> usize {
        self.leading_trivia.first().map_or(self.start, |t| t.start)
    }
}

/// Significant tokens with comments attached as leading trivia
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    pub tokens: Vec<Token>,
    /// Comments after the last significant token
    pub trailing_trivia: Vec<Token>,
}

impl TokenStream {
    /// Attach comments to the following significant token and drop whitespace.
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        let mut significant = Vec::new();
        let mut pending = Vec::new();

        for token in tokens {
            match token.kind {
                TokenKind::Whitespace => {}
                TokenKind::LineComment | TokenKind::BlockComment => pending.push(token),
                _ => {
                    let mut token = token;
                    token.leading_trivia = std::mem::take(&mut pending);
                    significant.push(token);
                }
            }
        }

        Self {
            tokens: significant,
            trailing_trivia: pending,
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// A recoverable lexing problem: the offending character became an operator token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexIssue {
    pub offset: usize,
    pub reason: String,
}

/// Tokenize SQL input. Every problem is fatal.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let (tokens, issues) = tokenize_recovering(input)?;
    match issues.first() {
        Some(issue) => Err(Error::lex(input, issue.offset, issue.reason.clone())),
        None => Ok(tokens),
    }
}

/// Tokenize SQL input, recovering from unknown characters.
///
/// Unterminated strings, quoted identifiers and block comments are still
/// fatal because they swallow the rest of the input.
pub fn tokenize_recovering(input: &str) -> Result<(Vec<Token>, Vec<LexIssue>)> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    classify_words(&mut tokens);
    Ok((tokens, lexer.issues))
}

/// Decode raw bytes, reporting invalid UTF-8 as a lex error.
pub fn decode(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| {
        let offset = e.valid_up_to();
        // Line/col from the valid prefix
        let prefix = std::str::from_utf8(&bytes[..offset]).unwrap_or_default();
        Error::lex(prefix, offset, "invalid UTF-8 byte sequence")
    })
}

struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    col: usize,
    issues: Vec<LexIssue>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
            issues: Vec::new(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Advance over one character, keeping line/column current.
    fn bump(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
            if c == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
    }

    fn bump_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek_char() {
            if !pred(c) {
                break;
            }
            self.bump();
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>> {
        let Some(c) = self.peek_char() else {
            return Ok(None);
        };
        let (start, line, col) = (self.pos, self.line, self.col);

        let kind = match c {
            c if c.is_whitespace() => {
                self.bump_while(char::is_whitespace);
                TokenKind::Whitespace
            }
            '-' if self.peek_at(1) == Some(b'-') => {
                self.bump_while(|c| c != '\n');
                TokenKind::LineComment
            }
            '/' if self.peek_at(1) == Some(b'*') => {
                self.lex_block_comment(start)?;
                TokenKind::BlockComment
            }
            '\'' => {
                self.lex_quoted(start, '\'', '\'', false, "unterminated string literal")?;
                TokenKind::StringLiteral
            }
            '"' => {
                self.lex_quoted(start, '"', '"', false, "unterminated quoted identifier")?;
                TokenKind::QuotedIdentifier
            }
            '`' => {
                self.lex_quoted(start, '`', '`', false, "unterminated quoted identifier")?;
                TokenKind::QuotedIdentifier
            }
            '[' => {
                self.lex_quoted(start, '[', ']', false, "unterminated quoted identifier")?;
                TokenKind::QuotedIdentifier
            }
            '0'..='9' => self.lex_number(),
            '.' if matches!(self.peek_at(1), Some(b'0'..=b'9')) => self.lex_number(),
            c if is_ident_start(c) => self.lex_word(start)?,
            '?' | '$' | ':' | '@' if self.is_parameter_start(c) => {
                self.bump();
                self.bump_while(|c| c == '@');
                self.bump_while(is_ident_continue);
                TokenKind::Identifier
            }
            ',' | ';' | '.' | '(' | ')' => {
                self.bump();
                TokenKind::Punctuation
            }
            _ => self.lex_operator(start),
        };

        Ok(Some(Token {
            kind,
            text: self.input[start..self.pos].to_string(),
            start,
            end: self.pos,
            line,
            col,
            leading_trivia: Vec::new(),
        }))
    }

    fn is_parameter_start(&self, c: char) -> bool {
        let next = self.peek_at(1);
        match c {
            // `?` alone or `?1`
            '?' => true,
            '$' => matches!(next, Some(b) if b.is_ascii_alphanumeric() || b == b'_'),
            // `::` is the cast operator
            ':' => matches!(next, Some(b) if b.is_ascii_alphabetic() || b == b'_'),
            '@' => matches!(next, Some(b) if b.is_ascii_alphabetic() || b == b'_' || b == b'@'),
            _ => false,
        }
    }

    fn lex_block_comment(&mut self, start: usize) -> Result<()> {
        self.bump();
        self.bump();
        loop {
            match self.peek() {
                None => return Err(Error::lex(self.input, start, "unterminated block comment")),
                Some(b'*') if self.peek_at(1) == Some(b'/') => {
                    self.bump();
                    self.bump();
                    return Ok(());
                }
                Some(_) => self.bump(),
            }
        }
    }

    /// Lex a quoted run; a doubled closing quote is an escape.
    fn lex_quoted(
        &mut self,
        start: usize,
        open: char,
        close: char,
        backslash_escapes: bool,
        reason: &str,
    ) -> Result<()> {
        debug_assert_eq!(self.peek_char(), Some(open));
        self.bump();
        loop {
            match self.peek_char() {
                None => return Err(Error::lex(self.input, start, reason)),
                Some('\\') if backslash_escapes => {
                    self.bump();
                    self.bump();
                }
                Some(c) if c == close => {
                    self.bump();
                    if self.peek_char() == Some(close) && open == close {
                        self.bump();
                    } else {
                        return Ok(());
                    }
                }
                Some(_) => self.bump(),
            }
        }
    }

    fn lex_number(&mut self) -> TokenKind {
        if self.peek() == Some(b'0') && matches!(self.peek_at(1), Some(b'x' | b'X')) {
            if matches!(self.peek_at(2), Some(b) if b.is_ascii_hexdigit()) {
                self.bump();
                self.bump();
                self.bump_while(|c| c.is_ascii_hexdigit());
                return self.absorb_word_tail(TokenKind::NumberLiteral);
            }
        }

        self.bump_while(|c| c.is_ascii_digit());
        if self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(b'0'..=b'9')) {
            self.bump();
            self.bump_while(|c| c.is_ascii_digit());
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let digit_at = if matches!(self.peek_at(1), Some(b'+' | b'-')) { 2 } else { 1 };
            if matches!(self.peek_at(digit_at), Some(b'0'..=b'9')) {
                for _ in 0..digit_at {
                    self.bump();
                }
                self.bump_while(|c| c.is_ascii_digit());
            }
        }
        self.absorb_word_tail(TokenKind::NumberLiteral)
    }

    /// `1st_place` style names start with digits; keep them in one token.
    fn absorb_word_tail(&mut self, kind: TokenKind) -> TokenKind {
        match self.peek_char() {
            Some(c) if is_ident_continue(c) => {
                self.bump_while(is_ident_continue);
                TokenKind::Identifier
            }
            _ => kind,
        }
    }

    fn lex_word(&mut self, start: usize) -> Result<TokenKind> {
        // Prefixed string literals: N'..', E'..', X'..', B'..'
        if let Some(prefix) = self.peek() {
            if matches!(prefix, b'N' | b'n' | b'E' | b'e' | b'X' | b'x' | b'B' | b'b')
                && self.peek_at(1) == Some(b'\'')
            {
                self.bump();
                let escapes = matches!(prefix, b'E' | b'e');
                self.lex_quoted(start, '\'', '\'', escapes, "unterminated string literal")?;
                return Ok(TokenKind::StringLiteral);
            }
        }

        self.bump_while(is_ident_continue);
        let word = &self.input[start..self.pos];
        Ok(if keywords::is_reserved(word) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        })
    }

    fn lex_operator(&mut self, start: usize) -> TokenKind {
        const MULTI: &[&str] = &["->>", "<>", "!=", "<=", ">=", "||", "::", "->", "=>", "<<", ">>", "=="];
        const SINGLE: &str = "+-*/%=<>!|&^~{}:?";

        let rest = &self.input[start..];
        if let Some(op) = MULTI.iter().find(|op| rest.starts_with(**op)) {
            for _ in 0..op.len() {
                self.bump();
            }
            return TokenKind::Operator;
        }

        let c = self.peek_char().unwrap_or_default();
        if !SINGLE.contains(c) {
            self.issues.push(LexIssue {
                offset: start,
                reason: format!("unexpected character `{}`", c),
            });
        }
        self.bump();
        TokenKind::Operator
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Context-sensitive word classes: words next to `.` are names, and known
/// function names are keywords only when called.
fn classify_words(tokens: &mut [Token]) {
    let significant: Vec<usize> = tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| !t.kind.is_trivia())
        .map(|(i, _)| i)
        .collect();

    for (n, &i) in significant.iter().enumerate() {
        let prev = n.checked_sub(1).map(|p| &tokens[significant[p]]);
        let next = significant.get(n + 1).map(|&j| &tokens[j]);
        let after_dot = prev.is_some_and(|t| t.is_punct('.'));
        let before_dot = next.is_some_and(|t| t.is_punct('.'));
        let called = next.is_some_and(|t| t.is_punct('('));

        let token = &tokens[i];
        let kind = match token.kind {
            TokenKind::Keyword if after_dot || before_dot => TokenKind::Identifier,
            TokenKind::Identifier
                if called && !after_dot && !token.is_parameter() && keywords::is_function(&token.text) =>
            {
                TokenKind::Keyword
            }
            other => other,
        };
        tokens[i].kind = kind;
    }
}
