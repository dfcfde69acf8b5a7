//! Column-tracking printer
//!
//! The renderer places text at absolute columns: clause keywords end at the
//! alignment column and list items start one column after it. The printer
//! keeps track of the current column and writes comments attached to tokens.

use crate::parser::lexer::{Token, TokenKind};

/// Indentation size (4 spaces) for CTE bodies and DDL definition lists
pub const INDENT_SIZE: usize = 4;

/// Pretty printer state
#[derive(Debug, Default)]
pub struct Printer {
    output: String,
    column: usize,
    /// Column to continue at after a line comment in the middle of a line
    hang: usize,
    /// Only spaces have been written on the current line
    at_line_start: bool,
}

impl Printer {
    pub fn new() -> Self {
        Self {
            at_line_start: true,
            ..Self::default()
        }
    }

    /// Write text to output
    pub fn write(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.output.push_str(text);
        match text.rfind('\n') {
            Some(i) => self.column = text[i + 1..].chars().count(),
            None => self.column += text.chars().count(),
        }
        if !text.chars().all(|c| c == ' ') {
            self.at_line_start = false;
        }
    }

    pub fn space(&mut self) {
        self.write(" ");
    }

    /// Pad with spaces up to `column`; does nothing if already past it
    pub fn pad_to(&mut self, column: usize) {
        if self.column < column {
            let pad = " ".repeat(column - self.column);
            self.write(&pad);
        }
    }

    /// End the line and continue at `column`
    pub fn newline_at(&mut self, column: usize) {
        self.trim_trailing_spaces();
        self.output.push('\n');
        self.output.push_str(&" ".repeat(column));
        self.column = column;
        self.hang = column;
        self.at_line_start = true;
    }

    /// Set where text continues after a mid-line line comment
    pub fn set_hang(&mut self, column: usize) {
        self.hang = column;
    }

    pub fn column(&self) -> usize {
        self.column
    }

    /// Write the comments attached to a token.
    ///
    /// At the start of a line every comment gets a line of its own. In the
    /// middle of a line block comments stay inline and line comments end the
    /// line, continuing at the hang column.
    pub fn comments(&mut self, trivia: &[Token]) {
        for comment in trivia.iter().filter(|t| t.kind.is_comment()) {
            let text = comment.text.trim_end();
            if self.at_line_start {
                let column = self.column;
                self.write(text);
                self.newline_at(column);
                continue;
            }

            if !(self.output.ends_with(' ') || self.output.ends_with('(')) {
                self.space();
            }
            self.write(text);
            if comment.kind == TokenKind::LineComment {
                let hang = self.hang;
                self.newline_at(hang);
            } else {
                self.space();
            }
        }
    }

    fn trim_trailing_spaces(&mut self) {
        let trimmed = self.output.trim_end_matches(' ').len();
        self.output.truncate(trimmed);
    }

    /// Get the output string
    pub fn finish(self) -> String {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::{tokenize, TokenStream};

    fn trivia_of_last(sql: &str) -> Vec<Token> {
        let stream = TokenStream::from_tokens(tokenize(sql).unwrap());
        stream.tokens.last().unwrap().leading_trivia.clone()
    }

    #[test]
    fn newline_trims_trailing_spaces() {
        let mut printer = Printer::new();
        printer.write("SELECT a ");
        printer.newline_at(5);
        printer.write(", b");
        assert_eq!(printer.finish(), "SELECT a\n     , b");
    }

    #[test]
    fn line_comment_mid_line_continues_at_hang() {
        let mut printer = Printer::new();
        printer.write("SELECT a,");
        printer.set_hang(7);
        printer.comments(&trivia_of_last("a -- note\nb"));
        printer.write("b");
        assert_eq!(printer.finish(), "SELECT a, -- note\n       b");
    }

    #[test]
    fn comment_at_line_start_gets_its_own_line() {
        let mut printer = Printer::new();
        printer.newline_at(2);
        printer.comments(&trivia_of_last("/* c */ FROM"));
        printer.write("FROM");
        assert_eq!(printer.finish(), "\n  /* c */\n  FROM");
    }
}
