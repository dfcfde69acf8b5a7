//! Utility functions for the SQL formatter

use crate::formatter::rules::StyleRule;
use crate::parser::keywords;
use crate::parser::lexer::{Token, TokenKind};
use std::borrow::Cow;

/// How a word token should be cased
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WordRole {
    /// Keywords take the keyword case, identifiers the identifier case
    Natural,
    /// Type names in column definitions are written like keywords
    TypeName,
}

/// Text of `token` with the rule's letter case applied
pub(crate) fn apply_case<'t>(token: &'t Token, rule: &StyleRule, role: WordRole) -> Cow<'t, str> {
    match token.kind {
        TokenKind::Keyword => Cow::Owned(rule.keyword_case.apply(&token.text)),
        TokenKind::Identifier if token.is_parameter() => Cow::Borrowed(&token.text),
        TokenKind::Identifier => match role {
            WordRole::Natural => Cow::Owned(rule.identifier_case.apply(&token.text)),
            WordRole::TypeName => Cow::Owned(rule.keyword_case.apply(&token.text)),
        },
        _ => Cow::Borrowed(&token.text),
    }
}

/// Should a space separate `prev` and `cur` inside a token run?
///
/// `before_prev` is the token before `prev`, used to tell unary signs from
/// binary operators. Joining two tokens never changes how they lex.
pub(crate) fn needs_space(before_prev: Option<&Token>, prev: &Token, cur: &Token) -> bool {
    if would_merge(prev, cur) {
        return true;
    }
    if cur.is_punct(',') || cur.is_punct(';') || cur.is_punct(')') || prev.is_punct('(') {
        return false;
    }
    if cur.is_punct('.') {
        return prev.kind == TokenKind::NumberLiteral;
    }
    if prev.is_punct('.') {
        return !hugs_dot(cur);
    }
    if cur.is_operator("::") {
        return !matches!(
            prev.kind,
            TokenKind::Identifier
                | TokenKind::QuotedIdentifier
                | TokenKind::Keyword
                | TokenKind::StringLiteral
                | TokenKind::NumberLiteral
        ) && !prev.is_punct(')');
    }
    if prev.is_operator("::") {
        return !cur.is_word();
    }
    if cur.is_punct('(') && is_callable(prev) {
        return false;
    }
    if is_unary_sign(before_prev, prev) && cur.kind != TokenKind::Operator {
        return false;
    }
    true
}

/// Joining would start a comment or fuse two operators
fn would_merge(prev: &Token, cur: &Token) -> bool {
    (prev.kind == TokenKind::Operator && cur.kind == TokenKind::Operator)
        || (prev.text.ends_with('-') && cur.text.starts_with('-'))
        || (prev.text.ends_with('/') && cur.text.starts_with('*'))
}

/// `t.col`, `t.*`, `"s"."t"`
fn hugs_dot(cur: &Token) -> bool {
    let starts_with_digit = cur.text.starts_with(|c: char| c.is_ascii_digit());
    match cur.kind {
        TokenKind::Identifier | TokenKind::Keyword => !starts_with_digit && !cur.is_parameter(),
        TokenKind::QuotedIdentifier => true,
        TokenKind::Operator => cur.text == "*",
        _ => false,
    }
}

fn is_callable(token: &Token) -> bool {
    match token.kind {
        TokenKind::Identifier => !token.is_parameter(),
        TokenKind::QuotedIdentifier => true,
        TokenKind::Keyword => keywords::is_callable(&token.text),
        _ => false,
    }
}

fn is_unary_sign(before_prev: Option<&Token>, prev: &Token) -> bool {
    if !(prev.is_operator("-") || prev.is_operator("+") || prev.is_operator("~")) {
        return false;
    }
    match before_prev {
        None => true,
        Some(t) => match t.kind {
            TokenKind::Operator => true,
            TokenKind::Punctuation => t.is_punct('(') || t.is_punct(','),
            TokenKind::Keyword => !keywords::is_value_keyword(&t.text),
            _ => false,
        },
    }
}
