//! Expression-level helpers
//!
//! Expressions are never parsed into operator trees. These helpers only cut a
//! token slice at its top-level commas or AND/OR connectives.

use crate::ast::{Predicate, TokenRun};
use crate::parser::keywords;
use crate::parser::lexer::{Token, TokenKind};

/// Split `tokens` at commas at parenthesis depth zero.
///
/// Comments attached to a dropped comma move to the first token of the item
/// after it. Empty items are returned as empty runs so callers can reject them.
pub fn split_top_level_commas(tokens: &[Token]) -> Vec<TokenRun> {
    if tokens.is_empty() {
        return Vec::new();
    }

    let mut items = Vec::new();
    let mut current: Vec<Token> = Vec::new();
    let mut carried: Vec<Token> = Vec::new();
    let mut depth = 0usize;

    for token in tokens {
        if token.is_punct(',') && depth == 0 {
            items.push(TokenRun::new(std::mem::take(&mut current)));
            carried.extend(token.leading_trivia.iter().cloned());
            continue;
        }
        if token.is_punct('(') {
            depth += 1;
        } else if token.is_punct(')') {
            depth = depth.saturating_sub(1);
        }

        let mut token = token.clone();
        if current.is_empty() && !carried.is_empty() {
            let mut trivia = std::mem::take(&mut carried);
            trivia.append(&mut token.leading_trivia);
            token.leading_trivia = trivia;
        }
        current.push(token);
    }
    items.push(TokenRun::new(current));
    items
}

/// Split a condition at its top-level AND/OR connectives.
///
/// The `AND` of `BETWEEN x AND y` and anything inside parentheses or a
/// `CASE ... END` block stays inside its condition. Returns `None` when a
/// condition would be empty.
pub fn split_predicate(tokens: &[Token]) -> Option<Predicate> {
    let mut depth = 0usize;
    let mut case_depth = 0usize;
    let mut pending_between = 0usize;

    let mut conditions: Vec<(Option<Token>, Vec<Token>)> = vec![(None, Vec::new())];

    for token in tokens {
        if token.is_punct('(') {
            depth += 1;
        } else if token.is_punct(')') {
            depth = depth.saturating_sub(1);
        } else if depth == 0 {
            if token.is_keyword("CASE") {
                case_depth += 1;
            } else if token.is_keyword("END") {
                case_depth = case_depth.saturating_sub(1);
            } else if case_depth == 0 {
                if token.is_keyword("BETWEEN") {
                    pending_between += 1;
                } else if token.is_keyword("AND") && pending_between > 0 {
                    pending_between -= 1;
                } else if token.is_any_keyword(&["AND", "OR"]) {
                    conditions.push((Some(token.clone()), Vec::new()));
                    continue;
                }
            }
        }
        if let Some((_, run)) = conditions.last_mut() {
            run.push(token.clone());
        }
    }

    if conditions.iter().any(|(_, run)| run.is_empty()) {
        return None;
    }

    let mut iter = conditions.into_iter();
    let (_, first) = iter.next()?;
    let rest = iter
        .filter_map(|(connective, run)| connective.map(|c| (c, TokenRun::new(run))))
        .collect();

    Some(Predicate {
        first: TokenRun::new(first),
        rest,
    })
}

/// Can this token end an operand, so that a following name is an alias?
pub fn ends_operand(token: &Token) -> bool {
    match token.kind {
        TokenKind::Identifier
        | TokenKind::QuotedIdentifier
        | TokenKind::StringLiteral
        | TokenKind::NumberLiteral => true,
        TokenKind::Punctuation => token.is_punct(')'),
        TokenKind::Keyword => keywords::is_value_keyword(&token.text),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::{tokenize, TokenStream};

    fn significant(sql: &str) -> Vec<Token> {
        TokenStream::from_tokens(tokenize(sql).unwrap()).tokens
    }

    fn texts(run: &TokenRun) -> Vec<&str> {
        run.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn commas_inside_parentheses_do_not_split() {
        let items = split_top_level_commas(&significant("a, f(b, c), d"));
        assert_eq!(items.len(), 3);
        assert_eq!(texts(&items[1]), vec!["f", "(", "b", ",", "c", ")"]);
    }

    #[test]
    fn comma_comment_moves_to_next_item() {
        let items = split_top_level_commas(&significant("a /* x */, b"));
        assert_eq!(items[1].tokens[0].leading_trivia[0].text, "/* x */");
    }

    #[test]
    fn between_and_is_not_a_connective() {
        let predicate = split_predicate(&significant("a BETWEEN 1 AND 2 AND b = 3")).unwrap();
        assert_eq!(predicate.rest.len(), 1);
        assert_eq!(texts(&predicate.first), vec!["a", "BETWEEN", "1", "AND", "2"]);
    }

    #[test]
    fn case_block_is_opaque() {
        let predicate =
            split_predicate(&significant("CASE WHEN a AND b THEN 1 END = 1 OR c")).unwrap();
        assert_eq!(predicate.rest.len(), 1);
        assert!(predicate.rest[0].0.is_keyword("OR"));
    }

    #[test]
    fn dangling_connective_is_rejected() {
        assert!(split_predicate(&significant("a = 1 AND")).is_none());
    }
}
