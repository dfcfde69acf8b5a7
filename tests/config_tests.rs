//! Configuration file tests for sqlcanon

use sqlcanon::ast::StatementKind;
use sqlcanon::config::{load_policy, parse_policy};
use sqlcanon::{format, Case, ClauseKind, CommaPosition, Error, StylePolicy};
use std::fs;
use tempfile::TempDir;

#[test]
fn empty_config_is_the_default_policy() {
    assert_eq!(parse_policy("").unwrap(), StylePolicy::default());
}

#[test]
fn base_options() {
    let policy = parse_policy(
        r#"
comma_position = "trailing"
keyword_case = "lower"
identifier_case = "preserve"
alignment_column = 8
"#,
    )
    .unwrap();
    assert_eq!(policy.base.comma_position, CommaPosition::Trailing);
    assert_eq!(policy.base.keyword_case, Case::Lower);
    assert_eq!(policy.base.identifier_case, Case::Preserve);
    assert_eq!(policy.base.alignment_column, 8);
}

#[test]
fn kind_and_clause_overrides() {
    let policy = parse_policy(
        r#"
[kinds.create_table]
comma_position = "leading"

[clauses.group_by]
comma_position = "trailing"
keyword_case = "lower"
"#,
    )
    .unwrap();

    assert_eq!(
        policy.for_kind(StatementKind::CreateTable).comma_position,
        CommaPosition::Leading
    );
    let group_by = policy.for_clause(StatementKind::Select, ClauseKind::GroupBy);
    assert_eq!(group_by.comma_position, CommaPosition::Trailing);
    assert_eq!(group_by.keyword_case, Case::Lower);
    assert_eq!(
        policy.for_clause(StatementKind::Select, ClauseKind::OrderBy).keyword_case,
        Case::Upper
    );
}

#[test]
fn clause_override_changes_output() {
    let policy = parse_policy("[clauses.group_by]\ncomma_position = \"trailing\"\n").unwrap();
    let result = format("select a, b from t group by a, b", &policy).unwrap();
    assert_eq!(
        result.text,
        "SELECT a\n     , b\n  FROM t\nGROUP BY a,\n         b\n"
    );
}

#[test]
fn wider_alignment_column() {
    let policy = parse_policy("alignment_column = 8").unwrap();
    let result = format("select a, b from t", &policy).unwrap();
    assert_eq!(result.text, "  SELECT a\n       , b\n    FROM t\n");
}

#[test]
fn unknown_key_is_rejected() {
    let err = parse_policy("comma_side = \"leading\"").unwrap_err();
    assert!(matches!(err, Error::ConfigError { .. }));
}

#[test]
fn unknown_value_is_rejected() {
    assert!(parse_policy("keyword_case = \"title\"").is_err());
}

#[test]
fn unknown_statement_kind_is_rejected() {
    let err = parse_policy("[kinds.merge]\nkeyword_case = \"lower\"").unwrap_err();
    assert!(err.to_string().contains("unknown variant `merge`"));
}

#[test]
fn unknown_clause_is_rejected() {
    let err = parse_policy("[clauses.qualify]\nkeyword_case = \"lower\"").unwrap_err();
    assert!(err.to_string().contains("unknown variant `qualify`"));
}

#[test]
fn load_from_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("sqlcanon.toml");
    fs::write(&path, "keyword_case = \"lower\"\n").unwrap();
    assert_eq!(load_policy(&path).unwrap().base.keyword_case, Case::Lower);
}

#[test]
fn missing_file_is_a_config_error() {
    let temp = TempDir::new().unwrap();
    let err = load_policy(&temp.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, Error::ConfigError { .. }));
}
