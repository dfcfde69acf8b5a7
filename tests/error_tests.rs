//! Error handling tests for sqlcanon
//!
//! Fatal errors abort a file; recoverable problems leave the statement as
//! written and come back as diagnostics.

use sqlcanon::{
    check, check_with_limits, format, format_with_limits, CancellationToken, DiagnosticKind, Error, Limits,
    StylePolicy,
};

fn policy() -> StylePolicy {
    StylePolicy::default()
}

mod fatal_errors {
    use super::*;

    #[test]
    fn unmatched_open_paren_points_at_it() {
        let err = check("SELECT id FROM (users", &policy()).unwrap_err();
        match err {
            Error::ParseError { offset, line, col, .. } => {
                assert_eq!(offset, 15);
                assert_eq!((line, col), (1, 16));
            }
            other => panic!("expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn unmatched_close_paren() {
        let err = format("SELECT a) FROM t", &policy()).unwrap_err();
        assert!(matches!(err, Error::ParseError { offset: 8, .. }));
    }

    #[test]
    fn unbalanced_parens_in_any_statement_fail_the_file() {
        let err = format("SELECT 1; SELECT (2", &policy()).unwrap_err();
        assert_eq!(err.offset(), Some(17));
    }

    #[test]
    fn unterminated_string() {
        let err = format("SELECT 'unclosed FROM t", &policy()).unwrap_err();
        assert!(matches!(err, Error::LexError { offset: 7, .. }));
    }

    #[test]
    fn unterminated_block_comment() {
        let err = format("SELECT a /* open", &policy()).unwrap_err();
        assert!(matches!(err, Error::LexError { offset: 9, .. }));
    }

    #[test]
    fn unterminated_quoted_identifier() {
        let err = format("SELECT \"col FROM t", &policy()).unwrap_err();
        assert!(err.to_string().contains("unterminated quoted identifier"));
    }
}

mod recoverable {
    use super::*;

    #[test]
    fn out_of_order_clauses_are_kept_verbatim() {
        let result = format("SELECT a FROM t WHERE x = 1 FROM u", &policy()).unwrap();
        assert_eq!(result.text, "SELECT a FROM t WHERE x = 1 FROM u\n");
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::PartiallyFormatted);
        assert_eq!(result.diagnostics[0].offset, 0);
    }

    #[test]
    fn demotion_only_affects_its_statement() {
        let result = format("select a from t limit; select b from u", &policy()).unwrap();
        assert_eq!(result.text, "select a from t limit;\n\nSELECT b\n  FROM u\n");
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].line, 1);
    }

    #[test]
    fn unknown_character_reports_lex_diagnostic() {
        let result = format("select # from t;\nselect 1", &policy()).unwrap();
        assert_eq!(result.text, "select # from t;\n\nSELECT 1\n");
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::LexError);
        assert_eq!(result.diagnostics[0].offset, 7);
    }

    #[test]
    fn diagnostics_carry_line_and_column() {
        let result = format("select 1;\n\nupdate t set where x = 1", &policy()).unwrap();
        let diagnostic = &result.diagnostics[0];
        assert_eq!(diagnostic.line, 3);
        assert!(diagnostic.to_string().starts_with("3:"));
    }

    #[test]
    fn check_of_verbatim_statement_is_canonical() {
        let outcome = check("drop table t;\n", &policy()).unwrap();
        assert!(outcome.is_canonical);
    }
}

mod limits {
    use super::*;

    #[test]
    fn oversized_file_is_rejected() {
        let limits = Limits {
            max_file_bytes: 8,
            ..Limits::default()
        };
        let err = format_with_limits("SELECT a FROM t", &policy(), &limits, None).unwrap_err();
        assert!(matches!(err, Error::ResourceLimitExceeded { actual: 15, limit: 8, .. }));
    }

    #[test]
    fn oversized_statement_is_rejected() {
        let limits = Limits {
            max_statement_bytes: 10,
            ..Limits::default()
        };
        let err = check_with_limits("SELECT 1; SELECT a, b, c FROM t", &policy(), &limits, None).unwrap_err();
        assert!(matches!(err, Error::ResourceLimitExceeded { .. }));
    }

    #[test]
    fn cancelled_before_first_statement() {
        let token = CancellationToken::new();
        token.cancel();
        let err = format_with_limits("SELECT 1", &policy(), &Limits::default(), Some(&token)).unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }
}
