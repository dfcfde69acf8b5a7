//! Formatting tests for sqlcanon
//!
//! These tests verify the river layout, comma placement and casing rules.

use pretty_assertions::assert_eq;
use sqlcanon::{check, format, Case, CommaPosition, StylePolicy};

/// Helper to format with the default policy and compare
fn assert_formats_to(input: &str, expected: &str) {
    assert_formats_with(input, &StylePolicy::default(), expected);
}

fn assert_formats_with(input: &str, policy: &StylePolicy, expected: &str) {
    let result = format(input, policy).expect("format should succeed");
    assert_eq!(result.text, expected);
}

/// Helper to verify formatting is idempotent
fn assert_idempotent(input: &str) {
    let policy = StylePolicy::default();
    let formatted = format(input, &policy).expect("first format should succeed").text;
    let reformatted = format(&formatted, &policy).expect("second format should succeed").text;
    assert_eq!(formatted, reformatted, "formatting should be idempotent");
}

// =============================================================================
// SELECT LISTS - leading commas, river alignment
// =============================================================================

mod select_lists {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn leading_commas_and_river() {
        assert_formats_to(
            "select id,name,email from users where is_active=1",
            "SELECT id\n     , name\n     , email\n  FROM users\n WHERE is_active = 1\n",
        );
    }

    #[test]
    fn single_column_has_no_comma() {
        let result = format("select id from users", &StylePolicy::default()).unwrap();
        assert_eq!(result.text, "SELECT id\n  FROM users\n");
        assert!(!result.text.contains(','));
    }

    #[test]
    fn no_where_clause() {
        assert_formats_to("SELECT a, b FROM t", "SELECT a\n     , b\n  FROM t\n");
    }

    #[test]
    fn comma_count_matches_items() {
        let result = format("select a, b, c, d from t", &StylePolicy::default()).unwrap();
        assert_eq!(result.text.matches(',').count(), 3);
        for line in result.text.lines().skip(1).take(3) {
            assert!(line.starts_with("     , "), "line {:?}", line);
        }
    }

    #[test]
    fn trailing_commas_on_request() {
        let policy = StylePolicy::default().with_comma_position(CommaPosition::Trailing);
        assert_formats_with("SELECT a, b FROM t", &policy, "SELECT a,\n       b\n  FROM t\n");
    }

    #[test]
    fn aliases_and_functions() {
        assert_formats_to(
            "select count( * ) as n, upper(name) label from users",
            "SELECT COUNT(*) AS n\n     , UPPER(name) label\n  FROM users\n",
        );
    }

    #[test]
    fn qualified_names_stay_tight() {
        assert_formats_to("select u . id, u.* from users u", "SELECT u.id\n     , u.*\n  FROM users u\n");
    }

    #[test]
    fn distinct_stays_with_select() {
        assert_formats_to("select distinct a, b from t", "SELECT DISTINCT a\n              , b\n  FROM t\n");
    }
}

// =============================================================================
// CASING
// =============================================================================

mod casing {
    use super::*;

    #[test]
    fn keywords_upper_identifiers_lower_by_default() {
        assert_formats_to("SeLeCt Id FrOm UsErS", "SELECT id\n  FROM users\n");
    }

    #[test]
    fn quoted_identifiers_are_untouched() {
        assert_formats_to(
            "select \"UserId\", [Weird Name] from \"Users\"",
            "SELECT \"UserId\"\n     , [Weird Name]\n  FROM \"Users\"\n",
        );
    }

    #[test]
    fn lower_keywords_preserved_identifiers() {
        let policy = StylePolicy::default()
            .with_keyword_case(Case::Lower)
            .with_identifier_case(Case::Preserve);
        assert_formats_with("SELECT Id FROM Users", &policy, "select Id\n  from Users\n");
    }

    #[test]
    fn string_literals_keep_case() {
        assert_formats_to("select 'MiXeD' from t", "SELECT 'MiXeD'\n  FROM t\n");
    }

    #[test]
    fn bind_parameters_keep_case() {
        assert_formats_to("select a from t where id = :UserId", "SELECT a\n  FROM t\n WHERE id = :UserId\n");
    }
}

// =============================================================================
// CLAUSES
// =============================================================================

mod clauses {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn predicates_split_on_and_or() {
        assert_formats_to(
            "delete from users where id = 1 or id = 2",
            "DELETE FROM users\n WHERE id = 1\n    OR id = 2\n",
        );
    }

    #[test]
    fn between_and_stays_on_one_line() {
        assert_formats_to(
            "select a from t where a between 1 and 2 and b = 3",
            "SELECT a\n  FROM t\n WHERE a BETWEEN 1 AND 2\n   AND b = 3\n",
        );
    }

    #[test]
    fn wide_keywords_start_at_base() {
        assert_formats_to(
            "select dept, count(*) as n from emp group by dept having count(*) > 1 \
             order by n desc nulls last limit 10 offset 5",
            "SELECT dept\n     , COUNT(*) AS n\n  FROM emp\nGROUP BY dept\nHAVING COUNT(*) > 1\n\
             ORDER BY n DESC NULLS LAST\n LIMIT 10\nOFFSET 5\n",
        );
    }

    #[test]
    fn joins_are_right_aligned() {
        assert_formats_to(
            "select u.id, o.total from users u left join orders o on o.user_id = u.id \
             and o.status = 'paid' join items i using (order_id) where u.active = true",
            "SELECT u.id\n     , o.total\n  FROM users u\nLEFT JOIN orders o\n    ON o.user_id = u.id\n   \
             AND o.status = 'paid'\n  JOIN items i USING (order_id)\n WHERE u.active = TRUE\n",
        );
    }

    #[test]
    fn comma_joins_follow_list_style() {
        assert_formats_to("select a from t, u where t.id = u.id", "SELECT a\n  FROM t\n     , u\n WHERE t.id = u.id\n");
    }

    #[test]
    fn subquery_in_from() {
        assert_formats_to(
            "select x from (select a as x from t) s",
            "SELECT x\n  FROM (SELECT a AS x\n          FROM t) s\n",
        );
    }

    #[test]
    fn union_all() {
        assert_formats_to(
            "select a from t union all select b from u",
            "SELECT a\n  FROM t\nUNION ALL\nSELECT b\n  FROM u\n",
        );
    }

    #[test]
    fn long_union_chain_formats() {
        let sql = format!("select 1{}", " union select 1".repeat(10_000));
        let formatted = format(&sql, &StylePolicy::default()).expect("format should succeed");
        assert!(formatted.text.starts_with("SELECT 1\n UNION\nSELECT 1\n"));
        assert_eq!(formatted.text.matches("UNION").count(), 10_000);
        assert_idempotent(&formatted.text);
    }

    #[test]
    fn common_table_expressions() {
        assert_formats_to(
            "with active as (select id from users where active = 1) select id from active",
            "WITH active AS (\n    SELECT id\n      FROM users\n     WHERE active = 1\n)\nSELECT id\n  FROM active\n",
        );
    }

    #[test]
    fn second_cte_takes_leading_comma() {
        assert_formats_to(
            "with a as (select 1), b as (select 2) select * from a, b",
            "WITH a AS (\n    SELECT 1\n)\n, b AS (\n    SELECT 2\n)\nSELECT *\n  FROM a\n     , b\n",
        );
    }
}

// =============================================================================
// DML / DDL
// =============================================================================

mod statements {
    use super::*;

    #[test]
    fn insert_values() {
        assert_formats_to(
            "insert into users (id, name) values (1, 'a'), (2, 'b')",
            "INSERT INTO users\n     ( id\n     , name\n     )\nVALUES (1, 'a')\n     , (2, 'b')\n",
        );
    }

    #[test]
    fn insert_select() {
        assert_formats_to(
            "insert into archive select * from users",
            "INSERT INTO archive\nSELECT *\n  FROM users\n",
        );
    }

    #[test]
    fn update_set_list() {
        assert_formats_to(
            "update users set name = 'x', active = 0 where id = 1",
            "UPDATE users\n   SET name = 'x'\n     , active = 0\n WHERE id = 1\n",
        );
    }

    #[test]
    fn create_table_uses_trailing_commas() {
        assert_formats_to(
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL)",
            "CREATE TABLE users (\n    id INTEGER PRIMARY KEY,\n    name TEXT NOT NULL\n)\n",
        );
    }

    #[test]
    fn create_table_type_names_take_keyword_case() {
        assert_formats_to(
            "create table if not exists t (price decimal(10, 2) default 0, primary key (id))",
            "CREATE TABLE IF NOT EXISTS t (\n    price DECIMAL(10, 2) DEFAULT 0,\n    PRIMARY KEY (id)\n)\n",
        );
    }

    #[test]
    fn create_index_with_partial_predicate() {
        assert_formats_to(
            "create unique index if not exists idx_email on users (email, created_at desc) where deleted_at is null",
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_email ON users (email, created_at DESC)\n WHERE deleted_at IS NULL\n",
        );
    }

    #[test]
    fn create_view() {
        assert_formats_to(
            "create view active_users as select id from users where active = 1",
            "CREATE VIEW active_users AS\nSELECT id\n  FROM users\n WHERE active = 1\n",
        );
    }

    #[test]
    fn alter_table_single_action_inline() {
        assert_formats_to("alter table users add column age integer", "ALTER TABLE users ADD COLUMN age integer\n");
    }

    #[test]
    fn alter_table_several_actions() {
        assert_formats_to(
            "alter table users add column age integer, drop column name",
            "ALTER TABLE users\n    ADD COLUMN age integer,\n    DROP COLUMN name\n",
        );
    }

    #[test]
    fn unknown_statements_are_verbatim() {
        assert_formats_to("drop   table users;", "drop   table users;\n");
    }

    #[test]
    fn statements_are_separated_by_blank_lines() {
        assert_formats_to("select 1; select 2;", "SELECT 1;\n\nSELECT 2;\n");
    }
}

// =============================================================================
// COMMENTS
// =============================================================================

mod comments {
    use super::*;

    #[test]
    fn leading_comment_keeps_its_line() {
        assert_formats_to("-- header\nselect a from t", "-- header\nSELECT a\n  FROM t\n");
    }

    #[test]
    fn block_comment_before_clause() {
        assert_formats_to("select a /* x */ from t", "SELECT a\n  /* x */\n  FROM t\n");
    }

    #[test]
    fn comment_before_comma_moves_with_item() {
        assert_formats_to("select a -- first\n, b from t", "SELECT a\n     -- first\n     , b\n  FROM t\n");
    }

    #[test]
    fn comments_after_last_statement() {
        assert_formats_to("select 1;\n-- one\n/* two */", "SELECT 1;\n-- one\n/* two */\n");
    }

    #[test]
    fn comment_before_stray_semicolon_leads_verbatim_statement() {
        assert_formats_to("/* header */ ;\nDROP TABLE x;", "/* header */\nDROP TABLE x;\n");
    }

    #[test]
    fn carried_and_own_comments_of_verbatim_statement() {
        assert_formats_to(
            "/* a */ ; -- b\ndrop  table x",
            "/* a */\n-- b\ndrop  table x\n",
        );
    }
}

// =============================================================================
// IDEMPOTENCE AND CHECK
// =============================================================================

mod idempotence {
    use super::*;

    #[test]
    fn formatting_twice_changes_nothing() {
        let inputs = [
            "select id,name,email from users where is_active=1",
            "select a -- c\n, b /* d */ from t where x = 1 and y = 2",
            "with a as (select 1), b as (select x from (select 2 as x) s) select * from a join b on a.x = b.x",
            "insert into t (a, b) values (1, 2) on conflict do nothing",
            "update t set a = (select max(b) from u) from u where t.id = u.id returning *",
            "create table t (id int primary key, name text, unique (name))",
            "select a from t union select b from u except select c from v",
            "drop table t; select 1",
        ];
        for input in inputs {
            assert_idempotent(input);
        }
    }

    #[test]
    fn formatted_output_is_canonical() {
        let policy = StylePolicy::default();
        let formatted = format("select id,name,email from users where is_active=1", &policy).unwrap();
        let outcome = check(&formatted.text, &policy).unwrap();
        assert!(outcome.is_canonical);
        assert!(outcome.diff.is_none());
    }

    #[test]
    fn check_reports_a_diff() {
        let outcome = check("select a from t", &StylePolicy::default()).unwrap();
        assert!(!outcome.is_canonical);
        let diff = outcome.diff.unwrap();
        assert!(diff.contains("-select a from t"));
        assert!(diff.contains("+SELECT a"));
    }

    #[test]
    fn check_ignores_missing_final_newline() {
        let outcome = check("SELECT a\n  FROM t", &StylePolicy::default()).unwrap();
        assert!(outcome.is_canonical);
    }

    #[test]
    fn empty_input_formats_to_nothing() {
        assert_formats_to("", "");
        assert_formats_to("  \n\n", "");
    }
}
