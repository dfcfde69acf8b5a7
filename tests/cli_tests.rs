//! CLI integration tests
//!
//! Tests for the sqlcanon command-line interface.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn sqlcanon() -> Command {
    Command::cargo_bin("sqlcanon").unwrap()
}

const UGLY: &str = "select id,name from users where active=1";
const CANONICAL: &str = "SELECT id\n     , name\n  FROM users\n WHERE active = 1\n";

mod fmt_command {
    use super::*;

    #[test]
    fn fmt_single_file_to_stdout() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("query.sql");
        fs::write(&file_path, UGLY).unwrap();

        sqlcanon()
            .arg("fmt")
            .arg(&file_path)
            .assert()
            .success()
            .stdout(CANONICAL);

        // Not written back without --write
        assert_eq!(fs::read_to_string(&file_path).unwrap(), UGLY);
    }

    #[test]
    fn fmt_single_file_in_place() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("query.sql");
        fs::write(&file_path, UGLY).unwrap();

        sqlcanon().arg("fmt").arg("--write").arg(&file_path).assert().success();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), CANONICAL);
    }

    #[test]
    fn fmt_directory_recursive() {
        let temp = TempDir::new().unwrap();
        let subdir = temp.path().join("models");
        fs::create_dir(&subdir).unwrap();

        let file1 = temp.path().join("root.sql");
        let file2 = subdir.join("model.sql");
        let other = subdir.join("notes.txt");
        fs::write(&file1, "SELECT A FROM B").unwrap();
        fs::write(&file2, "SELECT C FROM D").unwrap();
        fs::write(&other, "select me").unwrap();

        sqlcanon().arg("fmt").arg("-w").arg(temp.path()).assert().success();

        assert_eq!(fs::read_to_string(&file1).unwrap(), "SELECT a\n  FROM b\n");
        assert_eq!(fs::read_to_string(&file2).unwrap(), "SELECT c\n  FROM d\n");
        assert_eq!(fs::read_to_string(&other).unwrap(), "select me");
    }

    #[test]
    fn fmt_glob_pattern() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.sql"), "select 1").unwrap();
        fs::write(temp.path().join("b.sql"), "select 2").unwrap();

        let pattern = temp.path().join("*.sql");
        sqlcanon()
            .arg("fmt")
            .arg(pattern.to_string_lossy().as_ref())
            .assert()
            .success()
            .stdout(predicate::str::contains("SELECT 1").and(predicate::str::contains("SELECT 2")));
    }

    #[test]
    fn fmt_stdin() {
        sqlcanon()
            .arg("fmt")
            .arg("-")
            .write_stdin(UGLY)
            .assert()
            .success()
            .stdout(CANONICAL);
    }

    #[test]
    fn fmt_check_flag_behaves_like_check() {
        sqlcanon()
            .args(["fmt", "--check", "-"])
            .write_stdin(UGLY)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("<stdin>: needs formatting"));
    }

    #[test]
    fn style_flags_override_defaults() {
        sqlcanon()
            .args(["fmt", "--keyword-case", "lower", "--comma-position", "trailing", "-"])
            .write_stdin("SELECT a, b FROM t")
            .assert()
            .success()
            .stdout("select a,\n       b\n  from t\n");
    }

    #[test]
    fn config_file_is_used() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("style.toml");
        fs::write(&config, "keyword_case = \"lower\"\n").unwrap();

        sqlcanon()
            .arg("--config")
            .arg(&config)
            .args(["fmt", "-"])
            .write_stdin("SELECT a FROM t")
            .assert()
            .success()
            .stdout("select a\n  from t\n");
    }

    #[test]
    fn config_in_working_directory_is_picked_up() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("sqlcanon.toml"), "identifier_case = \"upper\"\n").unwrap();

        sqlcanon()
            .current_dir(temp.path())
            .args(["fmt", "-"])
            .write_stdin("select a from t")
            .assert()
            .success()
            .stdout("SELECT A\n  FROM T\n");
    }

    #[test]
    fn bad_config_exits_with_error() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("style.toml");
        fs::write(&config, "comma = \"left\"\n").unwrap();

        sqlcanon()
            .arg("--config")
            .arg(&config)
            .args(["fmt", "-"])
            .write_stdin("select 1")
            .assert()
            .code(2)
            .stderr(predicate::str::contains("config error"));
    }
}

mod check_command {
    use super::*;

    #[test]
    fn check_formatted_file_succeeds() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("query.sql");
        fs::write(&file_path, CANONICAL).unwrap();

        sqlcanon().arg("check").arg(&file_path).assert().success();
    }

    #[test]
    fn check_unformatted_file_fails_with_diff() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("query.sql");
        fs::write(&file_path, UGLY).unwrap();

        sqlcanon()
            .arg("check")
            .arg(&file_path)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("needs formatting"))
            .stdout(predicate::str::contains("+SELECT id"));
    }

    #[test]
    fn check_multiple_files_reports_only_unformatted() {
        let temp = TempDir::new().unwrap();
        let good = temp.path().join("good.sql");
        let bad = temp.path().join("bad.sql");
        fs::write(&good, CANONICAL).unwrap();
        fs::write(&bad, UGLY).unwrap();

        sqlcanon()
            .arg("check")
            .arg(&good)
            .arg(&bad)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("bad.sql: needs formatting"))
            .stderr(predicate::str::contains("good.sql").not());
    }
}

mod errors {
    use super::*;

    #[test]
    fn parse_error_leaves_file_untouched() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("broken.sql");
        fs::write(&file_path, "SELECT id FROM (users").unwrap();

        sqlcanon()
            .arg("fmt")
            .arg("--write")
            .arg(&file_path)
            .assert()
            .code(2)
            .stderr(predicate::str::contains("unmatched `(`"));

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "SELECT id FROM (users");
    }

    #[test]
    fn errors_in_one_file_do_not_block_others() {
        let temp = TempDir::new().unwrap();
        let broken = temp.path().join("broken.sql");
        let fine = temp.path().join("fine.sql");
        fs::write(&broken, "SELECT 'open").unwrap();
        fs::write(&fine, "select 1").unwrap();

        sqlcanon().arg("fmt").arg("-w").arg(&broken).arg(&fine).assert().code(2);

        assert_eq!(fs::read_to_string(&fine).unwrap(), "SELECT 1\n");
    }

    #[test]
    fn missing_path_is_an_error() {
        let temp = TempDir::new().unwrap();
        sqlcanon()
            .arg("check")
            .arg(temp.path().join("missing.sql"))
            .assert()
            .code(2)
            .stderr(predicate::str::contains("no SQL files found"));
    }

    #[test]
    fn partially_formatted_statement_is_reported() {
        sqlcanon()
            .args(["fmt", "-"])
            .write_stdin("select a from t where x = 1 from u")
            .assert()
            .success()
            .stdout("select a from t where x = 1 from u\n")
            .stderr(predicate::str::contains("partially formatted"));
    }

    #[test]
    fn requires_a_subcommand() {
        sqlcanon().assert().failure();
    }
}
