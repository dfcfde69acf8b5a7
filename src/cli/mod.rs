//! CLI argument parsing and file discovery

use crate::config::{self, CONFIG_FILE_NAME};
use crate::formatter::rules::{Case, CommaPosition, StylePolicy};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// sqlcanon - An opinionated SQL formatter with leading commas and river alignment
#[derive(Parser, Debug)]
#[command(name = "sqlcanon")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub style: StyleArgs,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Format SQL files
    Fmt {
        /// Write formatted output back to files
        #[arg(short, long)]
        write: bool,

        /// Report files that need formatting instead of printing them
        #[arg(long, conflicts_with = "write")]
        check: bool,

        /// Files, directories or glob patterns to format (use - for stdin)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Check if files are formatted (exit code 1 if not)
    Check {
        /// Files, directories or glob patterns to check (use - for stdin)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

/// Style options; flags override the config file
#[derive(Args, Debug, Default)]
pub struct StyleArgs {
    /// Config file (defaults to ./sqlcanon.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, value_enum)]
    pub comma_position: Option<CommaPosition>,

    #[arg(long, global = true, value_enum)]
    pub keyword_case: Option<Case>,

    #[arg(long, global = true, value_enum)]
    pub identifier_case: Option<Case>,

    /// Column at which clause keywords end
    #[arg(long, global = true)]
    pub alignment_column: Option<usize>,

    /// Worker threads (defaults to one per CPU)
    #[arg(short, long, global = true)]
    pub jobs: Option<usize>,
}

impl StyleArgs {
    /// Build the policy from the config file and flags
    pub fn policy(&self) -> crate::Result<StylePolicy> {
        let mut policy = match &self.config {
            Some(path) => config::load_policy(path)?,
            None if Path::new(CONFIG_FILE_NAME).is_file() => config::load_policy(Path::new(CONFIG_FILE_NAME))?,
            None => StylePolicy::default(),
        };

        if let Some(position) = self.comma_position {
            policy = policy.with_comma_position(position);
        }
        if let Some(case) = self.keyword_case {
            policy = policy.with_keyword_case(case);
        }
        if let Some(case) = self.identifier_case {
            policy = policy.with_identifier_case(case);
        }
        if let Some(column) = self.alignment_column {
            policy = policy.with_alignment_column(column);
        }
        Ok(policy)
    }
}

/// Discover SQL files from a path: a file, a directory walked for `*.sql`,
/// or a glob pattern
pub fn discover_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        return vec![path.to_path_buf()];
    }

    if path.is_dir() {
        let mut files: Vec<PathBuf> = WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| is_sql_file(p))
            .collect();
        files.sort();
        return files;
    }

    // Handle glob patterns
    match glob::glob(&path.to_string_lossy()) {
        Ok(paths) => paths
            .filter_map(|p| p.ok())
            .filter(|p| p.is_file() && is_sql_file(p))
            .collect(),
        Err(e) => {
            log::warn!("invalid pattern {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

fn is_sql_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "sql")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let args = StyleArgs {
            comma_position: Some(CommaPosition::Trailing),
            keyword_case: Some(Case::Lower),
            ..StyleArgs::default()
        };
        let policy = args.policy().unwrap();
        assert_eq!(policy.base.comma_position, CommaPosition::Trailing);
        assert_eq!(policy.base.keyword_case, Case::Lower);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
