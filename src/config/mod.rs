//! TOML configuration
//!
//! A config file sets the base rule at the top level and overrides in
//! `[kinds.<statement_kind>]` and `[clauses.<clause>]` tables:
//!
//! ```toml
//! comma_position = "leading"
//! keyword_case = "upper"
//!
//! [kinds.create_table]
//! comma_position = "trailing"
//!
//! [clauses.group_by]
//! comma_position = "trailing"
//! ```

use crate::ast::StatementKind;
use crate::error::{Error, Result};
use crate::formatter::rules::{Case, ClauseKind, CommaPosition, StyleOverride, StylePolicy};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Name of the config file picked up from the working directory
pub const CONFIG_FILE_NAME: &str = "sqlcanon.toml";

/// Config file contents; every option is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StyleConfig {
    pub comma_position: Option<CommaPosition>,
    pub keyword_case: Option<Case>,
    pub identifier_case: Option<Case>,
    pub alignment_column: Option<usize>,
    #[serde(default)]
    pub kinds: BTreeMap<StatementKind, StyleOverride>,
    #[serde(default)]
    pub clauses: BTreeMap<ClauseKind, StyleOverride>,
}

impl StyleConfig {
    /// Apply the config on top of the default policy
    pub fn into_policy(self) -> StylePolicy {
        let mut policy = StylePolicy::default();
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
        for (kind, o) in self.kinds {
            policy = policy.with_kind_override(kind, o);
        }
        for (clause, o) in self.clauses {
            policy = policy.with_clause_override(clause, o);
        }
        policy
    }
}

/// Parse config text into a policy
pub fn parse_policy(text: &str) -> Result<StylePolicy> {
    let config: StyleConfig = toml::from_str(text).map_err(|e| Error::ConfigError {
        message: e.to_string(),
    })?;
    Ok(config.into_policy())
}

/// Load a policy from a config file
pub fn load_policy(path: &Path) -> Result<StylePolicy> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::ConfigError {
        message: format!("cannot read {}: {}", path.display(), e),
    })?;
    log::debug!("loaded config from {}", path.display());
    parse_policy(&text)
}
