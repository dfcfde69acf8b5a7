//! Formatting rules
//!
//! The style is an immutable [`StylePolicy`] built once by the caller:
//! - Keywords: upper case
//! - Identifiers: lower case (quoted identifiers are never touched)
//! - Commas: leading, except for DDL definition lists
//! - Clause keywords right-aligned so they end at the alignment column
//!
//! Lookups resolve clause overrides first, then statement-kind overrides, then
//! the base rule.

use crate::ast::StatementKind;
use clap::ValueEnum;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Width of `SELECT`, the keyword the other clause keywords line up with
pub const DEFAULT_ALIGNMENT_COLUMN: usize = 6;

/// Which side of a list item its separating comma goes on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CommaPosition {
    Leading,
    Trailing,
}

/// Letter case applied to keywords or identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Case {
    Upper,
    Lower,
    Preserve,
}

impl Case {
    /// Apply the case to an unquoted word. Folding is ASCII-only so byte
    /// lengths never change.
    pub fn apply(self, word: &str) -> String {
        match self {
            Case::Upper => word.to_ascii_uppercase(),
            Case::Lower => word.to_ascii_lowercase(),
            Case::Preserve => word.to_string(),
        }
    }
}

/// Clause types that can carry their own overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClauseKind {
    With,
    SelectList,
    From,
    Join,
    Where,
    GroupBy,
    Having,
    OrderBy,
    Limit,
    SetOperation,
    InsertColumns,
    Values,
    Set,
    Returning,
    TableElements,
    IndexColumns,
    AlterActions,
}

/// The resolved style for one statement kind or clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleRule {
    pub comma_position: CommaPosition,
    pub keyword_case: Case,
    pub identifier_case: Case,
    /// Column at which right-aligned clause keywords end
    pub alignment_column: usize,
}

impl Default for StyleRule {
    fn default() -> Self {
        Self {
            comma_position: CommaPosition::Leading,
            keyword_case: Case::Upper,
            identifier_case: Case::Lower,
            alignment_column: DEFAULT_ALIGNMENT_COLUMN,
        }
    }
}

/// A partial rule; unset fields fall through to the next level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StyleOverride {
    pub comma_position: Option<CommaPosition>,
    pub keyword_case: Option<Case>,
    pub identifier_case: Option<Case>,
    pub alignment_column: Option<usize>,
}

impl StyleOverride {
    pub fn comma(position: CommaPosition) -> Self {
        Self {
            comma_position: Some(position),
            ..Self::default()
        }
    }

    fn apply_to(&self, rule: &mut StyleRule) {
        if let Some(v) = self.comma_position {
            rule.comma_position = v;
        }
        if let Some(v) = self.keyword_case {
            rule.keyword_case = v;
        }
        if let Some(v) = self.identifier_case {
            rule.identifier_case = v;
        }
        if let Some(v) = self.alignment_column {
            rule.alignment_column = v;
        }
    }

    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Immutable formatting configuration, safe to share across threads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylePolicy {
    pub base: StyleRule,
    pub kinds: BTreeMap<StatementKind, StyleOverride>,
    pub clauses: BTreeMap<ClauseKind, StyleOverride>,
}

impl Default for StylePolicy {
    fn default() -> Self {
        let trailing = StyleOverride::comma(CommaPosition::Trailing);
        let kinds = [
            (StatementKind::CreateTable, trailing),
            (StatementKind::CreateIndex, trailing),
            (StatementKind::AlterTable, trailing),
        ]
        .into_iter()
        .collect();

        Self {
            base: StyleRule::default(),
            kinds,
            clauses: BTreeMap::new(),
        }
    }
}

impl StylePolicy {
    /// Rule for a statement kind: kind override over the base rule
    pub fn for_kind(&self, kind: StatementKind) -> StyleRule {
        let mut rule = self.base;
        if let Some(o) = self.kinds.get(&kind) {
            o.apply_to(&mut rule);
        }
        rule
    }

    /// Rule for one clause of a statement: clause override over kind override
    pub fn for_clause(&self, kind: StatementKind, clause: ClauseKind) -> StyleRule {
        let mut rule = self.for_kind(kind);
        if let Some(o) = self.clauses.get(&clause) {
            o.apply_to(&mut rule);
        }
        rule
    }

    /// Set the comma position everywhere, dropping narrower comma overrides
    pub fn with_comma_position(mut self, position: CommaPosition) -> Self {
        self.base.comma_position = position;
        self.clear(|o| o.comma_position = None);
        self
    }

    pub fn with_keyword_case(mut self, case: Case) -> Self {
        self.base.keyword_case = case;
        self.clear(|o| o.keyword_case = None);
        self
    }

    pub fn with_identifier_case(mut self, case: Case) -> Self {
        self.base.identifier_case = case;
        self.clear(|o| o.identifier_case = None);
        self
    }

    pub fn with_alignment_column(mut self, column: usize) -> Self {
        self.base.alignment_column = column;
        self.clear(|o| o.alignment_column = None);
        self
    }

    pub fn with_kind_override(mut self, kind: StatementKind, o: StyleOverride) -> Self {
        self.kinds.insert(kind, o);
        self
    }

    pub fn with_clause_override(mut self, clause: ClauseKind, o: StyleOverride) -> Self {
        self.clauses.insert(clause, o);
        self
    }

    fn clear(&mut self, field: impl Fn(&mut StyleOverride)) {
        for o in self.kinds.values_mut().chain(self.clauses.values_mut()) {
            field(o);
        }
        self.kinds.retain(|_, o| !o.is_empty());
        self.clauses.retain(|_, o| !o.is_empty());
    }
}
