//! Structural tree for SQL statements
//!
//! The tree is shallow: it knows clause boundaries and item lists, while the
//! items themselves are opaque [`TokenRun`]s. Every keyword that the source
//! spelled out is kept as a [`Token`] so that comments attached to it survive
//! rendering.

use crate::parser::lexer::Token;
use serde::Deserialize;

/// A contiguous slice of tokens kept as written
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenRun {
    pub tokens: Vec<Token>,
}

impl TokenRun {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn first(&self) -> Option<&Token> {
        self.tokens.first()
    }

    pub fn last(&self) -> Option<&Token> {
        self.tokens.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }
}

/// Statement categories, used to key the style rule table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    CreateTable,
    CreateIndex,
    CreateView,
    AlterTable,
    Other,
}

/// A parsed statement with its terminator
#[derive(Debug, Clone, PartialEq)]
pub struct SourceStatement {
    pub statement: Statement,
    pub semicolon: Option<Token>,
    /// Byte offset where the statement starts, leading comments included
    pub start: usize,
    /// Byte offset one past the last significant token
    pub end: usize,
    /// Every significant token of the statement, in source order
    pub tokens: Vec<Token>,
}

/// A complete SQL statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(SelectStatement),
    Insert(InsertStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
    CreateTable(CreateTableStatement),
    CreateIndex(CreateIndexStatement),
    CreateView(CreateViewStatement),
    AlterTable(AlterTableStatement),
    Other(OpaqueStatement),
}

impl Statement {
    pub fn kind(&self) -> StatementKind {
        match self {
            Statement::Select(_) => StatementKind::Select,
            Statement::Insert(_) => StatementKind::Insert,
            Statement::Update(_) => StatementKind::Update,
            Statement::Delete(_) => StatementKind::Delete,
            Statement::CreateTable(_) => StatementKind::CreateTable,
            Statement::CreateIndex(_) => StatementKind::CreateIndex,
            Statement::CreateView(_) => StatementKind::CreateView,
            Statement::AlterTable(_) => StatementKind::AlterTable,
            Statement::Other(_) => StatementKind::Other,
        }
    }
}

/// A clause keyword (possibly several words) and its body
#[derive(Debug, Clone, PartialEq)]
pub struct Clause<T> {
    pub keyword: Vec<Token>,
    pub body: T,
}

/// SELECT statement
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub with_clause: Option<WithClause>,
    /// `SELECT` plus `DISTINCT`/`ALL` when present
    pub select: Vec<Token>,
    pub columns: Vec<SelectColumn>,
    pub from: Option<Clause<Vec<FromItem>>>,
    pub where_clause: Option<Clause<Predicate>>,
    pub group_by: Option<Clause<Vec<TokenRun>>>,
    pub having: Option<Clause<Predicate>>,
    pub order_by: Option<Clause<Vec<OrderByItem>>>,
    pub limit: Option<Clause<TokenRun>>,
    pub offset: Option<Clause<TokenRun>>,
    /// Later operands of a UNION/INTERSECT/EXCEPT chain, in source order.
    /// Only the first operand of a chain has entries here.
    pub set_operations: Vec<SetOperation>,
}

/// WITH clause (CTEs)
#[derive(Debug, Clone, PartialEq)]
pub struct WithClause {
    /// `WITH` plus `RECURSIVE` when present
    pub keyword: Vec<Token>,
    pub ctes: Vec<CommonTableExpression>,
}

/// A single CTE definition
#[derive(Debug, Clone, PartialEq)]
pub struct CommonTableExpression {
    pub name: Token,
    /// Parenthesised column list, parentheses included
    pub columns: Option<TokenRun>,
    pub as_keyword: Token,
    /// Modifiers between `AS` and the body, such as `MATERIALIZED`
    pub modifiers: TokenRun,
    pub open: Token,
    pub body: QueryBody,
    pub close: Token,
}

/// Body of a CTE or subquery
#[derive(Debug, Clone, PartialEq)]
pub enum QueryBody {
    Select(Box<SelectStatement>),
    Opaque(TokenRun),
}

/// A column in the SELECT list
#[derive(Debug, Clone, PartialEq)]
pub struct SelectColumn {
    pub expr: TokenRun,
    pub as_keyword: Option<Token>,
    pub alias: Option<Token>,
}

/// One entry of a FROM clause
#[derive(Debug, Clone, PartialEq)]
pub struct FromItem {
    pub joiner: Joiner,
    pub source: TableSource,
    pub constraint: Option<JoinConstraint>,
}

/// How a FROM entry is attached to the previous one
#[derive(Debug, Clone, PartialEq)]
pub enum Joiner {
    /// First entry of the clause
    Start,
    /// `FROM a, b`
    Comma,
    /// The renderer prints `keyword` as written; `kind` is the parsed join
    /// type for library callers
    Join { kind: JoinKind, keyword: Vec<Token> },
}

/// JOIN types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
    Natural,
}

/// A table, subquery or other source in FROM
#[derive(Debug, Clone, PartialEq)]
pub enum TableSource {
    Run(TokenRun),
    Subquery {
        open: Token,
        query: Box<SelectStatement>,
        close: Token,
        /// Alias and anything else after the closing parenthesis
        tail: TokenRun,
    },
}

/// `ON` predicate or `USING (...)` list of a join
#[derive(Debug, Clone, PartialEq)]
pub enum JoinConstraint {
    On(Clause<Predicate>),
    Using(Clause<TokenRun>),
}

/// A condition split at its top-level AND/OR boundaries
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub first: TokenRun,
    /// Each later condition with the `AND`/`OR` token that introduced it
    pub rest: Vec<(Token, TokenRun)>,
}

/// ORDER BY item
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub expr: TokenRun,
    pub direction: Option<Token>,
    /// `NULLS FIRST` / `NULLS LAST`
    pub nulls: Vec<Token>,
}

/// Sort directions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl OrderByItem {
    /// Parsed direction for library callers; rendering uses `direction`
    pub fn sort_direction(&self) -> Option<SortDirection> {
        self.direction.as_ref().map(|t| {
            if t.is_keyword("DESC") {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            }
        })
    }
}

/// UNION / INTERSECT / EXCEPT with its right-hand side
#[derive(Debug, Clone, PartialEq)]
pub struct SetOperation {
    pub keyword: Vec<Token>,
    pub right: SelectStatement,
}

/// INSERT statement
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    /// `INSERT [OR ...] INTO target`
    pub head: TokenRun,
    pub target: TokenRun,
    pub columns: Option<ParenList>,
    pub source: InsertSource,
    /// `ON CONFLICT ...`, `RETURNING ...`
    pub tail: TokenRun,
}

/// A parenthesised comma list
#[derive(Debug, Clone, PartialEq)]
pub struct ParenList {
    pub open: Token,
    pub items: Vec<TokenRun>,
    pub close: Token,
}

/// Where inserted rows come from
#[derive(Debug, Clone, PartialEq)]
pub enum InsertSource {
    Values(Clause<Vec<ParenList>>),
    Select(Box<SelectStatement>),
    /// `DEFAULT VALUES` and other forms kept as written
    Opaque(TokenRun),
}

/// UPDATE statement
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    /// `UPDATE [OR ...] target [alias]`
    pub head: TokenRun,
    pub set: Clause<Vec<Assignment>>,
    pub from: Option<Clause<Vec<FromItem>>>,
    pub where_clause: Option<Clause<Predicate>>,
    pub returning: Option<Clause<TokenRun>>,
}

/// `column = expression`
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: TokenRun,
    pub eq: Token,
    pub value: TokenRun,
}

/// DELETE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    /// `DELETE FROM target [alias]`
    pub head: TokenRun,
    pub using: Option<Clause<TokenRun>>,
    pub where_clause: Option<Clause<Predicate>>,
    pub returning: Option<Clause<TokenRun>>,
}

/// CREATE TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    /// `CREATE [TEMP] TABLE [IF NOT EXISTS] name`
    pub head: TokenRun,
    pub name: TokenRun,
    pub if_not_exists: bool,
    pub open: Token,
    pub elements: Vec<TableElement>,
    pub close: Token,
    /// Table options after the closing parenthesis
    pub tail: TokenRun,
}

/// A column definition or a table constraint
#[derive(Debug, Clone, PartialEq)]
pub enum TableElement {
    Column(ColumnDefinition),
    Constraint(TokenRun),
}

/// Column definition
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: Token,
    pub data_type: TokenRun,
    pub constraints: TokenRun,
}

/// CREATE INDEX statement
#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndexStatement {
    /// `CREATE [UNIQUE] INDEX [IF NOT EXISTS] name`
    pub head: TokenRun,
    pub name: TokenRun,
    pub unique: bool,
    pub if_not_exists: bool,
    pub on: Token,
    pub table: TokenRun,
    pub open: Token,
    pub columns: Vec<IndexColumn>,
    pub close: Token,
    pub where_clause: Option<Clause<Predicate>>,
}

/// Indexed expression with optional direction
#[derive(Debug, Clone, PartialEq)]
pub struct IndexColumn {
    pub expr: TokenRun,
    pub direction: Option<Token>,
}

/// CREATE VIEW statement
#[derive(Debug, Clone, PartialEq)]
pub struct CreateViewStatement {
    /// `CREATE [OR REPLACE] [TEMP] VIEW [IF NOT EXISTS] name [(columns)]`
    pub head: TokenRun,
    pub as_keyword: Token,
    pub query: Box<SelectStatement>,
}

/// ALTER TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct AlterTableStatement {
    /// `ALTER TABLE [IF EXISTS] [ONLY] name`
    pub head: TokenRun,
    pub actions: Vec<TokenRun>,
}

/// A statement kept exactly as written
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueStatement {
    pub tokens: TokenRun,
    /// Comments from empty statements before this one, written on their own
    /// lines ahead of `text`
    pub carried_comments: Vec<Token>,
    /// Source text from the first leading comment to the last token
    pub text: String,
}
