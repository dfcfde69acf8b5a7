//! SQL formatting / pretty-printing logic
//!
//! Renders parsed statements in the river style: clause keywords end at the
//! alignment column, list items start one column after it, and leading commas
//! sit two columns left of the items.

pub mod printer;
pub mod rules;
mod utils;

use crate::ast::*;
use crate::parser::lexer::Token;
use printer::{Printer, INDENT_SIZE};
use rules::{ClauseKind, CommaPosition, StylePolicy, StyleRule};
use utils::{apply_case, needs_space, WordRole};

/// Render one statement, terminator included, starting at column 0
pub fn render_statement(stmt: &SourceStatement, policy: &StylePolicy) -> String {
    let mut formatter = Formatter::new(policy, stmt.statement.kind());
    formatter.format_statement(&stmt.statement);
    if let Some(semicolon) = &stmt.semicolon {
        let rule = formatter.base_rule();
        formatter.emit(semicolon, &rule);
    }
    formatter.finish()
}

/// Join rendered statements with blank lines and append the file's trailing
/// comments, one per line. Non-empty output ends with a single newline.
pub fn assemble(statements: &[String], trailing_trivia: &[Token]) -> String {
    let mut output = statements.join("\n\n");
    for comment in trailing_trivia.iter().filter(|t| t.kind.is_comment()) {
        if !output.is_empty() {
            output.push('\n');
        }
        output.push_str(comment.text.trim_end());
    }
    if !output.is_empty() {
        output.push('\n');
    }
    output
}

/// Things rendered as comma-separated list items
trait ListItem {
    fn first_token(&self) -> Option<&Token>;
}

impl ListItem for TokenRun {
    fn first_token(&self) -> Option<&Token> {
        self.first()
    }
}

impl ListItem for SelectColumn {
    fn first_token(&self) -> Option<&Token> {
        self.expr.first()
    }
}

impl ListItem for OrderByItem {
    fn first_token(&self) -> Option<&Token> {
        self.expr.first()
    }
}

impl ListItem for Assignment {
    fn first_token(&self) -> Option<&Token> {
        self.column.first()
    }
}

impl ListItem for ParenList {
    fn first_token(&self) -> Option<&Token> {
        Some(&self.open)
    }
}

impl ListItem for TableElement {
    fn first_token(&self) -> Option<&Token> {
        match self {
            TableElement::Column(column) => Some(&column.name),
            TableElement::Constraint(run) => run.first(),
        }
    }
}

impl ListItem for TableSource {
    fn first_token(&self) -> Option<&Token> {
        match self {
            TableSource::Run(run) => run.first(),
            TableSource::Subquery { open, .. } => Some(open),
        }
    }
}

/// Display width of a keyword sequence written with single spaces
fn words_width(words: &[Token]) -> usize {
    let letters: usize = words.iter().map(|t| t.text.chars().count()).sum();
    letters + words.len().saturating_sub(1)
}

/// AST Formatter
struct Formatter<'p> {
    printer: Printer,
    policy: &'p StylePolicy,
    kind: StatementKind,
    /// Start offset of a token whose comments were already written
    comments_written: Option<usize>,
}

impl<'p> Formatter<'p> {
    fn new(policy: &'p StylePolicy, kind: StatementKind) -> Self {
        Self {
            printer: Printer::new(),
            policy,
            kind,
            comments_written: None,
        }
    }

    fn finish(self) -> String {
        self.printer.finish().trim_end().to_string()
    }

    fn base_rule(&self) -> StyleRule {
        self.policy.for_kind(self.kind)
    }

    fn rule(&self, clause: ClauseKind) -> StyleRule {
        self.policy.for_clause(self.kind, clause)
    }

    // -------------------------------------------------------------------------
    // Tokens
    // -------------------------------------------------------------------------

    fn emit_as(&mut self, token: &Token, rule: &StyleRule, role: WordRole) {
        if self.comments_written == Some(token.start) {
            self.comments_written = None;
        } else {
            self.printer.comments(&token.leading_trivia);
        }
        self.printer.write(&apply_case(token, rule, role));
    }

    fn emit(&mut self, token: &Token, rule: &StyleRule) {
        self.emit_as(token, rule, WordRole::Natural);
    }

    /// Keyword sequences such as `GROUP BY` or `LEFT OUTER JOIN`
    fn emit_words(&mut self, words: &[Token], rule: &StyleRule) {
        for (i, word) in words.iter().enumerate() {
            if i > 0 {
                self.printer.space();
            }
            self.emit(word, rule);
        }
    }

    fn run_as(&mut self, tokens: &[Token], rule: &StyleRule, role: WordRole) {
        for (i, token) in tokens.iter().enumerate() {
            if i > 0 {
                let before_prev = i.checked_sub(2).map(|j| &tokens[j]);
                if needs_space(before_prev, &tokens[i - 1], token) {
                    self.printer.space();
                }
            }
            self.emit_as(token, rule, role);
        }
    }

    fn run(&mut self, run: &TokenRun, rule: &StyleRule) {
        self.run_as(&run.tokens, rule, WordRole::Natural);
    }

    // -------------------------------------------------------------------------
    // Layout primitives
    // -------------------------------------------------------------------------

    /// Write a clause keyword so that it ends at the alignment column, or at
    /// `base` when it is wider. Returns the column where the clause content
    /// starts.
    fn clause_keyword(&mut self, keyword: &[Token], base: usize, rule: &StyleRule) -> usize {
        let start = base + rule.alignment_column.saturating_sub(words_width(keyword));
        self.printer.pad_to(start);
        self.emit_words(keyword, rule);
        self.printer.space();
        let content = self.printer.column();
        self.printer.set_hang(content);
        content
    }

    /// Write the separator before a list item
    fn separator(&mut self, first: Option<&Token>, content: usize, rule: &StyleRule) {
        match rule.comma_position {
            CommaPosition::Leading => {
                self.printer.newline_at(content.saturating_sub(2));
                // Comments move above the comma
                if let Some(first) = first {
                    self.printer.comments(&first.leading_trivia);
                    self.comments_written = Some(first.start);
                }
                self.printer.write(", ");
            }
            CommaPosition::Trailing => {
                self.printer.write(",");
                self.printer.newline_at(content);
            }
        }
    }

    /// Comma-separated list, one item per line, with items starting at `content`
    fn list<T: ListItem>(
        &mut self,
        items: &[T],
        content: usize,
        rule: &StyleRule,
        mut item: impl FnMut(&mut Self, &T),
    ) {
        for (i, it) in items.iter().enumerate() {
            if i > 0 {
                self.separator(it.first_token(), content, rule);
            }
            self.printer.set_hang(content);
            item(self, it);
        }
    }

    fn format_predicate(&mut self, predicate: &Predicate, base: usize, content: usize, rule: &StyleRule) {
        self.run(&predicate.first, rule);
        for (connective, condition) in &predicate.rest {
            let width = connective.text.chars().count();
            let column = content.saturating_sub(width + 1).max(base);
            self.printer.newline_at(column);
            self.emit(connective, rule);
            self.printer.space();
            self.printer.set_hang(content);
            self.run(condition, rule);
        }
    }

    /// `WHERE`/`HAVING` on a new line
    fn format_predicate_clause(&mut self, clause: &Clause<Predicate>, base: usize, kind: ClauseKind) {
        let rule = self.rule(kind);
        self.printer.newline_at(base);
        let content = self.clause_keyword(&clause.keyword, base, &rule);
        self.format_predicate(&clause.body, base, content, &rule);
    }

    /// `LIMIT`, `OFFSET`, `RETURNING`, `USING`: keyword and an opaque run
    fn format_run_clause(&mut self, clause: &Clause<TokenRun>, base: usize, kind: ClauseKind) {
        let rule = self.rule(kind);
        self.printer.newline_at(base);
        self.clause_keyword(&clause.keyword, base, &rule);
        self.run(&clause.body, &rule);
    }

    // -------------------------------------------------------------------------
    // Statements
    // -------------------------------------------------------------------------

    fn format_statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Select(s) => self.format_select(s, 0),
            Statement::Insert(s) => self.format_insert(s),
            Statement::Update(s) => self.format_update(s),
            Statement::Delete(s) => self.format_delete(s),
            Statement::CreateTable(s) => self.format_create_table(s),
            Statement::CreateIndex(s) => self.format_create_index(s),
            Statement::CreateView(s) => self.format_create_view(s),
            Statement::AlterTable(s) => self.format_alter_table(s),
            Statement::Other(s) => {
                self.printer.comments(&s.carried_comments);
                self.printer.write(&s.text);
            }
        }
    }

    /// Render a SELECT whose first keyword goes at the current position, with
    /// every later line relative to `base`.
    fn format_select(&mut self, stmt: &SelectStatement, base: usize) {
        if let Some(with) = &stmt.with_clause {
            self.format_with_clause(with, base);
            self.printer.newline_at(base);
        }

        let rule = self.rule(ClauseKind::SelectList);
        let content = self.clause_keyword(&stmt.select, base, &rule);
        self.list(&stmt.columns, content, &rule, |f, column| {
            f.format_select_column(column, &rule)
        });

        if let Some(from) = &stmt.from {
            self.format_from_clause(from, base);
        }

        if let Some(where_clause) = &stmt.where_clause {
            self.format_predicate_clause(where_clause, base, ClauseKind::Where);
        }

        if let Some(group_by) = &stmt.group_by {
            let rule = self.rule(ClauseKind::GroupBy);
            self.printer.newline_at(base);
            let content = self.clause_keyword(&group_by.keyword, base, &rule);
            self.list(&group_by.body, content, &rule, |f, item| f.run(item, &rule));
        }

        if let Some(having) = &stmt.having {
            self.format_predicate_clause(having, base, ClauseKind::Having);
        }

        if let Some(order_by) = &stmt.order_by {
            let rule = self.rule(ClauseKind::OrderBy);
            self.printer.newline_at(base);
            let content = self.clause_keyword(&order_by.keyword, base, &rule);
            self.list(&order_by.body, content, &rule, |f, item| {
                f.format_order_by_item(item, &rule)
            });
        }

        if let Some(limit) = &stmt.limit {
            self.format_run_clause(limit, base, ClauseKind::Limit);
        }

        if let Some(offset) = &stmt.offset {
            self.format_run_clause(offset, base, ClauseKind::Limit);
        }

        // UNION/INTERSECT/EXCEPT
        for set_op in &stmt.set_operations {
            let rule = self.rule(ClauseKind::SetOperation);
            self.printer.newline_at(base);
            self.clause_keyword(&set_op.keyword, base, &rule);
            self.printer.newline_at(base);
            self.format_select(&set_op.right, base);
        }
    }

    fn format_with_clause(&mut self, with: &WithClause, base: usize) {
        let rule = self.rule(ClauseKind::With);
        self.emit_words(&with.keyword, &rule);
        self.printer.space();

        for (i, cte) in with.ctes.iter().enumerate() {
            if i > 0 {
                match rule.comma_position {
                    CommaPosition::Leading => {
                        self.printer.newline_at(base);
                        self.printer.comments(&cte.name.leading_trivia);
                        self.comments_written = Some(cte.name.start);
                        self.printer.write(", ");
                    }
                    CommaPosition::Trailing => {
                        self.printer.write(",");
                        self.printer.newline_at(base);
                    }
                }
            }
            self.format_cte(cte, base, &rule);
        }
    }

    fn format_cte(&mut self, cte: &CommonTableExpression, base: usize, rule: &StyleRule) {
        self.emit(&cte.name, rule);
        if let Some(columns) = &cte.columns {
            self.printer.space();
            self.run(columns, rule);
        }
        self.printer.space();
        self.emit(&cte.as_keyword, rule);
        self.printer.space();
        if !cte.modifiers.is_empty() {
            self.run(&cte.modifiers, rule);
            self.printer.space();
        }
        self.emit(&cte.open, rule);

        let inner = base + INDENT_SIZE;
        self.printer.newline_at(inner);
        match &cte.body {
            QueryBody::Select(select) => self.format_select(select, inner),
            QueryBody::Opaque(run) => self.run(run, rule),
        }
        self.printer.newline_at(base);
        self.emit(&cte.close, rule);
    }

    fn format_select_column(&mut self, column: &SelectColumn, rule: &StyleRule) {
        self.run(&column.expr, rule);
        if let Some(as_keyword) = &column.as_keyword {
            self.printer.space();
            self.emit(as_keyword, rule);
        }
        if let Some(alias) = &column.alias {
            self.printer.space();
            self.emit(alias, rule);
        }
    }

    fn format_order_by_item(&mut self, item: &OrderByItem, rule: &StyleRule) {
        self.run(&item.expr, rule);
        if let Some(direction) = &item.direction {
            self.printer.space();
            self.emit(direction, rule);
        }
        for word in &item.nulls {
            self.printer.space();
            self.emit(word, rule);
        }
    }

    fn format_from_clause(&mut self, from: &Clause<Vec<FromItem>>, base: usize) {
        let rule = self.rule(ClauseKind::From);
        self.printer.newline_at(base);
        let content = self.clause_keyword(&from.keyword, base, &rule);
        self.format_from_items(&from.body, base, content, &rule);
    }

    fn format_from_items(&mut self, items: &[FromItem], base: usize, content: usize, rule: &StyleRule) {
        let join_rule = self.rule(ClauseKind::Join);

        for item in items {
            let source_rule = match &item.joiner {
                Joiner::Start => *rule,
                Joiner::Comma => {
                    self.separator(item.source.first_token(), content, rule);
                    self.printer.set_hang(content);
                    *rule
                }
                Joiner::Join { keyword, .. } => {
                    self.printer.newline_at(base);
                    self.clause_keyword(keyword, base, &join_rule);
                    join_rule
                }
            };
            self.format_table_source(&item.source, &source_rule);

            match &item.constraint {
                Some(JoinConstraint::On(on)) => {
                    self.printer.newline_at(base);
                    let on_content = self.clause_keyword(&on.keyword, base, &join_rule);
                    self.format_predicate(&on.body, base, on_content, &join_rule);
                }
                Some(JoinConstraint::Using(using)) => {
                    self.printer.space();
                    self.emit_words(&using.keyword, &join_rule);
                    self.printer.space();
                    self.run(&using.body, &join_rule);
                }
                None => {}
            }
        }
    }

    fn format_table_source(&mut self, source: &TableSource, rule: &StyleRule) {
        match source {
            TableSource::Run(run) => self.run(run, rule),
            TableSource::Subquery {
                open,
                query,
                close,
                tail,
            } => {
                self.emit(open, rule);
                let base = self.printer.column();
                self.format_select(query, base);
                self.emit(close, rule);
                if !tail.is_empty() {
                    self.printer.space();
                    self.run(tail, rule);
                }
            }
        }
    }

    fn format_insert(&mut self, stmt: &InsertStatement) {
        let base = 0;
        let rule = self.base_rule();
        self.run(&stmt.head, &rule);

        if let Some(columns) = &stmt.columns {
            let rule = self.rule(ClauseKind::InsertColumns);
            let content = base + rule.alignment_column + 1;
            let open_column = content.saturating_sub(2);
            self.printer.newline_at(open_column);
            self.emit(&columns.open, &rule);
            self.printer.pad_to(content);
            self.list(&columns.items, content, &rule, |f, item| f.run(item, &rule));
            self.printer.newline_at(open_column);
            self.emit(&columns.close, &rule);
        }

        match &stmt.source {
            InsertSource::Values(values) => {
                let rule = self.rule(ClauseKind::Values);
                self.printer.newline_at(base);
                let content = self.clause_keyword(&values.keyword, base, &rule);
                self.list(&values.body, content, &rule, |f, row| {
                    f.format_paren_list_inline(row, &rule)
                });
            }
            InsertSource::Select(select) => {
                self.printer.newline_at(base);
                self.format_select(select, base);
            }
            InsertSource::Opaque(run) => {
                self.printer.space();
                self.run(run, &rule);
            }
        }

        if !stmt.tail.is_empty() {
            self.printer.newline_at(base);
            self.run(&stmt.tail, &rule);
        }
    }

    fn format_paren_list_inline(&mut self, list: &ParenList, rule: &StyleRule) {
        self.emit(&list.open, rule);
        for (i, item) in list.items.iter().enumerate() {
            if i > 0 {
                self.printer.write(", ");
            }
            self.run(item, rule);
        }
        self.emit(&list.close, rule);
    }

    fn format_update(&mut self, stmt: &UpdateStatement) {
        let base = 0;
        let rule = self.base_rule();
        self.run(&stmt.head, &rule);

        let set_rule = self.rule(ClauseKind::Set);
        self.printer.newline_at(base);
        let content = self.clause_keyword(&stmt.set.keyword, base, &set_rule);
        self.list(&stmt.set.body, content, &set_rule, |f, assignment| {
            f.run(&assignment.column, &set_rule);
            f.printer.space();
            f.emit(&assignment.eq, &set_rule);
            f.printer.space();
            f.run(&assignment.value, &set_rule);
        });

        if let Some(from) = &stmt.from {
            self.format_from_clause(from, base);
        }
        if let Some(where_clause) = &stmt.where_clause {
            self.format_predicate_clause(where_clause, base, ClauseKind::Where);
        }
        if let Some(returning) = &stmt.returning {
            self.format_run_clause(returning, base, ClauseKind::Returning);
        }
    }

    fn format_delete(&mut self, stmt: &DeleteStatement) {
        let base = 0;
        let rule = self.base_rule();
        self.run(&stmt.head, &rule);

        if let Some(using) = &stmt.using {
            self.format_run_clause(using, base, ClauseKind::From);
        }
        if let Some(where_clause) = &stmt.where_clause {
            self.format_predicate_clause(where_clause, base, ClauseKind::Where);
        }
        if let Some(returning) = &stmt.returning {
            self.format_run_clause(returning, base, ClauseKind::Returning);
        }
    }

    fn format_create_table(&mut self, stmt: &CreateTableStatement) {
        let base = 0;
        let rule = self.base_rule();
        self.run(&stmt.head, &rule);
        self.printer.space();
        self.emit(&stmt.open, &rule);

        let rule = self.rule(ClauseKind::TableElements);
        let content = match rule.comma_position {
            CommaPosition::Leading => base + INDENT_SIZE + 2,
            CommaPosition::Trailing => base + INDENT_SIZE,
        };
        self.printer.newline_at(content);
        self.list(&stmt.elements, content, &rule, |f, element| match element {
            TableElement::Column(column) => f.format_column_definition(column, &rule),
            TableElement::Constraint(run) => f.run(run, &rule),
        });

        self.printer.newline_at(base);
        self.emit(&stmt.close, &rule);
        if !stmt.tail.is_empty() {
            self.printer.space();
            self.run(&stmt.tail, &rule);
        }
    }

    fn format_column_definition(&mut self, column: &ColumnDefinition, rule: &StyleRule) {
        self.emit(&column.name, rule);
        if !column.data_type.is_empty() {
            self.printer.space();
            self.run_as(&column.data_type.tokens, rule, WordRole::TypeName);
        }
        if !column.constraints.is_empty() {
            self.printer.space();
            self.run(&column.constraints, rule);
        }
    }

    fn format_create_index(&mut self, stmt: &CreateIndexStatement) {
        let base = 0;
        let rule = self.rule(ClauseKind::IndexColumns);
        self.run(&stmt.head, &rule);
        self.printer.space();
        self.emit(&stmt.on, &rule);
        self.printer.space();
        self.run(&stmt.table, &rule);
        self.printer.space();
        self.emit(&stmt.open, &rule);
        for (i, column) in stmt.columns.iter().enumerate() {
            if i > 0 {
                self.printer.write(", ");
            }
            self.run(&column.expr, &rule);
            if let Some(direction) = &column.direction {
                self.printer.space();
                self.emit(direction, &rule);
            }
        }
        self.emit(&stmt.close, &rule);

        if let Some(where_clause) = &stmt.where_clause {
            self.format_predicate_clause(where_clause, base, ClauseKind::Where);
        }
    }

    fn format_create_view(&mut self, stmt: &CreateViewStatement) {
        let base = 0;
        let rule = self.base_rule();
        self.run(&stmt.head, &rule);
        self.printer.space();
        self.emit(&stmt.as_keyword, &rule);
        self.printer.newline_at(base);
        self.format_select(&stmt.query, base);
    }

    fn format_alter_table(&mut self, stmt: &AlterTableStatement) {
        let base = 0;
        let rule = self.rule(ClauseKind::AlterActions);
        self.run(&stmt.head, &rule);

        if let [action] = stmt.actions.as_slice() {
            self.printer.space();
            self.run(action, &rule);
            return;
        }

        let content = match rule.comma_position {
            CommaPosition::Leading => base + INDENT_SIZE + 2,
            CommaPosition::Trailing => base + INDENT_SIZE,
        };
        self.printer.newline_at(content);
        self.list(&stmt.actions, content, &rule, |f, action| f.run(action, &rule));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    fn render(sql: &str) -> String {
        let parsed = parser::parse(sql).unwrap();
        let policy = StylePolicy::default();
        let statements: Vec<String> = parsed
            .statements
            .iter()
            .map(|s| render_statement(s, &policy))
            .collect();
        assemble(&statements, &parsed.trailing_trivia)
    }

    #[test]
    fn keyword_width_counts_separating_spaces() {
        let parsed = parser::parse("SELECT a FROM t ORDER BY a").unwrap();
        let Statement::Select(select) = &parsed.statements[0].statement else {
            panic!("expected SELECT");
        };
        let order_by = select.order_by.as_ref().unwrap();
        assert_eq!(words_width(&order_by.keyword), 8);
    }

    #[test]
    fn leading_comma_comment_moves_above_comma() {
        assert_eq!(
            render("SELECT a, -- second\nb FROM t"),
            "SELECT a\n     -- second\n     , b\n  FROM t\n"
        );
    }

    #[test]
    fn trailing_comments_end_the_file() {
        assert_eq!(render("SELECT 1; -- done"), "SELECT 1;\n-- done\n");
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert_eq!(render("  \n"), "");
    }
}
