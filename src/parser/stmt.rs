//! Statement parsing
//!
//! Builds the shallow tree for SELECT, INSERT, UPDATE, DELETE, CREATE TABLE,
//! CREATE INDEX, CREATE VIEW and ALTER TABLE. Anything that does not fit one of
//! these shapes is reported as a [`Mismatch`] so the caller can keep the
//! statement as written.

use crate::ast::*;
use crate::parser::cursor::{matching_close, Mismatch, Parser, Shape};
use crate::parser::expr::{ends_operand, split_predicate, split_top_level_commas};
use crate::parser::lexer::{Token, TokenKind};

/// Nested SELECT bodies deeper than this stay opaque
pub const MAX_NESTING_DEPTH: usize = 32;

/// Parse one statement's tokens.
///
/// `Ok(None)` means the statement kind is not restructured at all (DROP,
/// PRAGMA, ...). `Err` means it looked like a known kind but did not match
/// its shape.
pub fn parse_statement(tokens: &[Token]) -> Shape<Option<Statement>> {
    let Some(first) = tokens.first() else {
        return Ok(None);
    };
    if first.kind != TokenKind::Keyword {
        return Ok(None);
    }

    let mut parser = Parser::new(tokens);
    let parser = &mut parser;

    let statement = match first.text.to_ascii_uppercase().as_str() {
        "SELECT" | "WITH" => Statement::Select(parse_select_statement(parser, 0)?),
        "INSERT" => Statement::Insert(parse_insert_statement(parser)?),
        "UPDATE" => Statement::Update(parse_update_statement(parser)?),
        "DELETE" => Statement::Delete(parse_delete_statement(parser)?),
        "CREATE" => match create_target(tokens) {
            Some(CreateTarget::Table) => Statement::CreateTable(parse_create_table_statement(parser)?),
            Some(CreateTarget::Index) => Statement::CreateIndex(parse_create_index_statement(parser)?),
            Some(CreateTarget::View) => Statement::CreateView(parse_create_view_statement(parser)?),
            None => return Ok(None),
        },
        "ALTER" if tokens.get(1).is_some_and(|t| t.is_keyword("TABLE")) => {
            Statement::AlterTable(parse_alter_table_statement(parser)?)
        }
        _ => return Ok(None),
    };

    parser.expect_eof()?;
    Ok(Some(statement))
}

enum CreateTarget {
    Table,
    Index,
    View,
}

/// Look past `CREATE [OR REPLACE] [TEMP] [UNIQUE] ...` for the object kind
fn create_target(tokens: &[Token]) -> Option<CreateTarget> {
    const MODIFIERS: &[&str] = &["OR", "REPLACE", "TEMP", "TEMPORARY", "UNIQUE"];
    const WORD_MODIFIERS: &[&str] = &["UNLOGGED", "MATERIALIZED"];

    for token in tokens.iter().skip(1) {
        if token.is_keyword("TABLE") {
            return Some(CreateTarget::Table);
        } else if token.is_keyword("INDEX") {
            return Some(CreateTarget::Index);
        } else if token.is_keyword("VIEW") {
            return Some(CreateTarget::View);
        } else if token.is_any_keyword(MODIFIERS)
            || (token.kind == TokenKind::Identifier
                && WORD_MODIFIERS.iter().any(|w| token.text.eq_ignore_ascii_case(w)))
        {
            continue;
        }
        return None;
    }
    None
}

// =============================================================================
// SELECT
// =============================================================================

/// Clauses of a SELECT in their required order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectClause {
    From,
    Where,
    GroupBy,
    Having,
    OrderBy,
    Limit,
    Offset,
    SetOperation,
}

impl SelectClause {
    fn rank(self) -> u8 {
        match self {
            SelectClause::From => 1,
            SelectClause::Where => 2,
            SelectClause::GroupBy => 3,
            SelectClause::Having => 4,
            SelectClause::OrderBy => 5,
            // Either order is accepted
            SelectClause::Limit | SelectClause::Offset => 6,
            SelectClause::SetOperation => 7,
        }
    }
}

/// Which SELECT clause starts at the cursor, if any
fn select_clause_at(p: &Parser) -> Option<SelectClause> {
    let token = p.current()?;
    if token.kind != TokenKind::Keyword {
        return None;
    }
    match token.text.to_ascii_uppercase().as_str() {
        // `IS DISTINCT FROM` is an operator
        "FROM" if !p.previous().is_some_and(|t| t.is_keyword("DISTINCT")) => Some(SelectClause::From),
        "WHERE" => Some(SelectClause::Where),
        "GROUP" if p.check_seq(&["GROUP", "BY"]) => Some(SelectClause::GroupBy),
        "HAVING" => Some(SelectClause::Having),
        "ORDER" if p.check_seq(&["ORDER", "BY"]) => Some(SelectClause::OrderBy),
        "LIMIT" => Some(SelectClause::Limit),
        "OFFSET" => Some(SelectClause::Offset),
        "UNION" | "INTERSECT" | "EXCEPT" => Some(SelectClause::SetOperation),
        _ => None,
    }
}

fn at_select_boundary(p: &Parser) -> bool {
    select_clause_at(p).is_some()
}

/// Parse SELECT statement (may include WITH clause)
///
/// Set operation chains are collected in a loop, so a long chain of UNIONs
/// does not nest.
pub fn parse_select_statement(p: &mut Parser, depth: usize) -> Shape<SelectStatement> {
    let mut statement = parse_select_operand(p, depth)?;

    while select_clause_at(p) == Some(SelectClause::SetOperation) {
        let mut keyword = Vec::new();
        if let Some(op) = p.advance() {
            keyword.push(op.clone());
        }
        if let Some(quantifier) = p.consume("ALL").or_else(|| p.consume("DISTINCT")) {
            keyword.push(quantifier);
        }
        let right = parse_select_operand(p, depth)?;
        statement.set_operations.push(SetOperation { keyword, right });
    }

    Ok(statement)
}

/// One operand of a set operation chain
fn parse_select_operand(p: &mut Parser, depth: usize) -> Shape<SelectStatement> {
    let with_clause = if p.check("WITH") {
        Some(parse_with_clause(p, depth)?)
    } else {
        None
    };

    let mut select = vec![p.expect("SELECT")?];
    if let Some(quantifier) = p.consume("DISTINCT").or_else(|| p.consume("ALL")) {
        select.push(quantifier);
    }

    let columns_run = p.take_until(at_select_boundary);
    let columns = non_empty_items(p, &columns_run.tokens, "empty select list")?
        .into_iter()
        .map(parse_select_column)
        .collect();

    let mut statement = SelectStatement {
        with_clause,
        select,
        columns,
        from: None,
        where_clause: None,
        group_by: None,
        having: None,
        order_by: None,
        limit: None,
        offset: None,
        set_operations: Vec::new(),
    };

    let mut rank = 0u8;
    while !p.is_eof() {
        let Some(clause) = select_clause_at(p) else {
            return Err(p.mismatch("unexpected token in SELECT"));
        };
        let duplicate = match clause {
            SelectClause::From => statement.from.is_some(),
            SelectClause::Where => statement.where_clause.is_some(),
            SelectClause::GroupBy => statement.group_by.is_some(),
            SelectClause::Having => statement.having.is_some(),
            SelectClause::OrderBy => statement.order_by.is_some(),
            SelectClause::Limit => statement.limit.is_some(),
            SelectClause::Offset => statement.offset.is_some(),
            SelectClause::SetOperation => false,
        };
        if clause.rank() < rank || duplicate {
            return Err(p.mismatch("clause out of order"));
        }
        rank = clause.rank();

        match clause {
            SelectClause::From => {
                let keyword = vec![p.expect("FROM")?];
                let run = p.take_until(at_select_boundary);
                let items = parse_from_items(&run.tokens, depth)?;
                statement.from = Some(Clause { keyword, body: items });
            }
            SelectClause::Where => {
                let keyword = vec![p.expect("WHERE")?];
                statement.where_clause = Some(Clause {
                    keyword,
                    body: parse_predicate(p, at_select_boundary)?,
                });
            }
            SelectClause::GroupBy => {
                let keyword = vec![p.expect("GROUP")?, p.expect("BY")?];
                let run = p.take_until(at_select_boundary);
                let items = non_empty_items(p, &run.tokens, "empty GROUP BY item")?;
                statement.group_by = Some(Clause { keyword, body: items });
            }
            SelectClause::Having => {
                let keyword = vec![p.expect("HAVING")?];
                statement.having = Some(Clause {
                    keyword,
                    body: parse_predicate(p, at_select_boundary)?,
                });
            }
            SelectClause::OrderBy => {
                let keyword = vec![p.expect("ORDER")?, p.expect("BY")?];
                let run = p.take_until(at_select_boundary);
                let items = non_empty_items(p, &run.tokens, "empty ORDER BY item")?
                    .into_iter()
                    .map(parse_order_by_item)
                    .collect();
                statement.order_by = Some(Clause { keyword, body: items });
            }
            SelectClause::Limit => {
                let keyword = vec![p.expect("LIMIT")?];
                statement.limit = Some(Clause {
                    keyword,
                    body: non_empty_run(p, at_select_boundary, "empty LIMIT")?,
                });
            }
            SelectClause::Offset => {
                let keyword = vec![p.expect("OFFSET")?];
                statement.offset = Some(Clause {
                    keyword,
                    body: non_empty_run(p, at_select_boundary, "empty OFFSET")?,
                });
            }
            // The caller collects the rest of the chain
            SelectClause::SetOperation => break,
        }
    }

    Ok(statement)
}

/// Parse WITH clause
fn parse_with_clause(p: &mut Parser, depth: usize) -> Shape<WithClause> {
    let mut keyword = vec![p.expect("WITH")?];
    if let Some(recursive) = p.consume("RECURSIVE") {
        keyword.push(recursive);
    }

    let mut ctes = vec![parse_cte(p, depth)?];
    while let Some(comma) = p.consume_punct(',') {
        let mut cte = parse_cte(p, depth)?;
        prepend_trivia(&mut cte.name, comma.leading_trivia);
        ctes.push(cte);
    }

    Ok(WithClause { keyword, ctes })
}

/// Parse a single CTE
fn parse_cte(p: &mut Parser, depth: usize) -> Shape<CommonTableExpression> {
    let name = expect_name(p)?;

    let columns = if p.check_punct('(') {
        let (open, inner, close) = p.take_group()?;
        let mut tokens = vec![open];
        tokens.extend_from_slice(inner);
        tokens.push(close);
        Some(TokenRun::new(tokens))
    } else {
        None
    };

    let as_keyword = p.expect("AS")?;
    let modifiers = p.take_until(|p| p.check_punct('('));
    let (open, inner, close) = p.take_group()?;

    Ok(CommonTableExpression {
        name,
        columns,
        as_keyword,
        modifiers,
        open,
        body: parse_query_body(inner, depth + 1),
        close,
    })
}

/// Parse a parenthesised body as a nested SELECT when possible
fn parse_query_body(inner: &[Token], depth: usize) -> QueryBody {
    match parse_nested_select(inner, depth) {
        Some(select) => QueryBody::Select(Box::new(select)),
        None => QueryBody::Opaque(TokenRun::new(inner.to_vec())),
    }
}

fn parse_nested_select(inner: &[Token], depth: usize) -> Option<SelectStatement> {
    if depth > MAX_NESTING_DEPTH {
        return None;
    }
    let first = inner.first()?;
    if !first.is_any_keyword(&["SELECT", "WITH"]) {
        return None;
    }
    let mut parser = Parser::new(inner);
    let select = parse_select_statement(&mut parser, depth).ok()?;
    parser.expect_eof().ok()?;
    Some(select)
}

/// Parse a single select column
fn parse_select_column(run: TokenRun) -> SelectColumn {
    let mut tokens = run.tokens;
    let n = tokens.len();

    if n >= 3 && tokens[n - 2].is_keyword("AS") {
        let alias = tokens.pop();
        let as_keyword = tokens.pop();
        return SelectColumn {
            expr: TokenRun::new(tokens),
            as_keyword,
            alias,
        };
    }

    let implicit_alias = n >= 2
        && matches!(tokens[n - 1].kind, TokenKind::Identifier | TokenKind::QuotedIdentifier)
        && !tokens[n - 1].is_parameter()
        && ends_operand(&tokens[n - 2]);
    let alias = if implicit_alias { tokens.pop() } else { None };

    SelectColumn {
        expr: TokenRun::new(tokens),
        as_keyword: None,
        alias,
    }
}

/// Parse ORDER BY item: expression, direction, nulls position
fn parse_order_by_item(run: TokenRun) -> OrderByItem {
    let mut tokens = run.tokens;
    let n = tokens.len();

    let mut nulls = Vec::new();
    if n >= 3 && tokens[n - 2].is_keyword("NULLS") && tokens[n - 1].is_any_keyword(&["FIRST", "LAST"]) {
        nulls = tokens.split_off(n - 2);
    }

    let direction = take_direction(&mut tokens);

    OrderByItem {
        expr: TokenRun::new(tokens),
        direction,
        nulls,
    }
}

// =============================================================================
// FROM
// =============================================================================

/// Number of tokens of a join keyword starting at the cursor
fn join_keyword_len(p: &Parser) -> Option<usize> {
    const PREFIXES: &[&str] = &["NATURAL", "LEFT", "RIGHT", "FULL", "INNER", "CROSS", "OUTER"];
    let mut i = 0;
    while p.peek_at(i).is_some_and(|t| t.is_any_keyword(PREFIXES)) {
        i += 1;
    }
    p.peek_at(i).is_some_and(|t| t.is_keyword("JOIN")).then_some(i + 1)
}

fn join_kind(keyword: &[Token]) -> JoinKind {
    let has = |word: &str| keyword.iter().any(|t| t.is_keyword(word));
    if has("NATURAL") {
        JoinKind::Natural
    } else if has("LEFT") {
        JoinKind::Left
    } else if has("RIGHT") {
        JoinKind::Right
    } else if has("FULL") {
        JoinKind::Full
    } else if has("CROSS") {
        JoinKind::Cross
    } else {
        JoinKind::Inner
    }
}

fn at_join_or_comma(p: &Parser) -> bool {
    p.check_punct(',') || join_keyword_len(p).is_some()
}

fn at_from_boundary(p: &Parser) -> bool {
    at_join_or_comma(p) || p.check("ON") || p.check("USING")
}

/// Parse the entries of a FROM clause: sources, joins and their constraints
pub fn parse_from_items(tokens: &[Token], depth: usize) -> Shape<Vec<FromItem>> {
    let mut p = Parser::new(tokens);
    let p = &mut p;

    let mut items = Vec::new();
    let mut joiner = Joiner::Start;
    let mut carried: Vec<Token> = Vec::new();

    loop {
        let mut source_run = p.take_until(at_from_boundary);
        if source_run.is_empty() {
            return Err(p.mismatch("missing table in FROM"));
        }
        if let Some(first) = source_run.tokens.first_mut() {
            prepend_trivia(first, std::mem::take(&mut carried));
        }
        let source = parse_table_source(source_run, depth);

        let constraint = if let Some(on) = p.consume("ON") {
            Some(JoinConstraint::On(Clause {
                keyword: vec![on],
                body: parse_predicate(p, at_join_or_comma)?,
            }))
        } else if let Some(using) = p.consume("USING") {
            Some(JoinConstraint::Using(Clause {
                keyword: vec![using],
                body: non_empty_run(p, at_join_or_comma, "empty USING")?,
            }))
        } else {
            None
        };

        items.push(FromItem {
            joiner,
            source,
            constraint,
        });

        if p.is_eof() {
            break;
        }
        if let Some(comma) = p.consume_punct(',') {
            carried = comma.leading_trivia;
            joiner = Joiner::Comma;
        } else if let Some(len) = join_keyword_len(p) {
            let keyword: Vec<Token> = (0..len).filter_map(|_| p.advance().cloned()).collect();
            joiner = Joiner::Join {
                kind: join_kind(&keyword),
                keyword,
            };
        } else {
            return Err(p.mismatch("unexpected token in FROM"));
        }
    }

    Ok(items)
}

/// A parenthesised SELECT becomes a nested statement; everything else is a run
fn parse_table_source(run: TokenRun, depth: usize) -> TableSource {
    let tokens = &run.tokens;
    let is_subquery = tokens.first().is_some_and(|t| t.is_punct('('))
        && tokens.get(1).is_some_and(|t| t.is_any_keyword(&["SELECT", "WITH"]));
    if !is_subquery {
        return TableSource::Run(run);
    }

    let Some(close) = matching_close(tokens, 0) else {
        return TableSource::Run(run);
    };
    match parse_nested_select(&tokens[1..close], depth + 1) {
        Some(query) => TableSource::Subquery {
            open: tokens[0].clone(),
            query: Box::new(query),
            close: tokens[close].clone(),
            tail: TokenRun::new(tokens[close + 1..].to_vec()),
        },
        None => TableSource::Run(run),
    }
}

// =============================================================================
// INSERT / UPDATE / DELETE
// =============================================================================

/// Parse INSERT statement
fn parse_insert_statement(p: &mut Parser) -> Shape<InsertStatement> {
    let head_start = p.position();
    p.expect("INSERT")?;
    // `INSERT OR REPLACE INTO`, `INSERT IGNORE INTO`
    p.take_until(|p| p.check("INTO"));
    p.expect("INTO")?;
    let target_start = p.position();
    parse_qualified_name(p)?;
    let target = p.slice_from(target_start);
    if p.check("AS") {
        p.advance();
        expect_name(p)?;
    }
    let head = p.slice_from(head_start);

    let columns = if p.check_punct('(')
        && !p.peek_at(1).is_some_and(|t| t.is_any_keyword(&["SELECT", "WITH"]))
    {
        Some(parse_paren_list(p, "empty column name")?)
    } else {
        None
    };

    let source = if let Some(values) = p.consume("VALUES") {
        let mut rows = vec![parse_paren_list(p, "empty value")?];
        while p.check_punct(',') && p.peek_at(1).is_some_and(|t| t.is_punct('(')) {
            let comma = p.advance().cloned();
            let mut row = parse_paren_list(p, "empty value")?;
            if let Some(comma) = comma {
                prepend_trivia(&mut row.open, comma.leading_trivia);
            }
            rows.push(row);
        }
        InsertSource::Values(Clause {
            keyword: vec![values],
            body: rows,
        })
    } else if p.check("SELECT") || p.check("WITH") {
        InsertSource::Select(Box::new(parse_select_statement(p, 1)?))
    } else if p.check_seq(&["DEFAULT", "VALUES"]) {
        let start = p.position();
        p.advance();
        p.advance();
        InsertSource::Opaque(p.slice_from(start))
    } else {
        return Err(p.mismatch("expected VALUES or SELECT"));
    };

    Ok(InsertStatement {
        head,
        target,
        columns,
        source,
        tail: p.take_rest(),
    })
}

/// Parse UPDATE statement
fn parse_update_statement(p: &mut Parser) -> Shape<UpdateStatement> {
    let head_start = p.position();
    p.expect("UPDATE")?;
    let target = p.take_until(|p| p.check("SET"));
    if target.is_empty() {
        return Err(p.mismatch("missing table in UPDATE"));
    }
    let head = p.slice_from(head_start);

    let set_keyword = p.expect("SET")?;
    let run = p.take_until(|p| p.check("FROM") || p.check("WHERE") || p.check("RETURNING"));
    let assignments = non_empty_items(p, &run.tokens, "empty assignment")?
        .into_iter()
        .map(|item| parse_assignment(p, item))
        .collect::<Shape<Vec<_>>>()?;

    let from = match p.consume("FROM") {
        Some(keyword) => {
            let run = p.take_until(|p| p.check("WHERE") || p.check("RETURNING"));
            Some(Clause {
                keyword: vec![keyword],
                body: parse_from_items(&run.tokens, 1)?,
            })
        }
        None => None,
    };

    let where_clause = parse_optional_where(p, |p| p.check("RETURNING"))?;
    let returning = parse_optional_returning(p)?;

    Ok(UpdateStatement {
        head,
        set: Clause {
            keyword: vec![set_keyword],
            body: assignments,
        },
        from,
        where_clause,
        returning,
    })
}

fn parse_assignment(p: &Parser, item: TokenRun) -> Shape<Assignment> {
    let mut depth = 0usize;
    let eq_at = item.iter().position(|t| {
        if t.is_punct('(') {
            depth += 1;
        } else if t.is_punct(')') {
            depth = depth.saturating_sub(1);
        }
        depth == 0 && t.is_operator("=")
    });

    match eq_at {
        Some(i) if i > 0 && i + 1 < item.len() => {
            let mut tokens = item.tokens;
            let value = tokens.split_off(i + 1);
            let eq = tokens.pop().ok_or_else(|| p.mismatch("malformed assignment"))?;
            Ok(Assignment {
                column: TokenRun::new(tokens),
                eq,
                value: TokenRun::new(value),
            })
        }
        _ => Err(Mismatch {
            offset: item.first().map_or(0, |t| t.start),
            reason: "malformed assignment".to_string(),
        }),
    }
}

/// Parse DELETE statement
fn parse_delete_statement(p: &mut Parser) -> Shape<DeleteStatement> {
    let head_start = p.position();
    p.expect("DELETE")?;
    let target = p.take_until(|p| p.check("USING") || p.check("WHERE") || p.check("RETURNING"));
    if target.is_empty() {
        return Err(p.mismatch("missing table in DELETE"));
    }
    let head = p.slice_from(head_start);

    let using = match p.consume("USING") {
        Some(keyword) => Some(Clause {
            keyword: vec![keyword],
            body: non_empty_run(p, |p| p.check("WHERE") || p.check("RETURNING"), "empty USING")?,
        }),
        None => None,
    };

    let where_clause = parse_optional_where(p, |p| p.check("RETURNING"))?;
    let returning = parse_optional_returning(p)?;

    Ok(DeleteStatement {
        head,
        using,
        where_clause,
        returning,
    })
}

fn parse_optional_where(p: &mut Parser, stop: impl Fn(&Parser) -> bool) -> Shape<Option<Clause<Predicate>>> {
    match p.consume("WHERE") {
        Some(keyword) => Ok(Some(Clause {
            keyword: vec![keyword],
            body: parse_predicate(p, stop)?,
        })),
        None => Ok(None),
    }
}

fn parse_optional_returning(p: &mut Parser) -> Shape<Option<Clause<TokenRun>>> {
    match p.consume("RETURNING") {
        Some(keyword) => Ok(Some(Clause {
            keyword: vec![keyword],
            body: non_empty_run(p, |_| false, "empty RETURNING")?,
        })),
        None => Ok(None),
    }
}

// =============================================================================
// DDL
// =============================================================================

/// Parse CREATE TABLE statement
fn parse_create_table_statement(p: &mut Parser) -> Shape<CreateTableStatement> {
    let head_start = p.position();
    p.expect("CREATE")?;
    p.take_until(|p| p.check("TABLE"));
    p.expect("TABLE")?;
    let if_not_exists = consume_if_not_exists(p);
    let name_start = p.position();
    parse_qualified_name(p)?;
    let name = p.slice_from(name_start);
    let head = p.slice_from(head_start);

    if !p.check_punct('(') {
        return Err(p.mismatch("expected column definitions"));
    }
    let (open, inner, close) = p.take_group()?;
    let elements = non_empty_items(p, inner, "empty column definition")?
        .into_iter()
        .map(parse_table_element)
        .collect();

    Ok(CreateTableStatement {
        head,
        name,
        if_not_exists,
        open,
        elements,
        close,
        tail: p.take_rest(),
    })
}

/// Parse one column definition or table constraint
fn parse_table_element(run: TokenRun) -> TableElement {
    const TABLE_CONSTRAINTS: &[&str] = &["PRIMARY", "FOREIGN", "UNIQUE", "CHECK", "CONSTRAINT", "KEY", "INDEX"];
    const COLUMN_CONSTRAINTS: &[&str] = &[
        "NOT", "NULL", "PRIMARY", "DEFAULT", "UNIQUE", "CHECK", "REFERENCES", "CONSTRAINT", "COLLATE",
    ];
    const WORD_CONSTRAINTS: &[&str] = &["GENERATED", "AUTOINCREMENT", "AUTO_INCREMENT", "IDENTITY"];

    if run.first().is_some_and(|t| t.is_any_keyword(TABLE_CONSTRAINTS)) {
        return TableElement::Constraint(run);
    }

    let mut tokens = run.tokens.into_iter();
    let Some(name) = tokens.next() else {
        return TableElement::Constraint(TokenRun::default());
    };
    let rest: Vec<Token> = tokens.collect();

    let mut depth = 0usize;
    let split_at = rest
        .iter()
        .position(|t| {
            if t.is_punct('(') {
                depth += 1;
            } else if t.is_punct(')') {
                depth = depth.saturating_sub(1);
            }
            depth == 0
                && (t.is_any_keyword(COLUMN_CONSTRAINTS)
                    || (t.kind == TokenKind::Identifier
                        && WORD_CONSTRAINTS.iter().any(|w| t.text.eq_ignore_ascii_case(w))))
        })
        .unwrap_or(rest.len());

    let mut data_type = rest;
    let constraints = data_type.split_off(split_at);

    TableElement::Column(ColumnDefinition {
        name,
        data_type: TokenRun::new(data_type),
        constraints: TokenRun::new(constraints),
    })
}

/// Parse CREATE INDEX statement
fn parse_create_index_statement(p: &mut Parser) -> Shape<CreateIndexStatement> {
    let head_start = p.position();
    p.expect("CREATE")?;
    let unique = p.consume("UNIQUE").is_some();
    p.take_until(|p| p.check("INDEX"));
    p.expect("INDEX")?;
    // `CONCURRENTLY` and similar words
    p.take_until(|p| p.check("IF") || p.check("ON") || p.current().is_some_and(is_name_token));
    let if_not_exists = consume_if_not_exists(p);
    let name_start = p.position();
    if !p.check("ON") {
        parse_qualified_name(p)?;
    }
    let name = p.slice_from(name_start);
    let head = p.slice_from(head_start);

    let on = p.expect("ON")?;
    let table = p.take_until(|p| p.check_punct('('));
    if table.is_empty() {
        return Err(p.mismatch("missing table in CREATE INDEX"));
    }
    let (open, inner, close) = p.take_group()?;
    let columns = non_empty_items(p, inner, "empty index column")?
        .into_iter()
        .map(|run| {
            let mut tokens = run.tokens;
            let direction = take_direction(&mut tokens);
            IndexColumn {
                expr: TokenRun::new(tokens),
                direction,
            }
        })
        .collect();

    let where_clause = parse_optional_where(p, |_| false)?;

    Ok(CreateIndexStatement {
        head,
        name,
        unique,
        if_not_exists,
        on,
        table,
        open,
        columns,
        close,
        where_clause,
    })
}

/// Parse CREATE VIEW statement
fn parse_create_view_statement(p: &mut Parser) -> Shape<CreateViewStatement> {
    let head = p.take_until(|p| p.check("AS"));
    let as_keyword = p.expect("AS")?;
    if !(p.check("SELECT") || p.check("WITH")) {
        return Err(p.mismatch("expected SELECT after AS"));
    }
    let query = parse_select_statement(p, 1)?;
    Ok(CreateViewStatement {
        head,
        as_keyword,
        query: Box::new(query),
    })
}

/// Parse ALTER TABLE statement
fn parse_alter_table_statement(p: &mut Parser) -> Shape<AlterTableStatement> {
    let head_start = p.position();
    p.expect("ALTER")?;
    p.expect("TABLE")?;
    if p.check_seq(&["IF", "EXISTS"]) {
        p.advance();
        p.advance();
    }
    if p.current().is_some_and(|t| t.kind == TokenKind::Identifier && t.text.eq_ignore_ascii_case("ONLY")) {
        p.advance();
    }
    parse_qualified_name(p)?;
    let head = p.slice_from(head_start);

    let rest = p.take_rest();
    let actions = non_empty_items(p, &rest.tokens, "empty ALTER TABLE action")?;
    Ok(AlterTableStatement { head, actions })
}

// =============================================================================
// Helpers
// =============================================================================

fn is_name_token(token: &Token) -> bool {
    matches!(token.kind, TokenKind::Identifier | TokenKind::QuotedIdentifier)
}

fn expect_name(p: &mut Parser) -> Shape<Token> {
    match p.current() {
        Some(t) if is_name_token(t) => {
            p.advance();
            Ok(t.clone())
        }
        _ => Err(p.mismatch("expected a name")),
    }
}

/// Parse qualified name (schema.table)
fn parse_qualified_name(p: &mut Parser) -> Shape<()> {
    expect_name(p)?;
    while p.check_punct('.') && p.peek_at(1).is_some_and(is_name_token) {
        p.advance();
        p.advance();
    }
    Ok(())
}

fn consume_if_not_exists(p: &mut Parser) -> bool {
    if p.check_seq(&["IF", "NOT", "EXISTS"]) {
        p.advance();
        p.advance();
        p.advance();
        true
    } else {
        false
    }
}

fn parse_predicate(p: &mut Parser, stop: impl Fn(&Parser) -> bool) -> Shape<Predicate> {
    let at = p.mismatch("empty condition");
    let run = p.take_until(stop);
    split_predicate(&run.tokens).ok_or(at)
}

fn non_empty_run(p: &mut Parser, stop: impl Fn(&Parser) -> bool, reason: &str) -> Shape<TokenRun> {
    let at = p.mismatch(reason);
    let run = p.take_until(stop);
    if run.is_empty() {
        Err(at)
    } else {
        Ok(run)
    }
}

/// Split at top-level commas, rejecting empty or missing items
fn non_empty_items(p: &Parser, tokens: &[Token], reason: &str) -> Shape<Vec<TokenRun>> {
    let items = split_top_level_commas(tokens);
    if items.is_empty() || items.iter().any(TokenRun::is_empty) {
        let offset = tokens.first().map_or_else(|| p.mismatch(reason).offset, |t| t.start);
        return Err(Mismatch {
            offset,
            reason: reason.to_string(),
        });
    }
    Ok(items)
}

fn parse_paren_list(p: &mut Parser, reason: &str) -> Shape<ParenList> {
    let (open, inner, close) = p.take_group()?;
    let items = if inner.is_empty() {
        Vec::new()
    } else {
        non_empty_items(p, inner, reason)?
    };
    Ok(ParenList { open, items, close })
}

/// Pop a trailing `ASC`/`DESC` that follows an expression
fn take_direction(tokens: &mut Vec<Token>) -> Option<Token> {
    let has_direction = tokens.len() >= 2 && tokens.last().is_some_and(|t| t.is_any_keyword(&["ASC", "DESC"]));
    if has_direction {
        tokens.pop()
    } else {
        None
    }
}

fn prepend_trivia(token: &mut Token, mut trivia: Vec<Token>) {
    if trivia.is_empty() {
        return;
    }
    trivia.append(&mut token.leading_trivia);
    token.leading_trivia = trivia;
}
