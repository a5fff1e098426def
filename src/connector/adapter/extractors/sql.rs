use regex::Regex;
use std::sync::OnceLock;

use crate::application::ParseOutput;
use crate::domain::{
    node_entity_id, EdgeRecord, EdgeType, Node, NodeKind, QualifiedName, Span, SqlStatement, SqlStatementType,
};

fn string_literal_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""([^"\\]|\\.){10,}"|'([^'\\]|\\.){10,}'"#).expect("valid regex"))
}

fn sql_keyword_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*(select|insert|update|delete|merge|create\s+table|alter\s+table)\b").expect("valid regex")
    })
}

fn table_name_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(?:from|into|update|join|table)\s+([a-zA-Z_][a-zA-Z0-9_\.]*)").expect("valid regex"))
}

fn select_columns_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)^\s*select\s+(.*?)\s+from\s").expect("valid regex"))
}

fn native_query_flag_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)nativeQuery\s*=\s*true").expect("valid regex"))
}

/// Pulls the projected column list out of a `SELECT ... FROM` statement,
/// stripping table-alias qualifiers (`u.id` -> `id`) and `AS` aliases. `*`
/// and non-SELECT statements yield no columns — this is a heuristic split,
/// not a SQL parser, so it does not attempt to handle nested subqueries.
fn parse_select_columns(raw: &str, statement_type: SqlStatementType) -> Vec<String> {
    if statement_type != SqlStatementType::Select {
        return Vec::new();
    }
    let column_list = match select_columns_pattern().captures(raw) {
        Some(c) => c[1].to_string(),
        None => return Vec::new(),
    };
    if column_list.trim() == "*" {
        return Vec::new();
    }

    column_list
        .split(',')
        .filter_map(|expr| {
            let expr = expr.trim();
            if expr.is_empty() {
                return None;
            }
            let lower = expr.to_lowercase();
            let base = match lower.find(" as ") {
                Some(idx) => &expr[..idx],
                None => expr,
            };
            let column = base.trim().rsplit('.').next().unwrap_or(base).trim();
            if column.is_empty() || column == "*" {
                None
            } else {
                Some(column.to_string())
            }
        })
        .collect()
}

/// Detects `nativeQuery = true` near a matched SQL literal (e.g. a sibling
/// attribute inside the same `@Query(...)` annotation), within a bounded
/// window since the attribute may sit on an adjacent line.
fn is_native_query(content: &str, start: usize, end: usize) -> bool {
    let window_start = start.saturating_sub(200);
    let window_end = (end + 200).min(content.len());
    native_query_flag_pattern().is_match(&content[window_start..window_end])
}

/// Finds the tightest enclosing `Method` node (by nearest preceding start
/// line) already emitted for this file, used as the `EXECUTES_SQL` source.
fn enclosing_method<'a>(output: &'a ParseOutput, file_path: &str, line: u32) -> Option<&'a Node> {
    output
        .nodes
        .iter()
        .filter(|n| n.file_path == file_path && n.kind == NodeKind::Method && n.span.start_line <= line)
        .max_by_key(|n| n.span.start_line)
}

/// Scans string literals for SQL, per §4.6's SQL extractor. A literal
/// qualifies when its opening keyword is a recognized DML/DDL verb.
pub fn extract(content: &str, file_path: &str, repository_id: &str, output: &mut ParseOutput) {
    let mut statements = Vec::new();

    for mat in string_literal_pattern().find_iter(content) {
        let raw = mat.as_str().trim_matches(|c| c == '"' || c == '\'');
        if !sql_keyword_pattern().is_match(raw) {
            continue;
        }
        let line_number = content[..mat.start()].matches('\n').count() as u32 + 1;
        let tables: Vec<String> = table_name_pattern()
            .captures_iter(raw)
            .map(|c| c[1].to_string())
            .collect();
        let primary_table = tables.first().cloned().unwrap_or_default();
        if primary_table.is_empty() {
            continue;
        }
        let statement_type = SqlStatementType::classify(raw);
        let columns = parse_select_columns(raw, statement_type);
        let native_query = is_native_query(content, mat.start(), mat.end());
        statements.push((
            SqlStatement {
                statement_type,
                tables: tables.clone(),
                primary_table,
                columns,
                raw: raw.to_string(),
                is_native_query: native_query,
                line_number,
            },
            line_number,
        ));
    }

    for (stmt, line_number) in statements {
        let qualified = QualifiedName::sql_statement(
            file_path,
            line_number,
            stmt.statement_type.as_str(),
            &stmt.primary_table,
        );
        let entity_id = node_entity_id(NodeKind::SqlStatement, &qualified);
        let mut node = Node::new(
            entity_id.clone(),
            NodeKind::SqlStatement,
            format!("{} {}", stmt.statement_type.as_str(), stmt.primary_table),
            file_path,
            crate::domain::Language::Sql,
            Span::point(line_number, 0),
            repository_id,
        );
        node.set_property("tables", serde_json::to_value(&stmt.tables).unwrap_or_default());
        node.set_property("raw", stmt.raw.clone());
        node.set_property("primaryTable", stmt.primary_table.clone());
        node.set_property("statementType", stmt.statement_type.as_str());
        node.set_property("columns", serde_json::to_value(&stmt.columns).unwrap_or_default());
        node.set_property("isNativeQuery", stmt.is_native_query);
        output.nodes.push(node);

        if let Some(method) = enclosing_method(output, file_path, line_number) {
            output.edges.push(EdgeRecord::new(EdgeType::ExecutesSql, method.entity_id.clone(), entity_id));
        }
    }
}
