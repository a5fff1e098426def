use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SqlStatementType {
    Select,
    Insert,
    Update,
    Delete,
    Merge,
    CreateTable,
    AlterTable,
    Other,
}

impl SqlStatementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SqlStatementType::Select => "SELECT",
            SqlStatementType::Insert => "INSERT",
            SqlStatementType::Update => "UPDATE",
            SqlStatementType::Delete => "DELETE",
            SqlStatementType::Merge => "MERGE",
            SqlStatementType::CreateTable => "CREATE_TABLE",
            SqlStatementType::AlterTable => "ALTER_TABLE",
            SqlStatementType::Other => "OTHER",
        }
    }

    /// Classifies a SQL statement's leading keyword, used by the SQL
    /// extractor (§4.6) on both annotated queries and string-literal SQL.
    pub fn classify(sql: &str) -> Self {
        let trimmed = sql.trim_start().to_uppercase();
        if trimmed.starts_with("SELECT") {
            SqlStatementType::Select
        } else if trimmed.starts_with("INSERT") {
            SqlStatementType::Insert
        } else if trimmed.starts_with("UPDATE") {
            SqlStatementType::Update
        } else if trimmed.starts_with("DELETE") {
            SqlStatementType::Delete
        } else if trimmed.starts_with("MERGE") {
            SqlStatementType::Merge
        } else if trimmed.starts_with("CREATE TABLE") {
            SqlStatementType::CreateTable
        } else if trimmed.starts_with("ALTER TABLE") {
            SqlStatementType::AlterTable
        } else {
            SqlStatementType::Other
        }
    }
}

/// A single SQL statement recognized inside source code (annotated query,
/// native query call, or string-literal SQL), per §4.6's SQL extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqlStatement {
    pub statement_type: SqlStatementType,
    pub tables: Vec<String>,
    pub primary_table: String,
    pub columns: Vec<String>,
    pub raw: String,
    pub is_native_query: bool,
    pub line_number: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_select_statement() {
        assert_eq!(
            SqlStatementType::classify("SELECT u.id, u.name FROM users u WHERE u.active=true"),
            SqlStatementType::Select
        );
    }

    #[test]
    fn classifies_case_insensitively() {
        assert_eq!(SqlStatementType::classify("  select 1"), SqlStatementType::Select);
        assert_eq!(
            SqlStatementType::classify("update accounts set balance = 0"),
            SqlStatementType::Update
        );
    }

    #[test]
    fn unrecognized_statement_is_other() {
        assert_eq!(SqlStatementType::classify("EXPLAIN ANALYZE SELECT 1"), SqlStatementType::Other);
    }
}
