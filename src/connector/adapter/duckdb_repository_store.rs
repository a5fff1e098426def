use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use duckdb::{params, Connection};
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::RepositoryStore;
use crate::domain::{IndexError, Repository};

/// `RepositoryStore` over the shared `repositories` table (§3.4 lifecycle
/// entity). Shares its connection with the other DuckDB adapters since
/// DuckDB allows only one writer per file.
pub struct DuckdbRepositoryStore {
    conn: Arc<Mutex<Connection>>,
}

impl DuckdbRepositoryStore {
    pub fn new(db_path: &Path) -> Result<Self, IndexError> {
        let conn = Connection::open(db_path).map_err(|e| IndexError::schema(format!("failed to open database: {e}")))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn with_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    pub fn shared_connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    fn initialize_schema(conn: &Connection) -> Result<(), IndexError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS repositories (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                path TEXT NOT NULL UNIQUE,
                url TEXT,
                created_at BIGINT NOT NULL,
                updated_at BIGINT NOT NULL,
                node_count BIGINT DEFAULT 0,
                edge_count BIGINT DEFAULT 0,
                file_count BIGINT DEFAULT 0
            );
            "#,
        )
        .map_err(|e| IndexError::schema(format!("failed to initialize repositories table: {e}")))?;
        debug!("repositories schema initialized");
        Ok(())
    }

    fn row_to_repository(row: &duckdb::Row<'_>) -> duckdb::Result<Repository> {
        Ok(Repository::reconstitute(
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get::<_, i64>(6)? as u64,
            row.get::<_, i64>(7)? as u64,
            row.get::<_, i64>(8)? as u64,
        ))
    }
}

#[async_trait]
impl RepositoryStore for DuckdbRepositoryStore {
    async fn save(&self, repository: &Repository) -> Result<(), IndexError> {
        let conn = self.conn.lock().await;
        conn.execute(
            r#"
            INSERT INTO repositories (id, name, path, url, created_at, updated_at, node_count, edge_count, file_count)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT (id) DO UPDATE SET
                name = excluded.name,
                path = excluded.path,
                url = excluded.url,
                updated_at = excluded.updated_at,
                node_count = excluded.node_count,
                edge_count = excluded.edge_count,
                file_count = excluded.file_count
            "#,
            params![
                repository.id(),
                repository.name(),
                repository.path(),
                repository.url(),
                repository.created_at(),
                repository.updated_at(),
                repository.node_count() as i64,
                repository.edge_count() as i64,
                repository.file_count() as i64,
            ],
        )
        .map_err(|e| IndexError::internal(format!("failed to save repository: {e}")))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Repository>, IndexError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare("SELECT id, name, path, url, created_at, updated_at, node_count, edge_count, file_count FROM repositories WHERE id = ?1")
            .map_err(|e| IndexError::internal(format!("failed to prepare statement: {e}")))?;
        match stmt.query_row(params![id], Self::row_to_repository) {
            Ok(repo) => Ok(Some(repo)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(IndexError::internal(format!("failed to query repository: {e}"))),
        }
    }

    async fn find_by_path(&self, path: &str) -> Result<Option<Repository>, IndexError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare("SELECT id, name, path, url, created_at, updated_at, node_count, edge_count, file_count FROM repositories WHERE path = ?1")
            .map_err(|e| IndexError::internal(format!("failed to prepare statement: {e}")))?;
        match stmt.query_row(params![path], Self::row_to_repository) {
            Ok(repo) => Ok(Some(repo)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(IndexError::internal(format!("failed to query repository by path: {e}"))),
        }
    }

    async fn list(&self) -> Result<Vec<Repository>, IndexError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare("SELECT id, name, path, url, created_at, updated_at, node_count, edge_count, file_count FROM repositories ORDER BY name")
            .map_err(|e| IndexError::internal(format!("failed to prepare statement: {e}")))?;
        let rows = stmt
            .query_map([], Self::row_to_repository)
            .map_err(|e| IndexError::internal(format!("failed to query repositories: {e}")))?;
        let mut repos = Vec::new();
        for row in rows {
            repos.push(row.map_err(|e| IndexError::internal(format!("failed to read row: {e}")))?);
        }
        Ok(repos)
    }

    async fn delete(&self, id: &str) -> Result<(), IndexError> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM repositories WHERE id = ?1", params![id])
            .map_err(|e| IndexError::internal(format!("failed to delete repository: {e}")))?;
        Ok(())
    }

    async fn update_stats(&self, id: &str, node_count: u64, edge_count: u64, file_count: u64) -> Result<(), IndexError> {
        let conn = self.conn.lock().await;
        let now = crate::domain::current_timestamp();
        conn.execute(
            "UPDATE repositories SET node_count = ?1, edge_count = ?2, file_count = ?3, updated_at = ?4 WHERE id = ?5",
            params![node_count as i64, edge_count as i64, file_count as i64, now, id],
        )
        .map_err(|e| IndexError::internal(format!("failed to update repository stats: {e}")))?;
        Ok(())
    }
}
