use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use duckdb::{params, Connection};
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::IndexStateRepository;
use crate::domain::{IndexError, IndexState};

/// One JSON-serialized row per repository (§3.4), replaced wholesale on
/// save to match the "replaced atomically at end of a successful run,
/// partial writes allowed between batches" invariant.
pub struct DuckdbIndexStateRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DuckdbIndexStateRepository {
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

    fn initialize_schema(conn: &Connection) -> Result<(), IndexError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS index_state (
                repository_id TEXT PRIMARY KEY,
                last_indexed_at BIGINT NOT NULL,
                payload TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| IndexError::schema(format!("failed to initialize index_state table: {e}")))?;
        debug!("index_state schema initialized");
        Ok(())
    }
}

#[async_trait]
impl IndexStateRepository for DuckdbIndexStateRepository {
    async fn find_by_repository(&self, repository_id: &str) -> Result<Option<IndexState>, IndexError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare("SELECT payload FROM index_state WHERE repository_id = ?1")
            .map_err(|e| IndexError::internal(format!("failed to prepare statement: {e}")))?;

        match stmt.query_row(params![repository_id], |row| row.get::<_, String>(0)) {
            Ok(payload) => serde_json::from_str(&payload)
                .map(Some)
                .map_err(|e| IndexError::internal(format!("failed to deserialize index state: {e}"))),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(IndexError::internal(format!("failed to query index state: {e}"))),
        }
    }

    async fn save(&self, state: &IndexState) -> Result<(), IndexError> {
        let payload = serde_json::to_string(state)
            .map_err(|e| IndexError::internal(format!("failed to serialize index state: {e}")))?;
        let conn = self.conn.lock().await;
        conn.execute(
            r#"
            INSERT INTO index_state (repository_id, last_indexed_at, payload)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (repository_id) DO UPDATE SET
                last_indexed_at = excluded.last_indexed_at,
                payload = excluded.payload
            "#,
            params![state.repository_id, state.last_indexed_at, payload],
        )
        .map_err(|e| IndexError::internal(format!("failed to save index state: {e}")))?;
        Ok(())
    }

    async fn delete(&self, repository_id: &str) -> Result<(), IndexError> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM index_state WHERE repository_id = ?1", params![repository_id])
            .map_err(|e| IndexError::internal(format!("failed to delete index state: {e}")))?;
        Ok(())
    }
}
