use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use duckdb::{params, Connection};
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::CheckpointRepository;
use crate::domain::{IndexError, ProcessingCheckpoint};

/// Stores each checkpoint as one JSON-serialized row keyed by `analysis_id`,
/// mirroring the teacher's metadata-table convention of serializing
/// composite fields to a text column rather than normalizing them (§4.5:
/// writes are best-effort and small, so a document-per-row shape is simpler
/// than a checkpoint table per field).
pub struct DuckdbCheckpointRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DuckdbCheckpointRepository {
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
            CREATE TABLE IF NOT EXISTS checkpoints (
                analysis_id TEXT PRIMARY KEY,
                repository_id TEXT NOT NULL,
                phase TEXT NOT NULL,
                updated_at BIGINT NOT NULL,
                payload TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_checkpoints_repository ON checkpoints (repository_id, updated_at);
            "#,
        )
        .map_err(|e| IndexError::schema(format!("failed to initialize checkpoints table: {e}")))?;
        debug!("checkpoints schema initialized");
        Ok(())
    }
}

#[async_trait]
impl CheckpointRepository for DuckdbCheckpointRepository {
    async fn find_active(&self, repository_id: &str) -> Result<Option<ProcessingCheckpoint>, IndexError> {
        match self.find_latest(repository_id).await? {
            Some(cp) if !cp.phase.is_terminal() => Ok(Some(cp)),
            _ => Ok(None),
        }
    }

    async fn find_latest(&self, repository_id: &str) -> Result<Option<ProcessingCheckpoint>, IndexError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare("SELECT payload FROM checkpoints WHERE repository_id = ?1 ORDER BY updated_at DESC LIMIT 1")
            .map_err(|e| IndexError::checkpoint(format!("failed to prepare statement: {e}")))?;

        match stmt.query_row(params![repository_id], |row| row.get::<_, String>(0)) {
            Ok(payload) => serde_json::from_str(&payload)
                .map(Some)
                .map_err(|e| IndexError::checkpoint(format!("failed to deserialize checkpoint: {e}"))),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(IndexError::checkpoint(format!("failed to query checkpoint: {e}"))),
        }
    }

    async fn save(&self, checkpoint: &ProcessingCheckpoint) -> Result<(), IndexError> {
        let payload = serde_json::to_string(checkpoint)
            .map_err(|e| IndexError::checkpoint(format!("failed to serialize checkpoint: {e}")))?;
        let conn = self.conn.lock().await;
        conn.execute(
            r#"
            INSERT INTO checkpoints (analysis_id, repository_id, phase, updated_at, payload)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (analysis_id) DO UPDATE SET
                phase = excluded.phase,
                updated_at = excluded.updated_at,
                payload = excluded.payload
            "#,
            params![
                checkpoint.analysis_id,
                checkpoint.repository_id,
                checkpoint.phase.as_str(),
                checkpoint.updated_at,
                payload,
            ],
        )
        .map_err(|e| IndexError::checkpoint(format!("failed to save checkpoint: {e}")))?;
        Ok(())
    }

    async fn delete(&self, analysis_id: &str) -> Result<(), IndexError> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM checkpoints WHERE analysis_id = ?1", params![analysis_id])
            .map_err(|e| IndexError::checkpoint(format!("failed to delete checkpoint: {e}")))?;
        Ok(())
    }
}
