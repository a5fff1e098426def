use async_trait::async_trait;

use crate::domain::{IndexError, IndexState};

/// Persistence for the per-repository `IndexState` summary (§3.4). Saves are
/// expected to be callable repeatedly mid-run: the orchestrator persists a
/// partial state after every successful batch (§4.11).
#[async_trait]
pub trait IndexStateRepository: Send + Sync {
    async fn find_by_repository(&self, repository_id: &str) -> Result<Option<IndexState>, IndexError>;

    async fn save(&self, state: &IndexState) -> Result<(), IndexError>;

    async fn delete(&self, repository_id: &str) -> Result<(), IndexError>;
}
