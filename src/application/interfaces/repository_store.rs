use async_trait::async_trait;

use crate::domain::{IndexError, Repository};

/// Persistence for `Repository` root nodes (§3.4).
#[async_trait]
pub trait RepositoryStore: Send + Sync {
    async fn save(&self, repository: &Repository) -> Result<(), IndexError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Repository>, IndexError>;

    async fn find_by_path(&self, path: &str) -> Result<Option<Repository>, IndexError>;

    async fn list(&self) -> Result<Vec<Repository>, IndexError>;

    async fn delete(&self, id: &str) -> Result<(), IndexError>;

    async fn update_stats(
        &self,
        id: &str,
        node_count: u64,
        edge_count: u64,
        file_count: u64,
    ) -> Result<(), IndexError>;
}
