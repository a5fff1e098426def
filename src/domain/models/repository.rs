use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The root lifecycle entity (§3.4): one `Repository` node per indexed
/// codebase, identified by a caller-supplied or generated `repositoryId`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    id: String,
    name: String,
    path: String,
    url: Option<String>,
    created_at: i64,
    updated_at: i64,
    node_count: u64,
    edge_count: u64,
    file_count: u64,
}

impl Repository {
    pub fn new(name: String, path: String) -> Self {
        let now = current_timestamp();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            path,
            url: None,
            created_at: now,
            updated_at: now,
            node_count: 0,
            edge_count: 0,
            file_count: 0,
        }
    }

    pub fn with_id(id: String, name: String, path: String) -> Self {
        let now = current_timestamp();
        Self {
            id,
            name,
            path,
            url: None,
            created_at: now,
            updated_at: now,
            node_count: 0,
            edge_count: 0,
            file_count: 0,
        }
    }

    pub fn new_from_url(name: String, path: String, url: String) -> Self {
        let mut repo = Self::new(name, path);
        repo.url = Some(url);
        repo
    }

    /// Reconstitutes from persisted data (used by adapters).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: String,
        name: String,
        path: String,
        url: Option<String>,
        created_at: i64,
        updated_at: i64,
        node_count: u64,
        edge_count: u64,
        file_count: u64,
    ) -> Self {
        Self {
            id,
            name,
            path,
            url,
            created_at,
            updated_at,
            node_count,
            edge_count,
            file_count,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn updated_at(&self) -> i64 {
        self.updated_at
    }

    pub fn node_count(&self) -> u64 {
        self.node_count
    }

    pub fn edge_count(&self) -> u64 {
        self.edge_count
    }

    pub fn file_count(&self) -> u64 {
        self.file_count
    }

    pub fn update_stats(&mut self, node_count: u64, edge_count: u64, file_count: u64) {
        self.node_count = node_count;
        self.edge_count = edge_count;
        self.file_count = file_count;
        self.updated_at = current_timestamp();
    }

    pub fn is_indexed(&self) -> bool {
        self.node_count > 0
    }

    pub fn is_empty(&self) -> bool {
        self.file_count == 0
    }

    pub fn summary(&self) -> String {
        format!(
            "{} ({} files, {} nodes, {} edges)",
            self.name, self.file_count, self.node_count, self.edge_count
        )
    }

    pub fn matches_path(&self, path: &str) -> bool {
        self.path == path
    }

    pub fn age_seconds(&self) -> i64 {
        current_timestamp().saturating_sub(self.created_at)
    }

    pub fn seconds_since_update(&self) -> i64 {
        current_timestamp().saturating_sub(self.updated_at)
    }
}

pub fn current_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// The current indexing status of a repository, derived from its checkpoint
/// (if any) for CLI `status` reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexingStatus {
    NeverIndexed,
    InProgress,
    Completed,
    Failed,
}

impl IndexingStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, IndexingStatus::Completed)
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, IndexingStatus::InProgress)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, IndexingStatus::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_creation() {
        let repo = Repository::new("my-repo".to_string(), "/path/to/repo".to_string());

        assert_eq!(repo.name(), "my-repo");
        assert_eq!(repo.path(), "/path/to/repo");
        assert_eq!(repo.node_count(), 0);
        assert_eq!(repo.file_count(), 0);
        assert!(!repo.is_indexed());
        assert!(repo.is_empty());
    }

    #[test]
    fn test_update_stats() {
        let mut repo = Repository::new("test".to_string(), "/test".to_string());

        repo.update_stats(100, 40, 10);

        assert_eq!(repo.node_count(), 100);
        assert_eq!(repo.edge_count(), 40);
        assert_eq!(repo.file_count(), 10);
        assert!(repo.is_indexed());
        assert!(!repo.is_empty());
    }

    #[test]
    fn test_from_url_carries_url() {
        let repo = Repository::new_from_url(
            "acme".to_string(),
            "/tmp/clone-xyz".to_string(),
            "https://example.com/acme.git".to_string(),
        );
        assert_eq!(repo.url(), Some("https://example.com/acme.git"));
    }
}
