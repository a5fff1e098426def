use async_trait::async_trait;

use crate::domain::{EdgeRecord, IndexError, Node};

/// Nodes/edges removed by a `delete_by_file_path` cleanup batch (§4.4).
#[derive(Debug, Clone, Copy, Default)]
pub struct DeletionCounts {
    pub nodes_deleted: u64,
    pub edges_deleted: u64,
}

/// The abstract property-graph store (§6). Upserts are keyed by `entityId`
/// so a retried batch is always safe to replay.
#[async_trait]
pub trait GraphDatabase: Send + Sync {
    /// UNWIND + MERGE by `entityId`; REMOVE old labels, SET the label set
    /// derived from `kind` (§4.8).
    async fn save_nodes_batch(&self, nodes: &[Node]) -> Result<(), IndexError>;

    /// MERGE endpoints by `entityId` (never MATCH, to tolerate resolver
    /// stubs), then MERGE the edge keyed on its own `entityId` (§4.8).
    async fn save_relationships_batch(&self, edges: &[EdgeRecord]) -> Result<(), IndexError>;

    /// Detach-deletes every node (and incident edge) with this `filePath`
    /// under this repository, batched internally (§4.4).
    async fn delete_by_file_path(
        &self,
        repository_id: &str,
        file_path: &str,
    ) -> Result<DeletionCounts, IndexError>;

    async fn node_count(&self, repository_id: &str) -> Result<u64, IndexError>;

    async fn edge_count(&self, repository_id: &str) -> Result<u64, IndexError>;

    /// All nodes for a repository, keyed for the cross-file resolver's
    /// qualified-name index (§4.7).
    async fn load_nodes_for_repository(&self, repository_id: &str) -> Result<Vec<Node>, IndexError>;

    /// All concrete edges for a repository, the subgraph PageRank/BFS run
    /// over (§4.10).
    async fn load_edges_for_repository(&self, repository_id: &str) -> Result<Vec<EdgeRecord>, IndexError>;

    /// Writes back `pageRank`/`dependencyDepth` properties onto existing
    /// nodes by `entityId` without altering labels.
    async fn write_analytics_properties(
        &self,
        page_rank: &std::collections::HashMap<String, f64>,
        dependency_depth: &std::collections::HashMap<String, u32>,
    ) -> Result<(), IndexError>;

    /// Detach-deletes every node/edge belonging to a repository (the CLI
    /// `reset` command and `resetDb` config option, §10).
    async fn reset_repository(&self, repository_id: &str) -> Result<(), IndexError>;

    /// Idempotently applies uniqueness constraints, property indexes, and
    /// full-text indexes (§4.9). "Already exists" is swallowed, not an
    /// error. When `force_update` is set, existing user schema is dropped
    /// before reapplying.
    async fn apply_schema(&self, force_update: bool) -> Result<(), IndexError>;
}
