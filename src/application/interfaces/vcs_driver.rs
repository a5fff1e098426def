use async_trait::async_trait;

use crate::domain::IndexError;

/// A file renamed between `fromSha` and `toSha`, reported by the VCS driver
/// even though the incremental planner collapses it to delete+add (§10).
#[derive(Debug, Clone)]
pub struct RenamedPath {
    pub old_path: String,
    pub new_path: String,
    pub similarity: f32,
}

/// The set of path-level changes between two commits (§4.2).
#[derive(Debug, Clone, Default)]
pub struct VcsDiff {
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub deleted: Vec<String>,
    pub renamed: Vec<RenamedPath>,
}

impl VcsDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.modified.is_empty()
            && self.deleted.is_empty()
            && self.renamed.is_empty()
    }
}

/// Options honored by a remote clone (§6): `branch`, shallow `depth`, and an
/// HTTPS `auth_token` callback.
#[derive(Debug, Clone, Default)]
pub struct CloneOptions {
    pub branch: Option<String>,
    pub depth: Option<u32>,
    pub auth_token: Option<String>,
}

/// Version control operations the incremental planner and orchestrator
/// depend on (§4.2). When the directory is not a repository, callers fall
/// back to hash-only planning rather than treating this as fatal.
#[async_trait]
pub trait VcsDriver: Send + Sync {
    async fn is_repo(&self, dir: &str) -> bool;

    async fn head_sha(&self, dir: &str) -> Result<Option<String>, IndexError>;

    async fn diff(
        &self,
        dir: &str,
        from_sha: &str,
        to_sha: Option<&str>,
    ) -> Result<VcsDiff, IndexError>;

    async fn untracked(&self, dir: &str) -> Result<Vec<String>, IndexError>;

    /// Shallow-clones `url` into `dest`, honoring `branch`/`depth`/`auth_token`.
    async fn clone(&self, url: &str, dest: &str, options: &CloneOptions) -> Result<(), IndexError>;
}
