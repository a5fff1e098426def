use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::current_timestamp;

/// Which code path produced the `dependencyDepth`/`pageRank` scores written
/// by post-index analytics (§4.10, §9 open question — resolved by recording
/// the mode rather than branching the engine).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsMode {
    Pagerank,
    DegreeFallback,
    Disabled,
}

impl AnalyticsMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyticsMode::Pagerank => "pagerank",
            AnalyticsMode::DegreeFallback => "degree-fallback",
            AnalyticsMode::Disabled => "disabled",
        }
    }
}

/// One per repository (§3.4): the durable post-run summary consulted by the
/// next run's incremental planner and replaced atomically on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexState {
    pub repository_id: String,
    pub last_commit_sha: Option<String>,
    pub last_indexed_at: i64,
    pub file_hashes: HashMap<String, String>,
    pub total_files_indexed: u64,
    pub index_version: u32,
    pub analytics_mode: AnalyticsMode,
}

impl IndexState {
    pub fn new(repository_id: impl Into<String>, index_version: u32) -> Self {
        Self {
            repository_id: repository_id.into(),
            last_commit_sha: None,
            last_indexed_at: current_timestamp(),
            file_hashes: HashMap::new(),
            total_files_indexed: 0,
            index_version,
            analytics_mode: AnalyticsMode::Disabled,
        }
    }

    /// Merges a batch's worth of hashes in, preserving the rest — used for
    /// the partial-save-after-each-batch ordering guarantee (§5).
    pub fn merge_hashes(&mut self, hashes: impl IntoIterator<Item = (String, String)>) {
        for (path, hash) in hashes {
            self.file_hashes.insert(path, hash);
        }
        self.total_files_indexed = self.file_hashes.len() as u64;
    }

    pub fn remove_paths(&mut self, paths: &[String]) {
        for path in paths {
            self.file_hashes.remove(path);
        }
        self.total_files_indexed = self.file_hashes.len() as u64;
    }

    pub fn touch(&mut self) {
        self.last_indexed_at = current_timestamp();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_hashes_updates_count() {
        let mut state = IndexState::new("repo-1", 1);
        state.merge_hashes([("a.rs".to_string(), "h1".to_string())]);
        state.merge_hashes([("b.rs".to_string(), "h2".to_string())]);
        assert_eq!(state.total_files_indexed, 2);

        state.remove_paths(&["a.rs".to_string()]);
        assert_eq!(state.total_files_indexed, 1);
        assert!(!state.file_hashes.contains_key("a.rs"));
    }
}
