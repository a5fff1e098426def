use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::current_timestamp;

/// Strictly ordered checkpoint phases (§4.5). `Ord` reflects pipeline order
/// so the orchestrator can assert monotonicity with a plain comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointPhase {
    Initialized,
    Scanning,
    IncrementalCheck,
    Parsing,
    StoringNodes,
    StoringRelationships,
    ComputingPagerank,
    SavingIndexState,
    Completed,
    Failed,
}

impl CheckpointPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckpointPhase::Completed | CheckpointPhase::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckpointPhase::Initialized => "initialized",
            CheckpointPhase::Scanning => "scanning",
            CheckpointPhase::IncrementalCheck => "incremental_check",
            CheckpointPhase::Parsing => "parsing",
            CheckpointPhase::StoringNodes => "storing_nodes",
            CheckpointPhase::StoringRelationships => "storing_relationships",
            CheckpointPhase::ComputingPagerank => "computing_pagerank",
            CheckpointPhase::SavingIndexState => "saving_index_state",
            CheckpointPhase::Completed => "completed",
            CheckpointPhase::Failed => "failed",
        }
    }

    /// Percent-complete estimate for the CLI `status` command (§10), based
    /// on position in the fixed phase sequence rather than byte/file counts.
    pub fn percent_complete(&self) -> u8 {
        match self {
            CheckpointPhase::Initialized => 0,
            CheckpointPhase::Scanning => 10,
            CheckpointPhase::IncrementalCheck => 20,
            CheckpointPhase::Parsing => 40,
            CheckpointPhase::StoringNodes => 60,
            CheckpointPhase::StoringRelationships => 75,
            CheckpointPhase::ComputingPagerank => 90,
            CheckpointPhase::SavingIndexState => 95,
            CheckpointPhase::Completed => 100,
            CheckpointPhase::Failed => 0,
        }
    }
}

/// Zero-or-one per repository (§3.4, §4.5): created on run start, deleted on
/// success, retained on failure for inspection and resume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingCheckpoint {
    pub analysis_id: String,
    pub repository_id: String,
    pub phase: CheckpointPhase,
    pub total_files_discovered: u64,
    pub nodes_created: u64,
    pub relationships_created: u64,
    pub current_batch_index: u64,
    pub total_batches: u64,
    pub files_processed: Vec<String>,
    pub files_failed: Vec<String>,
    pub changed_files: Vec<String>,
    pub deleted_files: Vec<String>,
    pub unchanged_files: Vec<String>,
    pub started_at: i64,
    pub updated_at: i64,
    pub is_full_reindex: bool,
    pub force_full_reindex: bool,
    pub last_error: Option<String>,
}

impl ProcessingCheckpoint {
    pub fn new(repository_id: impl Into<String>, is_full_reindex: bool, force_full_reindex: bool) -> Self {
        let now = current_timestamp();
        Self {
            analysis_id: Uuid::new_v4().to_string(),
            repository_id: repository_id.into(),
            phase: CheckpointPhase::Initialized,
            total_files_discovered: 0,
            nodes_created: 0,
            relationships_created: 0,
            current_batch_index: 0,
            total_batches: 0,
            files_processed: Vec::new(),
            files_failed: Vec::new(),
            changed_files: Vec::new(),
            deleted_files: Vec::new(),
            unchanged_files: Vec::new(),
            started_at: now,
            updated_at: now,
            is_full_reindex,
            force_full_reindex,
            last_error: None,
        }
    }

    /// Advances the phase, refusing to move backward (§5 ordering guarantee:
    /// "checkpoint phase transitions are monotonic").
    pub fn advance_phase(&mut self, phase: CheckpointPhase) {
        if phase >= self.phase {
            self.phase = phase;
        }
        self.updated_at = current_timestamp();
    }

    /// Appends a completed batch's files and recomputes counters from
    /// `filesProcessed` length rather than incrementing, so a retried call
    /// after a failed checkpoint write stays idempotent (§9 decided).
    pub fn mark_batch_complete(
        &mut self,
        batch_index: u64,
        files_in_batch: &[String],
        nodes_in_batch: u64,
        edges_in_batch: u64,
    ) {
        let already_recorded = batch_index < self.current_batch_index
            || (batch_index == self.current_batch_index && self.current_batch_index > 0);
        for file in files_in_batch {
            if !self.files_processed.iter().any(|p| p == file) {
                self.files_processed.push(file.clone());
            }
        }
        if !already_recorded {
            self.nodes_created += nodes_in_batch;
            self.relationships_created += edges_in_batch;
            self.current_batch_index = batch_index;
        }
        self.updated_at = current_timestamp();
    }

    pub fn mark_file_failed(&mut self, file: impl Into<String>) {
        self.files_failed.push(file.into());
    }

    pub fn is_file_already_processed(&self, file: &str) -> bool {
        self.files_processed.iter().any(|p| p == file)
    }

    pub fn complete(&mut self) {
        self.advance_phase(CheckpointPhase::Completed);
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.last_error = Some(error.into());
        self.phase = CheckpointPhase::Failed;
        self.updated_at = current_timestamp();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_does_not_regress() {
        let mut cp = ProcessingCheckpoint::new("repo-1", true, false);
        cp.advance_phase(CheckpointPhase::Parsing);
        cp.advance_phase(CheckpointPhase::Scanning);
        assert_eq!(cp.phase, CheckpointPhase::Parsing);
    }

    #[test]
    fn mark_batch_complete_is_idempotent_on_retry() {
        let mut cp = ProcessingCheckpoint::new("repo-1", true, false);
        let files = vec!["a.rs".to_string(), "b.rs".to_string()];
        cp.mark_batch_complete(1, &files, 10, 3);
        cp.mark_batch_complete(1, &files, 10, 3);
        assert_eq!(cp.files_processed.len(), 2);
    }

    #[test]
    fn percent_complete_reaches_full_at_completion() {
        assert_eq!(CheckpointPhase::Completed.percent_complete(), 100);
        assert!(CheckpointPhase::Completed.is_terminal());
        assert!(CheckpointPhase::Failed.is_terminal());
        assert!(!CheckpointPhase::Parsing.is_terminal());
    }
}
