use serde::{Deserialize, Serialize};

use super::ScannedFile;

/// A file the VCS driver reports as a rename. The planner collapses this to
/// delete-old + add-new (§4.2); the pair is retained here purely so the
/// orchestrator can log the rename hint instead of discarding it (§10).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameHint {
    pub old_path: String,
    pub new_path: String,
    pub similarity: f32,
}

/// Why the incremental planner chose the path it did (§4.3 decision tree),
/// surfaced in run metadata and logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanReason {
    ForcedFullReindex,
    NoExistingIndexState,
    IndexVersionUpgrade { from: u32, to: u32 },
    GitDiff { from_sha: String, to_sha: String },
    HashComparison,
}

impl std::fmt::Display for PlanReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanReason::ForcedFullReindex => write!(f, "Forced full reindex"),
            PlanReason::NoExistingIndexState => write!(f, "No existing index state"),
            PlanReason::IndexVersionUpgrade { from, to } => {
                write!(f, "Version upgrade from {from} to {to}")
            }
            PlanReason::GitDiff { from_sha, to_sha } => {
                write!(f, "Git diff from {from_sha} to {to_sha}")
            }
            PlanReason::HashComparison => write!(f, "Hash comparison"),
        }
    }
}

/// The incremental planner's decision (§4.3 output): which files to
/// (re)process, which to delete, which are untouched, and why.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePlan {
    pub changed_files: Vec<ScannedFile>,
    pub deleted_files: Vec<String>,
    pub unchanged_files: Vec<ScannedFile>,
    pub is_full_reindex: bool,
    pub reason: PlanReason,
    pub renames: Vec<RenameHint>,
}

impl ChangePlan {
    pub fn empty(reason: PlanReason) -> Self {
        Self {
            changed_files: Vec::new(),
            deleted_files: Vec::new(),
            unchanged_files: Vec::new(),
            is_full_reindex: false,
            reason,
            renames: Vec::new(),
        }
    }

    pub fn total_files_discovered(&self) -> usize {
        self.changed_files.len() + self.unchanged_files.len()
    }

    pub fn has_work(&self) -> bool {
        !self.changed_files.is_empty() || !self.deleted_files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_plan_has_no_work() {
        let plan = ChangePlan::empty(PlanReason::NoExistingIndexState);
        assert!(!plan.has_work());
        assert_eq!(plan.total_files_discovered(), 0);
    }

    #[test]
    fn plan_reason_formats_version_upgrade() {
        let reason = PlanReason::IndexVersionUpgrade { from: 3, to: 4 };
        assert_eq!(reason.to_string(), "Version upgrade from 3 to 4");
    }
}
