use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::application::VcsDiff;
use crate::domain::{ChangePlan, IndexState, PlanReason, RenameHint, ScannedFile};

/// Current `IndexState.indexVersion`. Maintainers bump this to force a full
/// reindex across every repository on schema evolution (§6).
pub const CURRENT_INDEX_VERSION: u32 = 1;

/// Classifies scanned files into changed/deleted/unchanged using the
/// decision tree in §4.3: forced full reindex, missing prior state, version
/// upgrade, git diff (hash-verified), or plain hash comparison.
pub struct IncrementalPlannerUseCase;

impl IncrementalPlannerUseCase {
    pub fn new() -> Self {
        Self
    }

    pub fn plan(
        &self,
        scanned_files: Vec<ScannedFile>,
        prior_state: Option<&IndexState>,
        current_commit_sha: Option<&str>,
        vcs_diff: Option<&VcsDiff>,
        force_full: bool,
    ) -> ChangePlan {
        if force_full {
            info!(reason = "forced", "full reindex requested");
            return ChangePlan {
                changed_files: scanned_files,
                deleted_files: Vec::new(),
                unchanged_files: Vec::new(),
                is_full_reindex: true,
                reason: PlanReason::ForcedFullReindex,
                renames: Vec::new(),
            };
        }

        let Some(prior) = prior_state else {
            info!("no prior index state; full reindex");
            return ChangePlan {
                changed_files: scanned_files,
                deleted_files: Vec::new(),
                unchanged_files: Vec::new(),
                is_full_reindex: true,
                reason: PlanReason::NoExistingIndexState,
                renames: Vec::new(),
            };
        };

        if prior.index_version != CURRENT_INDEX_VERSION {
            info!(
                from = prior.index_version,
                to = CURRENT_INDEX_VERSION,
                "index version mismatch; full reindex"
            );
            let deleted: Vec<String> = prior.file_hashes.keys().cloned().collect();
            return ChangePlan {
                changed_files: scanned_files,
                deleted_files: deleted,
                unchanged_files: Vec::new(),
                is_full_reindex: true,
                reason: PlanReason::IndexVersionUpgrade {
                    from: prior.index_version,
                    to: CURRENT_INDEX_VERSION,
                },
                renames: Vec::new(),
            };
        }

        let has_valid_git_transition = matches!(
            (&prior.last_commit_sha, current_commit_sha),
            (Some(prior_sha), Some(current_sha)) if prior_sha != current_sha
        );

        if has_valid_git_transition {
            if let Some(diff) = vcs_diff {
                return self.plan_from_git_diff(
                    scanned_files,
                    prior,
                    diff,
                    prior.last_commit_sha.clone().unwrap_or_default(),
                    current_commit_sha.unwrap_or_default().to_string(),
                );
            }
        }

        self.plan_from_hashes(scanned_files, prior)
    }

    fn plan_from_git_diff(
        &self,
        scanned_files: Vec<ScannedFile>,
        prior: &IndexState,
        diff: &VcsDiff,
        from_sha: String,
        to_sha: String,
    ) -> ChangePlan {
        let by_path: HashMap<String, ScannedFile> = scanned_files
            .into_iter()
            .map(|f| (f.path.clone(), f))
            .collect();

        let mut touched: HashSet<String> = HashSet::new();
        touched.extend(diff.added.iter().cloned());
        touched.extend(diff.modified.iter().cloned());
        for rename in &diff.renamed {
            touched.insert(rename.new_path.clone());
        }

        let mut changed_files = Vec::new();
        let mut unchanged_files = Vec::new();

        for (path, file) in &by_path {
            let stored_hash = prior.file_hashes.get(path);
            if touched.contains(path) {
                // Hash-verify: a "changed" file whose content hash still
                // matches is reclassified unchanged (whitespace/revert).
                if stored_hash == Some(&file.content_hash) {
                    debug!(path, "git reported change but hash matches; unchanged");
                    unchanged_files.push(file.clone());
                } else {
                    changed_files.push(file.clone());
                }
            } else if stored_hash != Some(&file.content_hash) {
                // Not reported by git (e.g. untracked) but hash drifted.
                changed_files.push(file.clone());
            } else {
                unchanged_files.push(file.clone());
            }
        }

        let mut deleted_files: Vec<String> = diff.deleted.clone();
        for path in prior.file_hashes.keys() {
            if !by_path.contains_key(path) && !deleted_files.contains(path) {
                deleted_files.push(path.clone());
            }
        }
        for rename in &diff.renamed {
            if !deleted_files.contains(&rename.old_path) {
                deleted_files.push(rename.old_path.clone());
            }
        }

        let renames = diff
            .renamed
            .iter()
            .map(|r| RenameHint {
                old_path: r.old_path.clone(),
                new_path: r.new_path.clone(),
                similarity: r.similarity,
            })
            .collect();

        ChangePlan {
            changed_files,
            deleted_files,
            unchanged_files,
            is_full_reindex: false,
            reason: PlanReason::GitDiff { from_sha, to_sha },
            renames,
        }
    }

    fn plan_from_hashes(&self, scanned_files: Vec<ScannedFile>, prior: &IndexState) -> ChangePlan {
        let mut seen = HashSet::new();
        let mut changed_files = Vec::new();
        let mut unchanged_files = Vec::new();

        for file in scanned_files {
            seen.insert(file.path.clone());
            match prior.file_hashes.get(&file.path) {
                None => changed_files.push(file),
                Some(stored) if stored != &file.content_hash => changed_files.push(file),
                Some(_) => unchanged_files.push(file),
            }
        }

        let deleted_files: Vec<String> = prior
            .file_hashes
            .keys()
            .filter(|p| !seen.contains(*p))
            .cloned()
            .collect();

        ChangePlan {
            changed_files,
            deleted_files,
            unchanged_files,
            is_full_reindex: false,
            reason: PlanReason::HashComparison,
            renames: Vec::new(),
        }
    }
}

impl Default for IncrementalPlannerUseCase {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanned(path: &str, hash: &str) -> ScannedFile {
        ScannedFile {
            path: path.to_string(),
            size_bytes: 10,
            content_hash: hash.to_string(),
            language: crate::domain::Language::Rust,
        }
    }

    #[test]
    fn force_full_marks_everything_changed() {
        let planner = IncrementalPlannerUseCase::new();
        let files = vec![scanned("a.rs", "h1")];
        let plan = planner.plan(files, None, None, None, true);
        assert!(plan.is_full_reindex);
        assert_eq!(plan.changed_files.len(), 1);
        assert!(matches!(plan.reason, PlanReason::ForcedFullReindex));
    }

    #[test]
    fn no_prior_state_is_full_reindex() {
        let planner = IncrementalPlannerUseCase::new();
        let files = vec![scanned("a.rs", "h1")];
        let plan = planner.plan(files, None, None, None, false);
        assert!(plan.is_full_reindex);
        assert!(matches!(plan.reason, PlanReason::NoExistingIndexState));
    }

    #[test]
    fn version_mismatch_deletes_all_prior_paths() {
        let planner = IncrementalPlannerUseCase::new();
        let mut prior = IndexState::new("repo-1", CURRENT_INDEX_VERSION);
        prior.index_version = CURRENT_INDEX_VERSION - 1;
        prior.file_hashes.insert("old.rs".to_string(), "h0".to_string());
        let files = vec![scanned("a.rs", "h1")];
        let plan = planner.plan(files, Some(&prior), None, None, false);
        assert!(plan.is_full_reindex);
        assert_eq!(plan.deleted_files, vec!["old.rs".to_string()]);
    }

    #[test]
    fn hash_comparison_classifies_added_modified_unchanged_deleted() {
        let planner = IncrementalPlannerUseCase::new();
        let mut prior = IndexState::new("repo-1", CURRENT_INDEX_VERSION);
        prior.file_hashes.insert("unchanged.rs".to_string(), "same".to_string());
        prior.file_hashes.insert("modified.rs".to_string(), "old".to_string());
        prior.file_hashes.insert("deleted.rs".to_string(), "gone".to_string());

        let files = vec![
            scanned("unchanged.rs", "same"),
            scanned("modified.rs", "new"),
            scanned("added.rs", "brand-new"),
        ];

        let plan = planner.plan(files, Some(&prior), None, None, false);
        assert!(!plan.is_full_reindex);
        assert_eq!(plan.unchanged_files.len(), 1);
        assert_eq!(plan.changed_files.len(), 2);
        assert_eq!(plan.deleted_files, vec!["deleted.rs".to_string()]);
    }

    #[test]
    fn git_diff_reclassifies_whitespace_only_edit_as_unchanged() {
        let planner = IncrementalPlannerUseCase::new();
        let mut prior = IndexState::new("repo-1", CURRENT_INDEX_VERSION);
        prior.last_commit_sha = Some("sha-old".to_string());
        prior.file_hashes.insert("touched.rs".to_string(), "stable-hash".to_string());

        let diff = VcsDiff {
            added: vec![],
            modified: vec!["touched.rs".to_string()],
            deleted: vec![],
            renamed: vec![],
        };

        let files = vec![scanned("touched.rs", "stable-hash")];
        let plan = planner.plan(files, Some(&prior), Some("sha-new"), Some(&diff), false);
        assert!(plan.changed_files.is_empty());
        assert_eq!(plan.unchanged_files.len(), 1);
    }
}
