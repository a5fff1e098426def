use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use tempfile::TempDir;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::{
    CheckpointRepository, CloneOptions, CrossFileResolverUseCase, FileScanner, GraphDatabase,
    IncrementalPlannerUseCase, IndexStateRepository, LanguageParser, ParseOutput,
    PostIndexAnalyticsUseCase, RepositoryStore, ScanConfig, VcsDriver, CURRENT_INDEX_VERSION,
};
use crate::domain::{
    current_timestamp, AnalyticsMode, CheckpointPhase, IndexError, IndexState, ProcessingCheckpoint,
    Repository, ScannedFile,
};

/// Runtime configuration for one orchestrator run (§6 external interfaces).
/// Mirrors the config surface a caller (CLI, API) supplies per invocation.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub supported_extensions: Vec<String>,
    pub ignore_patterns: Vec<String>,
    pub storage_batch_size: usize,
    pub parse_concurrency: usize,
    pub index_version: u32,
    pub analytics_enabled: bool,
    pub force_full_reindex: bool,
    pub reset_db: bool,
    pub update_schema: bool,
    pub repository_id: Option<String>,
    pub repository_name: Option<String>,
    pub repository_url: Option<String>,
    pub branch: Option<String>,
    pub auth_token: Option<String>,
    pub depth: Option<u32>,
    pub keep_clone: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            supported_extensions: Vec::new(),
            ignore_patterns: Vec::new(),
            storage_batch_size: 1000,
            parse_concurrency: 4,
            index_version: CURRENT_INDEX_VERSION,
            analytics_enabled: true,
            force_full_reindex: false,
            reset_db: false,
            update_schema: false,
            repository_id: None,
            repository_name: None,
            repository_url: None,
            branch: None,
            auth_token: None,
            depth: None,
            keep_clone: false,
        }
    }
}

fn looks_like_url(source: &str) -> bool {
    source.contains("://") || source.starts_with("git@")
}

/// Drives one indexing run through the checkpoint phase state machine
/// (§4.5, §4.11): scan, incrementally plan, clean up deletions, parse,
/// resolve cross-file references, write the graph, run analytics, and save
/// index state. Resumes from the active checkpoint when one is found.
pub struct IndexOrchestrator {
    repository_store: Arc<dyn RepositoryStore>,
    index_state_repo: Arc<dyn IndexStateRepository>,
    checkpoint_repo: Arc<dyn CheckpointRepository>,
    graph_database: Arc<dyn GraphDatabase>,
    vcs_driver: Arc<dyn VcsDriver>,
    file_scanner: Arc<dyn FileScanner>,
    language_parser: Arc<dyn LanguageParser>,
    analytics: PostIndexAnalyticsUseCase,
}

impl IndexOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        repository_store: Arc<dyn RepositoryStore>,
        index_state_repo: Arc<dyn IndexStateRepository>,
        checkpoint_repo: Arc<dyn CheckpointRepository>,
        graph_database: Arc<dyn GraphDatabase>,
        vcs_driver: Arc<dyn VcsDriver>,
        file_scanner: Arc<dyn FileScanner>,
        language_parser: Arc<dyn LanguageParser>,
        native_pagerank_available: bool,
    ) -> Self {
        Self {
            repository_store,
            index_state_repo,
            checkpoint_repo,
            graph_database,
            vcs_driver,
            file_scanner,
            language_parser,
            analytics: PostIndexAnalyticsUseCase::new(native_pagerank_available),
        }
    }

    pub async fn execute(
        &self,
        source: &str,
        config: PipelineConfig,
        cancel: Arc<AtomicBool>,
    ) -> Result<Repository, IndexError> {
        let (local_path, temp_guard) = self.resolve_source(source, &config).await?;
        let repository = self.load_or_create_repository(&local_path, &config).await?;

        if config.reset_db {
            self.graph_database.reset_repository(repository.id()).await?;
            self.index_state_repo.delete(repository.id()).await?;
        }
        self.graph_database.apply_schema(config.update_schema).await?;

        let result = self.run_pipeline(&repository, &local_path, &config, &cancel).await;

        if let Some(guard) = temp_guard {
            if config.keep_clone {
                let _ = guard.into_path();
            }
            // otherwise `guard` drops here and removes the temp clone.
        }

        match result {
            Ok(()) => self
                .repository_store
                .find_by_id(repository.id())
                .await?
                .ok_or_else(|| IndexError::internal("repository not found after indexing")),
            Err(e) => {
                if let Ok(Some(mut checkpoint)) = self.checkpoint_repo.find_active(repository.id()).await {
                    checkpoint.fail(e.to_string());
                    let _ = self.checkpoint_repo.save(&checkpoint).await;
                }
                Err(e)
            }
        }
    }

    async fn resolve_source(
        &self,
        source: &str,
        config: &PipelineConfig,
    ) -> Result<(String, Option<TempDir>), IndexError> {
        if looks_like_url(source) {
            let temp_dir = tempfile::Builder::new().prefix("codegraph-indexer-").tempdir()?;
            let dest = temp_dir.path().to_string_lossy().to_string();
            let clone_options = CloneOptions {
                branch: config.branch.clone(),
                depth: config.depth,
                auth_token: config.auth_token.clone(),
            };
            self.vcs_driver.clone(source, &dest, &clone_options).await?;
            Ok((dest, Some(temp_dir)))
        } else {
            let canonical = Path::new(source)
                .canonicalize()
                .map_err(|e| IndexError::invalid_input(format!("invalid path '{source}': {e}")))?
                .to_string_lossy()
                .to_string();
            Ok((canonical, None))
        }
    }

    async fn load_or_create_repository(
        &self,
        local_path: &str,
        config: &PipelineConfig,
    ) -> Result<Repository, IndexError> {
        if let Some(existing) = self.repository_store.find_by_path(local_path).await? {
            return Ok(existing);
        }

        let name = config.repository_name.clone().unwrap_or_else(|| {
            Path::new(local_path)
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unknown")
                .to_string()
        });
        let id = config.repository_id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
        let now = current_timestamp();
        let repository = Repository::reconstitute(
            id,
            name,
            local_path.to_string(),
            config.repository_url.clone(),
            now,
            now,
            0,
            0,
            0,
        );
        self.repository_store.save(&repository).await?;
        Ok(repository)
    }

    async fn save_checkpoint_best_effort(&self, checkpoint: &ProcessingCheckpoint) {
        if let Err(e) = self.checkpoint_repo.save(checkpoint).await {
            warn!(error = %e, analysis_id = %checkpoint.analysis_id, "checkpoint write failed; continuing");
        }
    }

    async fn run_pipeline(
        &self,
        repository: &Repository,
        local_path: &str,
        config: &PipelineConfig,
        cancel: &Arc<AtomicBool>,
    ) -> Result<(), IndexError> {
        let repository_id = repository.id();

        let mut checkpoint = match self.checkpoint_repo.find_active(repository_id).await? {
            Some(existing) => {
                info!(
                    repository_id,
                    phase = existing.phase.as_str(),
                    "resuming indexing from active checkpoint"
                );
                existing
            }
            None => {
                let fresh = ProcessingCheckpoint::new(repository_id, false, config.force_full_reindex);
                self.save_checkpoint_best_effort(&fresh).await;
                fresh
            }
        };

        checkpoint.advance_phase(CheckpointPhase::Scanning);
        self.save_checkpoint_best_effort(&checkpoint).await;

        let scan_config = ScanConfig {
            supported_extensions: config.supported_extensions.clone(),
            ignore_patterns: config.ignore_patterns.clone(),
        };
        let scanned_files = self.file_scanner.scan(local_path, &scan_config).await?;
        checkpoint.total_files_discovered = scanned_files.len() as u64;

        checkpoint.advance_phase(CheckpointPhase::IncrementalCheck);
        let prior_state = self.index_state_repo.find_by_repository(repository_id).await?;
        let is_repo = self.vcs_driver.is_repo(local_path).await;
        let current_sha = if is_repo {
            self.vcs_driver.head_sha(local_path).await?
        } else {
            None
        };
        let vcs_diff = match (&prior_state, &current_sha) {
            (Some(prior), Some(sha)) if prior.last_commit_sha.as_deref() != Some(sha.as_str()) => {
                match &prior.last_commit_sha {
                    Some(from_sha) => Some(self.vcs_driver.diff(local_path, from_sha, Some(sha)).await?),
                    None => None,
                }
            }
            _ => None,
        };

        let planner = IncrementalPlannerUseCase::new();
        let plan = planner.plan(
            scanned_files,
            prior_state.as_ref(),
            current_sha.as_deref(),
            vcs_diff.as_ref(),
            config.force_full_reindex,
        );
        info!(
            repository_id,
            reason = %plan.reason,
            changed = plan.changed_files.len(),
            deleted = plan.deleted_files.len(),
            unchanged = plan.unchanged_files.len(),
            "incremental plan computed"
        );
        checkpoint.changed_files = plan.changed_files.iter().map(|f| f.path.clone()).collect();
        checkpoint.deleted_files = plan.deleted_files.clone();
        checkpoint.unchanged_files = plan.unchanged_files.iter().map(|f| f.path.clone()).collect();
        checkpoint.is_full_reindex = plan.is_full_reindex;
        self.save_checkpoint_best_effort(&checkpoint).await;

        // §4.4 cleanup: clear prior graph state for both deletions and
        // modifications (added files have none, so this is a no-op for them).
        let paths_to_clear: Vec<String> = plan
            .deleted_files
            .iter()
            .cloned()
            .chain(plan.changed_files.iter().map(|f| f.path.clone()))
            .collect();
        for path in &paths_to_clear {
            if cancel.load(Ordering::SeqCst) {
                break;
            }
            if let Err(e) = self.graph_database.delete_by_file_path(repository_id, path).await {
                warn!(path, error = %e, "cleanup failed for changed/deleted file; continuing");
            }
        }

        checkpoint.advance_phase(CheckpointPhase::Parsing);
        self.save_checkpoint_best_effort(&checkpoint).await;

        let files_to_parse: Vec<ScannedFile> = plan
            .changed_files
            .into_iter()
            .filter(|f| !checkpoint.is_file_already_processed(&f.path))
            .collect();

        let parser = self.language_parser.clone();
        let repo_root = Path::new(local_path).to_path_buf();
        let repo_id_owned = repository_id.to_string();
        let parse_concurrency = config.parse_concurrency;
        let parsed = tokio::task::spawn_blocking(move || {
            parse_files_concurrently(parser, &repo_root, &files_to_parse, &repo_id_owned, parse_concurrency)
        })
        .await
        .map_err(|e| IndexError::internal(format!("parse worker pool panicked: {e}")))?;

        let mut parse_output = ParseOutput::new();
        let mut new_hashes: Vec<(String, String)> = Vec::new();
        for (file, result) in parsed {
            if cancel.load(Ordering::SeqCst) {
                break;
            }
            match result {
                Ok(output) => {
                    new_hashes.push((file.path.clone(), file.content_hash.clone()));
                    parse_output.merge(output);
                }
                Err(e) => {
                    warn!(path = %file.path, error = %e, "parse failed; file marked failed and skipped");
                    checkpoint.mark_file_failed(file.path.clone());
                }
            }
        }

        checkpoint.advance_phase(CheckpointPhase::StoringNodes);
        self.save_checkpoint_best_effort(&checkpoint).await;

        let batch_size = config.storage_batch_size.max(1);
        let mut batch_index = 0u64;
        for chunk in parse_output.nodes.chunks(batch_size) {
            if cancel.load(Ordering::SeqCst) {
                break;
            }
            batch_index += 1;
            self.graph_database.save_nodes_batch(chunk).await?;
            let files_in_batch: Vec<String> = chunk
                .iter()
                .map(|n| n.file_path.clone())
                .collect::<HashSet<_>>()
                .into_iter()
                .collect();
            checkpoint.mark_batch_complete(batch_index, &files_in_batch, chunk.len() as u64, 0);
            self.save_checkpoint_best_effort(&checkpoint).await;
        }

        // Pass 2 (§4.7): resolve against the full node set now that this
        // run's nodes are committed alongside whatever was already there.
        let all_nodes = self.graph_database.load_nodes_for_repository(repository_id).await?;
        let resolver = CrossFileResolverUseCase::new(repository_id.to_string(), &all_nodes);
        let resolution = resolver.resolve_all(&parse_output.symbolic_edges);
        if !resolution.placeholder_nodes.is_empty() {
            self.graph_database.save_nodes_batch(&resolution.placeholder_nodes).await?;
        }

        checkpoint.advance_phase(CheckpointPhase::StoringRelationships);
        self.save_checkpoint_best_effort(&checkpoint).await;

        let mut all_edges = parse_output.edges;
        all_edges.extend(resolution.edges);
        for chunk in all_edges.chunks(batch_size) {
            if cancel.load(Ordering::SeqCst) {
                break;
            }
            batch_index += 1;
            self.graph_database.save_relationships_batch(chunk).await?;
            checkpoint.mark_batch_complete(batch_index, &[], 0, chunk.len() as u64);
            self.save_checkpoint_best_effort(&checkpoint).await;
        }

        checkpoint.advance_phase(CheckpointPhase::ComputingPagerank);
        self.save_checkpoint_best_effort(&checkpoint).await;

        let analytics_mode = if config.analytics_enabled {
            let nodes = self.graph_database.load_nodes_for_repository(repository_id).await?;
            let edges = self.graph_database.load_edges_for_repository(repository_id).await?;
            match self.analytics.run(&nodes, &edges) {
                Ok(result) => {
                    self.graph_database
                        .write_analytics_properties(&result.page_rank, &result.dependency_depth)
                        .await?;
                    result.mode.unwrap_or(AnalyticsMode::Disabled)
                }
                Err(e) => {
                    warn!(error = %e, "post-index analytics failed; continuing with empty results");
                    AnalyticsMode::Disabled
                }
            }
        } else {
            AnalyticsMode::Disabled
        };

        checkpoint.advance_phase(CheckpointPhase::SavingIndexState);
        self.save_checkpoint_best_effort(&checkpoint).await;

        let mut state = self
            .index_state_repo
            .find_by_repository(repository_id)
            .await?
            .unwrap_or_else(|| IndexState::new(repository_id, config.index_version));
        state.index_version = config.index_version;
        state.merge_hashes(new_hashes);
        state.remove_paths(&plan.deleted_files);
        state.last_commit_sha = current_sha;
        state.analytics_mode = analytics_mode;
        state.touch();
        self.index_state_repo.save(&state).await?;

        let node_count = self.graph_database.node_count(repository_id).await?;
        let edge_count = self.graph_database.edge_count(repository_id).await?;
        self.repository_store
            .update_stats(repository_id, node_count, edge_count, state.total_files_indexed)
            .await?;

        checkpoint.complete();
        if let Err(e) = self.checkpoint_repo.delete(&checkpoint.analysis_id).await {
            warn!(error = %e, "failed to delete completed checkpoint");
        }

        info!(
            repository_id,
            nodes = node_count,
            edges = edge_count,
            "indexing run complete"
        );

        Ok(())
    }
}

/// Parses changed files across a bounded `rayon` pool sized from
/// `parseConcurrency` (§5), one `block_on` call per worker thread since
/// [`LanguageParser`] is an async port.
fn parse_files_concurrently(
    parser: Arc<dyn LanguageParser>,
    repo_root: &Path,
    files: &[ScannedFile],
    repository_id: &str,
    parse_concurrency: usize,
) -> Vec<(ScannedFile, Result<ParseOutput, IndexError>)> {
    let handle = tokio::runtime::Handle::current();
    let run = |file: &ScannedFile| {
        let bytes = match std::fs::read(repo_root.join(&file.path)) {
            Ok(b) => b,
            Err(e) => return (file.clone(), Err(IndexError::IoError(e))),
        };
        let result = handle.block_on(parser.parse_file(&bytes, &file.path, file.language, repository_id));
        (file.clone(), result)
    };

    match rayon::ThreadPoolBuilder::new().num_threads(parse_concurrency.max(1)).build() {
        Ok(pool) => pool.install(|| files.par_iter().map(run).collect()),
        Err(e) => {
            warn!(error = %e, "failed to build dedicated parse pool; parsing sequentially");
            files.iter().map(run).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_config_defaults_match_spec() {
        let config = PipelineConfig::default();
        assert_eq!(config.storage_batch_size, 1000);
        assert_eq!(config.index_version, CURRENT_INDEX_VERSION);
        assert!(config.analytics_enabled);
        assert!(!config.force_full_reindex);
    }

    #[test]
    fn url_detection_recognizes_common_forms() {
        assert!(looks_like_url("https://example.com/acme.git"));
        assert!(looks_like_url("git@github.com:acme/repo.git"));
        assert!(!looks_like_url("/home/user/repo"));
        assert!(!looks_like_url("./relative/repo"));
    }
}
