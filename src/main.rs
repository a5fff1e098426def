//! CodeGraph Indexer CLI.

mod cli;

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use codegraph_indexer::{
    CheckpointRepository, DeleteRepositoryUseCase, DuckdbCheckpointRepository,
    DuckdbGraphDatabase, DuckdbIndexStateRepository, DuckdbRepositoryStore, Git2VcsDriver,
    GraphDatabase, IgnoreFileScanner, IndexOrchestrator, ListRepositoriesUseCase, PipelineConfig,
    Repository, RepositoryStore, TreeSitterParser,
};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let data_dir = expand_tilde(&cli.data_dir);
    std::fs::create_dir_all(&data_dir)?;
    let db_path = PathBuf::from(&data_dir).join("codegraph.duckdb");

    let repository_store = Arc::new(DuckdbRepositoryStore::new(&db_path)?);
    let shared_conn = repository_store.shared_connection();
    let checkpoint_repo = Arc::new(DuckdbCheckpointRepository::with_connection(shared_conn.clone()));
    let index_state_repo = Arc::new(DuckdbIndexStateRepository::with_connection(shared_conn.clone()));
    let graph_database = Arc::new(DuckdbGraphDatabase::with_connection(shared_conn));
    let vcs_driver = Arc::new(Git2VcsDriver::new());
    let file_scanner = Arc::new(IgnoreFileScanner::new());
    let language_parser = Arc::new(TreeSitterParser::new());

    let orchestrator = IndexOrchestrator::new(
        repository_store.clone(),
        index_state_repo,
        checkpoint_repo.clone(),
        graph_database.clone(),
        vcs_driver,
        file_scanner,
        language_parser,
        false,
    );
    let list_use_case = ListRepositoriesUseCase::new(repository_store.clone());
    let delete_use_case = DeleteRepositoryUseCase::new(repository_store.clone(), graph_database.clone());

    match cli.command {
        Commands::Index {
            source,
            name,
            force,
            reset_db,
            update_schema,
            no_analytics,
            branch,
            auth_token,
            depth,
            keep_clone,
        } => {
            let config = PipelineConfig {
                repository_name: name,
                force_full_reindex: force,
                reset_db,
                update_schema,
                analytics_enabled: !no_analytics,
                branch,
                auth_token,
                depth,
                keep_clone,
                ..Default::default()
            };

            info!("indexing {}", source);
            let cancel = Arc::new(AtomicBool::new(false));
            let repo = orchestrator.execute(&source, config, cancel).await?;
            println!(
                "Indexed {} ({} nodes, {} edges, {} files)",
                repo.name(),
                repo.node_count(),
                repo.edge_count(),
                repo.file_count()
            );
        }

        Commands::Resume { id_or_path } => {
            let repo = resolve_repository(&list_use_case, &id_or_path).await?;
            info!("resuming {}", repo.path());
            let config = PipelineConfig::default();
            let cancel = Arc::new(AtomicBool::new(false));
            let repo = orchestrator.execute(repo.path(), config, cancel).await?;
            println!(
                "Resumed {} ({} nodes, {} edges, {} files)",
                repo.name(),
                repo.node_count(),
                repo.edge_count(),
                repo.file_count()
            );
        }

        Commands::Status { id_or_path } => {
            let repo = resolve_repository(&list_use_case, &id_or_path).await?;
            match checkpoint_repo.find_latest(repo.id()).await? {
                Some(checkpoint) => {
                    println!("Repository:  {} ({})", repo.name(), repo.id());
                    println!("Phase:       {}", checkpoint.phase.as_str());
                    println!("Progress:    {}%", checkpoint.percent_complete());
                    println!("Files done:  {}", checkpoint.files_processed.len());
                    println!("Files failed:{}", checkpoint.files_failed.len());
                    if let Some(err) = &checkpoint.last_error {
                        println!("Last error:  {err}");
                    }
                }
                None => {
                    println!("Repository:  {} ({})", repo.name(), repo.id());
                    println!("No checkpoint on record — not yet indexed or fully completed and cleared.");
                }
            }
        }

        Commands::List => {
            let repos = list_use_case.execute().await?;
            if repos.is_empty() {
                println!("No repositories indexed.");
            } else {
                println!("Indexed repositories:\n");
                for repo in repos {
                    println!("  {} ({})", repo.name(), repo.id());
                    println!("    Path:  {}", repo.path());
                    println!("    Nodes: {}, Edges: {}, Files: {}", repo.node_count(), repo.edge_count(), repo.file_count());
                    println!();
                }
            }
        }

        Commands::Delete { id_or_path } => {
            let repo = resolve_repository(&list_use_case, &id_or_path).await?;
            delete_use_case.execute(repo.id()).await?;
            println!("Deleted repository {} ({})", repo.name(), repo.id());
        }

        Commands::Reset { id_or_path } => {
            let repo = resolve_repository(&list_use_case, &id_or_path).await?;
            graph_database.reset_repository(repo.id()).await?;
            repository_store.update_stats(repo.id(), 0, 0, 0).await?;
            println!("Reset graph data for {} ({})", repo.name(), repo.id());
        }
    }

    Ok(())
}

async fn resolve_repository(list_use_case: &ListRepositoriesUseCase, id_or_path: &str) -> Result<Repository> {
    if let Some(repo) = list_use_case.get_by_id(id_or_path).await? {
        return Ok(repo);
    }
    list_use_case
        .get_by_path(id_or_path)
        .await?
        .ok_or_else(|| anyhow!("no repository found for '{id_or_path}'"))
}

/// Expand ~ to home directory.
fn expand_tilde(path: &str) -> String {
    if path.starts_with("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return path.replacen("~", &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}
