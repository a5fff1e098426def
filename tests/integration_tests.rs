//! End-to-end tests driving `IndexOrchestrator` against real adapters.
//!
//! Each test builds a scratch git repository on disk, indexes it through the
//! full pipeline (scan -> parse -> graph write -> checkpoint), and asserts on
//! the resulting `Repository` stats and graph contents.

use std::fs;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use codegraph_indexer::{
    CheckpointRepository, DuckdbCheckpointRepository, DuckdbGraphDatabase,
    DuckdbIndexStateRepository, DuckdbRepositoryStore, Git2VcsDriver, GraphDatabase,
    IgnoreFileScanner, IndexOrchestrator, Language, PipelineConfig, TreeSitterParser,
};
use tempfile::tempdir;

fn init_repo(dir: &std::path::Path) {
    let repo = git2::Repository::init(dir).expect("git init");
    let mut index = repo.index().expect("index");
    index
        .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
        .expect("add_all");
    index.write().expect("write index");
    let tree_id = index.write_tree().expect("write_tree");
    let tree = repo.find_tree(tree_id).expect("find_tree");
    let sig = git2::Signature::now("test", "test@example.com").expect("signature");
    repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
        .expect("commit");
}

struct Harness {
    data_dir: tempfile::TempDir,
    orchestrator: IndexOrchestrator,
    graph_database: Arc<DuckdbGraphDatabase>,
    checkpoint_repo: Arc<DuckdbCheckpointRepository>,
}

fn build_harness() -> Harness {
    let data_dir = tempdir().expect("data tempdir");
    let db_path = data_dir.path().join("codegraph.duckdb");

    let repository_store = Arc::new(DuckdbRepositoryStore::new(&db_path).expect("store init"));
    let shared_conn = repository_store.shared_connection();
    let checkpoint_repo = Arc::new(DuckdbCheckpointRepository::with_connection(shared_conn.clone()));
    let index_state_repo = Arc::new(DuckdbIndexStateRepository::with_connection(shared_conn.clone()));
    let graph_database = Arc::new(DuckdbGraphDatabase::with_connection(shared_conn));
    let vcs_driver = Arc::new(Git2VcsDriver::new());
    let file_scanner = Arc::new(IgnoreFileScanner::new());
    let language_parser = Arc::new(TreeSitterParser::new());

    let orchestrator = IndexOrchestrator::new(
        repository_store,
        index_state_repo,
        checkpoint_repo.clone(),
        graph_database.clone(),
        vcs_driver,
        file_scanner,
        language_parser,
        false,
    );

    Harness {
        data_dir,
        orchestrator,
        graph_database,
        checkpoint_repo,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn full_reindex_populates_graph_and_clears_checkpoint() {
    let harness = build_harness();
    let source = tempdir().expect("source tempdir");
    fs::write(
        source.path().join("lib.rs"),
        "pub fn add(a: i32, b: i32) -> i32 { a + b }\n",
    )
    .unwrap();
    init_repo(source.path());

    let repo = harness
        .orchestrator
        .execute(
            source.path().to_str().unwrap(),
            PipelineConfig::default(),
            Arc::new(AtomicBool::new(false)),
        )
        .await
        .expect("index run");

    assert!(repo.node_count() > 0, "expected at least one node for lib.rs");
    assert_eq!(repo.file_count(), 1);

    let node_count = harness
        .graph_database
        .node_count(repo.id())
        .await
        .expect("node_count");
    assert!(node_count > 0);

    let checkpoint = harness
        .checkpoint_repo
        .find_latest(repo.id())
        .await
        .expect("find_latest");
    assert!(checkpoint.is_none(), "completed runs should clear their checkpoint");

    drop(harness.data_dir);
}

#[tokio::test(flavor = "multi_thread")]
async fn incremental_reindex_only_touches_changed_files() {
    let harness = build_harness();
    let source = tempdir().expect("source tempdir");
    fs::write(source.path().join("a.rs"), "pub fn a() {}\n").unwrap();
    fs::write(source.path().join("b.rs"), "pub fn b() {}\n").unwrap();
    init_repo(source.path());

    let first = harness
        .orchestrator
        .execute(
            source.path().to_str().unwrap(),
            PipelineConfig::default(),
            Arc::new(AtomicBool::new(false)),
        )
        .await
        .expect("first index run");
    let first_nodes = first.node_count();

    fs::write(source.path().join("a.rs"), "pub fn a() { /* changed */ }\n").unwrap();
    {
        let repo = git2::Repository::open(source.path()).unwrap();
        let mut index = repo.index().unwrap();
        index.add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = git2::Signature::now("test", "test@example.com").unwrap();
        let parent = repo.head().unwrap().peel_to_commit().unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "update a", &tree, &[&parent])
            .unwrap();
    }

    let second = harness
        .orchestrator
        .execute(
            source.path().to_str().unwrap(),
            PipelineConfig::default(),
            Arc::new(AtomicBool::new(false)),
        )
        .await
        .expect("incremental index run");

    assert_eq!(second.id(), first.id(), "same path should resolve to the same repository");
    assert_eq!(second.node_count(), first_nodes, "unchanged b.rs keeps its node count stable");

    drop(harness.data_dir);
}

#[tokio::test]
async fn parser_extracts_rust_functions_from_fixture_file() {
    let parser = TreeSitterParser::new();
    let content = fs::read("tests/fixtures/sample_rust.rs").expect("read fixture");

    let output = parser
        .parse_file(&content, "sample_rust.rs", Language::Rust, "test-repo")
        .await
        .expect("parse_file");

    assert!(!output.nodes.is_empty(), "should extract at least one node from the fixture");
}

#[tokio::test]
async fn language_detection_matches_common_extensions() {
    use std::path::Path;

    assert_eq!(Language::from_path(Path::new("main.rs")), Language::Rust);
    assert_eq!(Language::from_path(Path::new("app.py")), Language::Python);
    assert_eq!(Language::from_path(Path::new("index.js")), Language::JavaScript);
    assert_eq!(Language::from_path(Path::new("app.tsx")), Language::TypeScript);
    assert_eq!(Language::from_path(Path::new("main.go")), Language::Go);
    assert_eq!(Language::from_path(Path::new("readme.md")), Language::Unknown);
}
