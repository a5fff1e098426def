//! # CodeGraph Indexer
//!
//! An incremental, checkpointed pipeline that turns a source repository into
//! a code knowledge graph: a property graph of files, types, functions,
//! entry points, SQL statements, UI routes, tests, and the edges between
//! them, kept current by re-running only over what changed since the last
//! run.
//!
//! ## Architecture
//!
//! The crate is organized following Domain-Driven Design principles:
//!
//! - `domain`: Core business models (nodes, edges, checkpoints, index state)
//!   and the identity scheme they share. No framework or infrastructure
//!   dependencies live here.
//! - `application`: Port traits (`interfaces`) the pipeline depends on, and
//!   the use cases (`use_cases`) that orchestrate them — scanning,
//!   incremental planning, parsing fan-out, cross-file resolution, post-index
//!   analytics, and the top-level orchestrator.
//! - `connector`: Concrete adapters implementing those ports — DuckDB-backed
//!   storage, a `git2` VCS driver, an `ignore`-based file scanner, and the
//!   tree-sitter parser facade with its specialized extractors.

pub mod application;
pub mod connector;
pub mod domain;

pub use application::*;
pub use connector::*;
pub use domain::*;
