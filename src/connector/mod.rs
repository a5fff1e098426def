//! # Connector Layer
//!
//! Concrete adapters implementing the application layer's port traits:
//! DuckDB-backed graph/checkpoint/index-state/repository stores, a
//! `git2`-based VCS driver, an `ignore`-based file scanner, and the
//! tree-sitter parser facade plus its specialized extractors.

pub mod adapter;

pub use adapter::*;
