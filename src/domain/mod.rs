//! # Domain Layer
//!
//! Core business models and the identity/IR scheme they share. This layer is
//! independent of external frameworks and infrastructure — no tree-sitter,
//! no DuckDB, no git2 types appear here.

mod error;
pub mod models;

pub use error::*;
pub use models::*;
