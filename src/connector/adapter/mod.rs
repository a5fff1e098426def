pub mod extractors;

mod duckdb_checkpoint_repository;
mod duckdb_graph_database;
mod duckdb_index_state_repository;
mod duckdb_repository_store;
mod git2_vcs_driver;
mod ignore_file_scanner;
mod treesitter_parser;

pub use duckdb_checkpoint_repository::*;
pub use duckdb_graph_database::*;
pub use duckdb_index_state_repository::*;
pub use duckdb_repository_store::*;
pub use git2_vcs_driver::*;
pub use ignore_file_scanner::*;
pub use treesitter_parser::*;
