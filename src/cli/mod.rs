use clap::{Parser, Subcommand};

/// CodeGraph Indexer — turns a source repository into a code knowledge graph.
#[derive(Parser)]
#[command(name = "codegraph-indexer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the data directory holding the DuckDB database
    #[arg(short, long, global = true, default_value = "~/.codegraph-indexer")]
    pub data_dir: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Index a repository (local path or clone URL)
    Index {
        /// Path or clone URL of the repository to index
        source: String,

        /// Optional name for the repository
        #[arg(short, long)]
        name: Option<String>,

        /// Ignore cached file hashes and reprocess every file
        #[arg(short, long)]
        force: bool,

        /// Detach-delete all data for this repository before indexing
        #[arg(long)]
        reset_db: bool,

        /// Reapply the graph schema before indexing
        #[arg(long)]
        update_schema: bool,

        /// Skip post-index PageRank/dependency-depth analytics
        #[arg(long)]
        no_analytics: bool,

        /// Branch to check out when cloning a remote URL
        #[arg(long)]
        branch: Option<String>,

        /// Auth token for cloning a private remote URL
        #[arg(long)]
        auth_token: Option<String>,

        /// Shallow-clone depth when cloning a remote URL
        #[arg(long)]
        depth: Option<u32>,

        /// Keep the temporary clone directory instead of deleting it after the run
        #[arg(long)]
        keep_clone: bool,
    },

    /// Resume a retained non-terminal checkpoint for a repository
    Resume {
        /// Repository ID or path
        id_or_path: String,
    },

    /// Show indexing phase, percent-complete, and last error for a repository
    Status {
        /// Repository ID or path
        id_or_path: String,
    },

    /// List indexed repositories
    List,

    /// Delete an indexed repository and all of its graph data
    Delete {
        /// Repository ID or path to delete
        id_or_path: String,
    },

    /// Detach-delete all graph data for a repository without removing its record
    Reset {
        /// Repository ID or path
        id_or_path: String,
    },
}
