use thiserror::Error;

/// Error kinds surfaced by the indexing pipeline.
///
/// Every component-local failure (parse, write, schema, checkpoint,
/// analytics, VCS) funnels into one of these variants so the orchestrator
/// can apply a single, typed error policy instead of matching on strings.
#[derive(Debug, Error)]
pub enum IndexError {
    /// A single file failed to parse. Never fatal: the file is added to
    /// `filesFailed` and the run continues.
    #[error("parse error in {file_path}: {message}")]
    ParseError { file_path: String, message: String },

    /// A batch write to the graph database failed. Fatal after retries are
    /// exhausted, except during best-effort cleanup.
    #[error("graph write error (batch {batch_index}): {message}")]
    GraphWriteError {
        batch_index: usize,
        message: String,
        /// A small sample of the offending entity ids, for diagnostics.
        sample: Vec<String>,
    },

    /// Schema application failed for a reason other than "already exists".
    #[error("schema error: {0}")]
    SchemaError(String),

    /// A checkpoint read/write failed. Never fatal; logged and ignored.
    #[error("checkpoint error: {0}")]
    CheckpointError(String),

    /// Post-index analytics failed. Never fatal; callers get an empty result.
    #[error("analytics error: {0}")]
    AnalyticsError(String),

    /// The VCS driver failed or the directory is not a repository. Callers
    /// fall back to hash-only incremental planning.
    #[error("vcs error: {0}")]
    VcsError(String),

    /// The run was cancelled cooperatively. Fatal: the orchestrator writes a
    /// `failed` checkpoint phase and returns.
    #[error("run cancelled")]
    Cancelled,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IndexError {
    pub fn parse(file_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            file_path: file_path.into(),
            message: message.into(),
        }
    }

    pub fn graph_write(batch_index: usize, message: impl Into<String>, sample: Vec<String>) -> Self {
        Self::GraphWriteError {
            batch_index,
            message: message.into(),
            sample,
        }
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        Self::SchemaError(msg.into())
    }

    pub fn checkpoint(msg: impl Into<String>) -> Self {
        Self::CheckpointError(msg.into())
    }

    pub fn analytics(msg: impl Into<String>) -> Self {
        Self::AnalyticsError(msg.into())
    }

    pub fn vcs(msg: impl Into<String>) -> Self {
        Self::VcsError(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn already_exists(msg: impl Into<String>) -> Self {
        Self::AlreadyExists(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }

    /// Errors classified as "never fatal" — the caller should log and
    /// continue rather than propagate.
    pub fn is_never_fatal(&self) -> bool {
        matches!(
            self,
            Self::CheckpointError(_) | Self::AnalyticsError(_) | Self::VcsError(_)
        )
    }
}
