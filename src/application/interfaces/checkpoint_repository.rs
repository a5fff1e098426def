use async_trait::async_trait;

use crate::domain::{IndexError, ProcessingCheckpoint};

/// Durable checkpoint storage (§4.5). Writes are best-effort: a failed
/// checkpoint write must never abort a run, so callers should log and
/// continue rather than propagate `CheckpointError` upward from within a
/// batch loop.
#[async_trait]
pub trait CheckpointRepository: Send + Sync {
    /// The checkpoint for this repository if one exists and has not reached
    /// a terminal phase (`completed`/`failed`).
    async fn find_active(&self, repository_id: &str) -> Result<Option<ProcessingCheckpoint>, IndexError>;

    /// The most recent checkpoint regardless of phase, used by `resume` and
    /// `status` to inspect a retained failed run.
    async fn find_latest(&self, repository_id: &str) -> Result<Option<ProcessingCheckpoint>, IndexError>;

    async fn save(&self, checkpoint: &ProcessingCheckpoint) -> Result<(), IndexError>;

    /// Deletes the checkpoint. Called after `phase` is set to `completed`.
    async fn delete(&self, analysis_id: &str) -> Result<(), IndexError>;
}
