//! Pipeline error types.

use thiserror::Error;

use rally_db::DbError;

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Terminal failures of one pipeline invocation.
///
/// No variant is retried automatically; each carries a distinguishing reason
/// for the caller. A storage conflict never surfaces here: `analyze` resolves
/// it by returning the winning record.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No frames extracted from video")]
    NoFramesExtracted,

    #[error("Detection failed: {0}")]
    Detection(String),

    #[error("Storage error: {0}")]
    Storage(DbError),
}
