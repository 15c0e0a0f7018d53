use thiserror::Error;

/// Failures at the durable key/value seam.
///
/// These never reach a game session: [`crate::progress::Progress`] absorbs
/// them and falls back to memory-only bookkeeping.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored value is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Requests the arcade refuses.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArcadeError {
    #[error("game {0} has not been discovered")]
    Locked(String),

    #[error("collectible {0} has not been discovered")]
    Hidden(String),

    #[error("no game is open")]
    NoSession,
}
