use std::path::PathBuf;

use thiserror::Error;

/// Startup failures. Once serving, per-request problems become `Error` responses.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("could not determine data directory")]
    NoDataDir,

    #[error("failed to create data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid {name}={value:?}")]
    Env { name: &'static str, value: String },
}
