//! Where the daemon keeps its files

use std::fs;
use std::path::PathBuf;

use crate::error::DaemonError;

#[derive(Debug, Clone)]
pub struct AppPaths {
    data_dir: PathBuf,
}

impl AppPaths {
    pub fn new() -> Result<Self, DaemonError> {
        let base = dirs::data_dir().ok_or(DaemonError::NoDataDir)?;
        Self::at(base.join("arcade"))
    }

    /// Use an explicit directory, creating it if needed.
    pub fn at(data_dir: PathBuf) -> Result<Self, DaemonError> {
        fs::create_dir_all(&data_dir).map_err(|source| DaemonError::DataDir {
            path: data_dir.clone(),
            source,
        })?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    /// Discoveries and high scores.
    pub fn progress_file(&self) -> PathBuf {
        self.data_dir.join("progress.json")
    }

    pub fn config_file(&self) -> PathBuf {
        self.data_dir.join("config.json")
    }
}
