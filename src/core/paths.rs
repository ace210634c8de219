//! Data directory layout
//!
//! ```text
//! <data_dir>/
//!   product_data.json   catalog (both families)
//!   logs/               rotating log files
//! ```

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::Config;

/// File name of the catalog inside the data directory
pub const CATALOG_FILE: &str = "product_data.json";

/// Log directory name inside the data directory
pub const LOG_DIR: &str = "logs";

#[derive(Debug, Error)]
pub enum PathError {
    #[error("no data directory available; pass --data-dir or set RJQ_DATA_DIR")]
    NoDataDir,
}

/// Resolved data directory
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Pick the data directory: explicit flag, then config, then platform default
    pub fn resolve(explicit: Option<&Path>, config: &Config) -> Result<Self, PathError> {
        let root = explicit
            .map(Path::to_path_buf)
            .or_else(|| config.data_dir.clone())
            .or_else(Self::platform_default)
            .ok_or(PathError::NoDataDir)?;
        Ok(Self { root })
    }

    /// Platform data directory (e.g. `~/.local/share/rjq`)
    pub fn platform_default() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "rjq").map(|dirs| dirs.data_dir().to_path_buf())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.root.join(CATALOG_FILE)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.root.join(LOG_DIR)
    }
}
