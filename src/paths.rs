use std::path::PathBuf;

use anyhow::{anyhow, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".inventory-manager";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "inventory.db";
const SETTINGS_FILE_NAME: &str = "config.toml";
const LOG_FILE_NAME: &str = "inventory.log";

/// Fixed locations of every file the application touches.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub database: PathBuf,
    pub settings: PathBuf,
    pub log: PathBuf,
}

impl AppPaths {
    /// Resolve all paths inside the user's home directory.
    pub fn resolve() -> Result<Self> {
        let base_dirs =
            BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
        Ok(Self::in_dir(base_dirs.home_dir().join(DATA_DIR_NAME)))
    }

    /// Lay the files out inside an explicit directory.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            database: dir.join(DB_FILE_NAME),
            settings: dir.join(SETTINGS_FILE_NAME),
            log: dir.join(LOG_FILE_NAME),
        }
    }
}
