//! Transcript database location.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_database_path() -> PathBuf {
    dirs::home_dir().map_or_else(
        || PathBuf::from("debates.db"),
        |home| home.join(".dialectus").join("debates.db"),
    )
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}
