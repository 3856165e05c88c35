use anyhow::Context;
use dia_config::DialectusConfig;
use dia_db::TranscriptStore;

use crate::cli::GlobalFlags;

/// Layered config plus `.env` from the working directory.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<DialectusConfig> {
    DialectusConfig::load_with_dotenv(flags.config.as_deref()).context("failed to load configuration")
}

pub async fn open_store(config: &DialectusConfig) -> anyhow::Result<TranscriptStore> {
    let path = &config.storage.database_path;
    TranscriptStore::open(path)
        .await
        .with_context(|| format!("failed to open transcript store at {}", path.display()))
}
