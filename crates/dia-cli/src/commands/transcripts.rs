use dia_config::DialectusConfig;

use crate::bootstrap;
use crate::cli::GlobalFlags;
use crate::cli::root_commands::TranscriptsArgs;
use crate::output::{output, text};

/// Handle `dia transcripts`.
pub async fn handle(
    args: &TranscriptsArgs,
    config: &DialectusConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let store = bootstrap::open_store(config).await?;
    let sessions = store.list_sessions(args.limit, args.offset).await?;
    output(&sessions, flags.output, |sessions| text::listing(sessions))
}
