use crate::bootstrap;
use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, flags: &GlobalFlags) -> anyhow::Result<()> {
    let config = bootstrap::load_config(flags)?;
    match command {
        Commands::Debate(args) => commands::debate::handle(&args, config, flags).await,
        Commands::Transcripts(args) => commands::transcripts::handle(&args, &config, flags).await,
        Commands::Show(args) => commands::show::handle(&args, &config, flags).await,
    }
}
