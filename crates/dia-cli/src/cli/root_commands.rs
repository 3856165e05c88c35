use clap::{Args, Subcommand};
use dia_core::enums::DebateFormat;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Run a judged debate session on the configured engine.
    Debate(DebateArgs),
    /// List stored transcripts, newest first.
    Transcripts(TranscriptsArgs),
    /// Show one stored transcript with its judging result.
    Show(ShowArgs),
}

#[derive(Clone, Debug, Args)]
pub struct DebateArgs {
    /// Debate topic (overrides `debate.topic`)
    #[arg(short, long)]
    pub topic: Option<String>,

    /// Debate format: oxford, parliamentary, socratic, public_forum
    #[arg(short, long)]
    pub format: Option<DebateFormat>,

    /// Start without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Clone, Debug, Args)]
pub struct TranscriptsArgs {
    /// Max sessions to list
    #[arg(short, long, default_value_t = 20)]
    pub limit: u32,

    /// Sessions to skip
    #[arg(long, default_value_t = 0)]
    pub offset: u32,
}

#[derive(Clone, Debug, Args)]
pub struct ShowArgs {
    /// Session id as printed by `dia transcripts`
    pub id: i64,
}
