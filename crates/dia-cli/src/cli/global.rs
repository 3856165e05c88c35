use std::path::PathBuf;

use clap::ValueEnum;

/// How command results are written to stdout.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Global flags available before or after subcommands.
#[derive(Clone, Debug)]
pub struct GlobalFlags {
    pub output: OutputFormat,
    pub quiet: bool,
    pub verbose: bool,
    pub config: Option<PathBuf>,
}

impl GlobalFlags {
    /// Whether live progress belongs on the terminal.
    #[must_use]
    pub fn is_live_text(&self) -> bool {
        self.output == OutputFormat::Text && !self.quiet
    }
}
