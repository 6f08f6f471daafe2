//! CLI subcommand definitions

use clap::Subcommand;

/// Main CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub(crate) enum Commands {
    /// List sessions, newest first with forks grouped (default)
    List,
    /// Show the data directories each source reads
    Sources,
}

impl Commands {
    /// Command to run when none was given
    pub(crate) fn or_default(command: Option<Commands>) -> Commands {
        command.unwrap_or(Commands::List)
    }
}
