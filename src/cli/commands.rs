//! CLI subcommand definitions

use clap::Subcommand;

/// Main CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Subcommand)]
pub(crate) enum Commands {
    /// Today, this week and this month, plus today's models and sessions (default)
    #[default]
    Summary,
    /// Today's usage by model
    Models,
    /// Today's usage by session
    Sessions,
    /// Output single line for statusline/tmux integration
    Statusline,
}
