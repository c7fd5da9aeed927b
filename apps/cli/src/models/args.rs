//! # CLI Argument Definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "cohort")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Divide a group into subgroups through the division engine")]
pub struct Cli {
    /// Client configuration file (`base_url`, `group_id`, `timeout_seconds`)
    #[arg(short, long, global = true, default_value = "cohort.toml")]
    pub config: PathBuf,

    /// Override the engine base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Override the parent group id
    #[arg(short, long, global = true)]
    pub group: Option<u64>,

    #[command(subcommand)]
    pub command: AppCommands,
}

#[derive(Debug, Subcommand)]
pub enum AppCommands {
    /// Generate a division from a plan and decide on the preview interactively
    Divide {
        /// TOML plan with the top-level parameters and category rules
        #[arg(short, long)]
        plan: PathBuf,
    },
    /// Revert the most recently confirmed division
    Undo {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// List persisted subgroups
    List {},
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_overrides_follow_the_subcommand() {
        let cli = Cli::try_parse_from(["cohort", "undo", "--yes", "--group", "7"]).unwrap();
        assert_eq!(cli.group, Some(7));
        assert!(matches!(cli.command, AppCommands::Undo { yes: true }));
    }
}
