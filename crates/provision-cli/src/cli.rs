//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use provision_core::CONFIG_FILENAME;

/// Provision - Run dependency-ordered setup manifests
#[derive(Parser, Debug)]
#[command(name = "provision")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the configuration file
    #[arg(long, global = true, env = "PROVISION_CONFIG", default_value = CONFIG_FILENAME)]
    pub config: PathBuf,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run every manifest in dependency order
    ///
    /// Stops at the first manifest that cannot run or fails.
    #[command(visible_alias = "r")]
    Run,

    /// Show the resolved execution order
    List {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_and_alias() {
        let cli = Cli::parse_from(["provision", "run"]);
        assert_eq!(cli.command, Some(Commands::Run));

        let cli = Cli::parse_from(["provision", "r"]);
        assert_eq!(cli.command, Some(Commands::Run));
    }

    #[test]
    fn test_run_takes_no_flags() {
        assert!(Cli::try_parse_from(["provision", "run", "--force"]).is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["provision", "list", "--json", "-v", "--config", "x.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("x.toml"));
        assert_eq!(cli.command, Some(Commands::List { json: true }));
    }

    #[test]
    fn test_no_command() {
        let cli = Cli::parse_from(["provision"]);
        assert!(cli.command.is_none());
    }
}
