//! Provision CLI
//!
//! Runs the manifests declared by the configured providers in dependency
//! order.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    match cli.command {
        Some(Commands::Run) => commands::run_manifests(&cli.config),
        Some(Commands::List { json }) => commands::run_list(&cli.config, json),
        None => {
            println!("{} Dependency-ordered setup manifests", "provision".green().bold());
            println!();
            println!("Run {} for available commands.", "provision --help".cyan());
            Ok(())
        }
    }
}
