//! The run command

use std::path::Path;

use colored::Colorize;
use provision_core::{Error, ManifestInfo, RunListener, TaskOutcome};

use crate::error::Result;

/// Prints one line as each manifest starts, succeeds or fails.
#[derive(Debug, Default)]
pub struct ConsoleListener {
    total: usize,
    position: usize,
    applied: usize,
}

impl ConsoleListener {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }
}

fn failure_label(error: &Error) -> &'static str {
    match error {
        Error::MissingManifest { .. } => "missing",
        Error::UnresolvedDependency { .. } => "blocked",
        Error::InapplicableUnspecified { .. } => "not applicable",
        _ => "failed",
    }
}

impl RunListener for ConsoleListener {
    fn on_start(&mut self, manifest: &ManifestInfo) {
        self.position += 1;
        println!(
            "{} {} {}",
            format!("[{}/{}]", self.position, self.total).dimmed(),
            "Running".cyan(),
            manifest.key.id()
        );
    }

    fn on_success(&mut self, manifest: &ManifestInfo, _outcome: &TaskOutcome) {
        self.applied += 1;
        println!("  {} {}", "✓".green(), manifest.key.id());
    }

    fn on_failure(&mut self, manifest: &ManifestInfo, error: &Error) {
        println!(
            "  {} {} ({})",
            "✗".red(),
            manifest.key.id(),
            failure_label(error).red()
        );
    }

    fn on_blocked(&mut self, manifest: &ManifestInfo, error: &Error) {
        println!(
            "{} {} is {}; nothing was run",
            "Blocked:".yellow().bold(),
            manifest.key.id(),
            failure_label(error).red()
        );
    }
}

/// Run the run command
pub fn run_manifests(config_path: &Path) -> Result<()> {
    let mut provisioner = super::load_provisioner(config_path)?;
    let total = provisioner.resolution()?.len();

    let mut listener = ConsoleListener::new(total);
    let report = match provisioner.run(&mut listener) {
        Ok(report) => report,
        Err(error) if error.is_run_failure() => {
            println!();
            println!(
                "{} {} of {} manifest(s) applied before the run stopped.",
                "Aborted:".red().bold(),
                listener.applied,
                total
            );
            return Err(error.into());
        }
        Err(error) => return Err(error.into()),
    };

    println!();
    println!(
        "{} {} manifest(s) applied.",
        "Success:".green().bold(),
        report.len()
    );
    Ok(())
}
