//! The list command

use std::path::Path;

use colored::Colorize;
use provision_core::ManifestInfo;

use crate::error::Result;

/// Run the list command
pub fn run_list(config_path: &Path, json: bool) -> Result<()> {
    let mut provisioner = super::load_provisioner(config_path)?;
    let resolution = provisioner.resolution()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&resolution.summaries())?);
        return Ok(());
    }

    println!("{}", "Execution Order".bold());
    println!();

    if resolution.is_empty() {
        println!("  {}", "No manifests declared".dimmed());
        return Ok(());
    }

    for manifest in resolution.ordered() {
        println!(
            "  {:>3}  {:<32} {}",
            manifest.weight,
            manifest.key.id(),
            status(manifest)
        );
    }

    let blocked = resolution.ordered().filter(|m| !m.applicable).count();
    println!();
    println!(
        "{} {} manifest(s), {} blocked.",
        "Total:".dimmed(),
        resolution.len(),
        blocked
    );
    Ok(())
}

fn status(manifest: &ManifestInfo) -> String {
    if manifest.applicable {
        "ready".green().to_string()
    } else if manifest.is_stub {
        "missing".red().to_string()
    } else if !manifest.blocked_by.is_empty() {
        let blockers: Vec<String> = manifest.blocked_by.iter().map(|k| k.id()).collect();
        format!("{} by {}", "blocked".yellow(), blockers.join(", "))
    } else {
        "not applicable".yellow().to_string()
    }
}
