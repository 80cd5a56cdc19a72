//! Remove command implementation

use colored::Colorize;

use forge_core::{KeepReason, Project, RemoveOptions};

use crate::error::Result;

/// Run the remove command
pub fn run_remove(project: &Project, bundle: &str, options: RemoveOptions) -> Result<()> {
    let report = project.remove(bundle, options)?;

    if report.dry_run {
        println!("{}", "[dry-run] Nothing was changed.".yellow());
    }

    if !report.available {
        println!(
            "{} Bundle {} not found in any source, its files were left in place",
            "WARN".yellow().bold(),
            bundle.cyan()
        );
    }

    for path in &report.removed {
        println!("  {} {}", "-".red(), path.red());
    }
    for (path, reason) in &report.kept {
        match reason {
            KeepReason::Failed { .. } => {
                println!("  {} {}: {}", "!".yellow(), path.cyan(), reason)
            }
            _ => println!("  {} {} {}", "=".dimmed(), path, format!("({})", reason).dimmed()),
        }
    }

    if !report.dry_run {
        println!(
            "{} Removed {} ({} file(s) deleted)",
            "OK".green().bold(),
            bundle.cyan(),
            report.removed.len()
        );
    }
    Ok(())
}
