//! Init command implementation

use colored::Colorize;

use forge_core::{InitOptions, Project};

use crate::error::Result;

/// Run the init command
pub fn run_init(project: &Project, options: InitOptions) -> Result<()> {
    let report = project.init(options)?;

    for path in &report.created {
        println!("  {} {}", "+".green(), path.green());
    }
    for path in &report.skipped {
        println!("  {} {} {}", "=".dimmed(), path.dimmed(), "(already exists)".dimmed());
    }

    println!(
        "{} Initialized {}",
        "OK".green().bold(),
        report.manifest_path.display().to_string().yellow()
    );
    println!("Run {} to add a bundle.", "forge install <bundle>".cyan());
    Ok(())
}
