//! List command implementation

use colored::Colorize;
use serde::Serialize;

use forge_core::Project;

use crate::error::Result;

#[derive(Serialize)]
struct BundleEntry<'a> {
    name: &'a str,
    version: &'a str,
    rules: usize,
}

/// Run the list command
pub fn run_list(project: &Project, json: bool) -> Result<()> {
    let manifest = project.manifest()?;
    let entries: Vec<BundleEntry<'_>> = manifest
        .bundles
        .iter()
        .map(|b| BundleEntry {
            name: &b.name,
            version: &b.version,
            rules: b.ownership.len(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No bundles installed.");
        return Ok(());
    }

    println!("{}", "Installed Bundles".bold());
    for entry in &entries {
        println!(
            "  {} {} {}",
            entry.name.cyan(),
            entry.version,
            format!("({} ownership rule(s))", entry.rules).dimmed()
        );
    }
    Ok(())
}
