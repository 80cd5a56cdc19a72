//! Diff command implementation
//!
//! Read-only: compares installed bundles with the project files.

use colored::Colorize;

use forge_core::{BundleDiff, DiffResult, DiffStatus, Project};
use forge_fs::short_checksum;

use crate::cli::DiffFormat;
use crate::error::Result;

/// Run the diff command
pub fn run_diff(project: &Project, bundle: Option<&str>, format: DiffFormat) -> Result<()> {
    let report = project.diff(bundle)?;

    if format == DiffFormat::Json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.bundles.is_empty() {
        println!("No bundles installed.");
        return Ok(());
    }

    for bundle in &report.bundles {
        print_summary(bundle);
        if format == DiffFormat::Detailed {
            print_details(project, bundle)?;
        }
    }

    if report.bundles.iter().any(BundleDiff::has_changes) {
        println!();
        println!("Run {} to apply bundle changes.", "forge deploy".cyan());
    }
    Ok(())
}

fn print_summary(bundle: &BundleDiff) {
    if !bundle.available {
        println!(
            "{} {}: not found in any source",
            "WARN".yellow().bold(),
            bundle.bundle.cyan()
        );
        return;
    }

    let status = if bundle.has_changes() {
        "DIFF".yellow().bold()
    } else {
        "OK".green().bold()
    };
    println!(
        "{} {}: {} added, {} modified, {} deleted, {} unchanged",
        status,
        bundle.bundle.cyan(),
        bundle.count(DiffStatus::Added).to_string().green(),
        bundle.count(DiffStatus::Modified).to_string().yellow(),
        bundle.count(DiffStatus::Deleted).to_string().red(),
        bundle.count(DiffStatus::Unchanged)
    );
}

fn print_details(project: &Project, bundle: &BundleDiff) -> Result<()> {
    for result in bundle
        .results
        .iter()
        .filter(|r| r.status != DiffStatus::Unchanged)
    {
        println!("  {} {} {}", marker(result), result.path, checksums(result).dimmed());

        if result.status == DiffStatus::Modified
            && let Some(diff) = project.line_diff(&bundle.bundle, &result.path)?
        {
            for line in diff.lines() {
                print_diff_line(line);
            }
        }
    }
    Ok(())
}

fn marker(result: &DiffResult) -> colored::ColoredString {
    match result.status {
        DiffStatus::Added => "+".green(),
        DiffStatus::Modified => "~".yellow(),
        DiffStatus::Deleted => "-".red(),
        DiffStatus::Unchanged => " ".normal(),
    }
}

fn checksums(result: &DiffResult) -> String {
    let short = |sum: &Option<String>| {
        sum.as_deref()
            .map(short_checksum)
            .unwrap_or("--------")
            .to_string()
    };
    format!(
        "(local {}, bundle {})",
        short(&result.local_checksum),
        short(&result.bundle_checksum)
    )
}

fn print_diff_line(line: &str) {
    if line.starts_with("+++") || line.starts_with("---") {
        println!("    {}", line.bold());
    } else if line.starts_with('+') {
        println!("    {}", line.green());
    } else if line.starts_with('-') {
        println!("    {}", line.red());
    } else if line.starts_with("@@") {
        println!("    {}", line.cyan());
    } else {
        println!("    {}", line);
    }
}
