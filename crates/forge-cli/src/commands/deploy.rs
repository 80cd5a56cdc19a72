//! Install, deploy and update command implementations
//!
//! All three end in a deploy and share its report output.

use colored::Colorize;

use forge_core::{
    DeployReport, InstallOptions, MergeAction, MergeResult, OwnershipMap, Project,
    ReconcileOptions,
};

use crate::error::Result;

/// Run the install command
pub fn run_install(
    project: &Project,
    bundle: &str,
    force: bool,
    ownership: Option<&str>,
    dry_run: bool,
    verbose: bool,
) -> Result<()> {
    let ownership = match ownership {
        Some(json) => OwnershipMap::parse_overrides(json)?,
        None => Default::default(),
    };

    println!(
        "{} Installing {}...",
        "=>".blue().bold(),
        bundle.cyan()
    );

    let report = project.install(
        bundle,
        InstallOptions {
            force,
            ownership,
            dry_run,
        },
    )?;

    print_report(&report, verbose);
    if !dry_run {
        println!("{} Installed {}", "OK".green().bold(), bundle.cyan());
    }
    Ok(())
}

/// Run the deploy command
pub fn run_deploy(
    project: &Project,
    bundle: Option<&str>,
    options: ReconcileOptions,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let report = project.deploy(bundle, options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} Deploying into {}",
        "=>".blue().bold(),
        project.context().root().display().to_string().yellow()
    );
    print_report(&report, verbose);
    Ok(())
}

/// Run the update command
pub fn run_update(
    project: &Project,
    bundle: Option<&str>,
    options: ReconcileOptions,
    verbose: bool,
) -> Result<()> {
    let report = project.update(bundle, options)?;

    for (name, error) in &report.unreadable {
        println!(
            "{} Cannot read descriptor of {}: {}",
            "WARN".yellow().bold(),
            name.cyan(),
            error
        );
    }
    if report.versions.is_empty() {
        println!("{} All bundle versions are current.", "OK".green().bold());
    }
    for change in &report.versions {
        println!(
            "  {} {} {} -> {}",
            "^".cyan(),
            change.bundle.cyan(),
            change.from.dimmed(),
            change.to.green()
        );
    }

    print_report(&report.deploy, verbose);
    Ok(())
}

/// Print per-file results, warnings and totals of a deploy.
///
/// Routine skips are listed only when `verbose`.
pub fn print_report(report: &DeployReport, verbose: bool) {
    if report.dry_run {
        println!("{}", "[dry-run] No files were written.".yellow());
    }

    for bundle in &report.bundles {
        if !bundle.available {
            println!(
                "{} Bundle {} not found in any source, skipped",
                "WARN".yellow().bold(),
                bundle.bundle.cyan()
            );
            continue;
        }

        println!();
        println!("{}", bundle.bundle.bold());
        for result in bundle
            .results
            .iter()
            .filter(|r| verbose || r.is_change() || r.is_warning())
        {
            print_result(result);
        }
    }

    let warnings: Vec<_> = report.warnings().collect();
    if !warnings.is_empty() {
        println!();
        println!("{}", "Warnings:".yellow().bold());
        for result in warnings {
            if let Some(reason) = &result.skip_reason {
                println!("  {} {}: {}", "!".yellow(), result.path.cyan(), reason);
            }
        }
    }

    println!();
    println!(
        "{} created, {} updated, {} merged, {} skipped",
        report.count(MergeAction::Created).to_string().green(),
        report.count(MergeAction::Updated).to_string().yellow(),
        report.count(MergeAction::Merged).to_string().cyan(),
        report.count(MergeAction::Skipped).to_string().dimmed()
    );
}

fn print_result(result: &MergeResult) {
    let rule = format!("({})", result.rule).dimmed();
    match result.action {
        MergeAction::Created => println!("  {} {} {}", "+".green(), result.path.green(), rule),
        MergeAction::Updated => println!("  {} {} {}", "~".yellow(), result.path.yellow(), rule),
        MergeAction::Merged => println!("  {} {} {}", "*".cyan(), result.path.cyan(), rule),
        MergeAction::Skipped => {
            let reason = result
                .skip_reason
                .as_ref()
                .map(|r| r.to_string())
                .unwrap_or_default();
            println!(
                "  {} {} {} {}",
                "=".dimmed(),
                result.path.dimmed(),
                rule,
                reason.dimmed()
            );
        }
    }
}
