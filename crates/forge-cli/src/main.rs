//! forge CLI
//!
//! Deploys bundles into a project according to per-path ownership rules.

mod cli;
mod commands;
mod error;

use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser};
use colored::Colorize;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use forge_core::{Project, ProjectContext, ReconcileOptions};

use cli::{Cli, Commands};
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let Some(command) = cli.command.clone() else {
        println!("{} bundle deployment", "forge".green().bold());
        println!();
        println!("Run {} for available commands.", "forge --help".cyan());
        return Ok(());
    };

    execute_command(&cli, command)
}

/// Log to stderr. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "error" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose)
                .compact(),
        )
        .try_init();
    tracing::debug!("Verbose mode enabled");
}

fn execute_command(cli: &Cli, command: Commands) -> Result<()> {
    match command {
        Commands::Init {
            name,
            project_version,
            environment,
            starter,
            force,
        } => {
            let root = init_root(cli.project.as_deref())?;
            let project = open_project(cli, ProjectContext::new(root))?;
            commands::run_init(
                &project,
                forge_core::InitOptions {
                    name,
                    version: project_version,
                    environment,
                    starter,
                    force,
                },
            )
        }
        Commands::Install {
            bundle,
            force,
            ownership,
            dry_run,
        } => {
            let project = open_project(cli, resolve_context(cli.project.as_deref())?)?;
            commands::run_install(
                &project,
                &bundle,
                force,
                ownership.as_deref(),
                dry_run,
                cli.verbose,
            )
        }
        Commands::Deploy {
            bundle,
            force,
            dry_run,
            json,
        } => {
            let project = open_project(cli, resolve_context(cli.project.as_deref())?)?;
            commands::run_deploy(
                &project,
                bundle.as_deref(),
                ReconcileOptions { force, dry_run },
                json,
                cli.verbose,
            )
        }
        Commands::Diff { bundle, format } => {
            let project = open_project(cli, resolve_context(cli.project.as_deref())?)?;
            commands::run_diff(&project, bundle.as_deref(), format)
        }
        Commands::Remove {
            bundle,
            force,
            clean_files,
            dry_run,
        } => {
            let project = open_project(cli, resolve_context(cli.project.as_deref())?)?;
            commands::run_remove(
                &project,
                &bundle,
                forge_core::RemoveOptions {
                    force,
                    clean_files,
                    dry_run,
                },
            )
        }
        Commands::Update {
            bundle,
            force,
            dry_run,
        } => {
            let project = open_project(cli, resolve_context(cli.project.as_deref())?)?;
            commands::run_update(
                &project,
                bundle.as_deref(),
                ReconcileOptions { force, dry_run },
                cli.verbose,
            )
        }
        Commands::List { json } => {
            let project = open_project(cli, resolve_context(cli.project.as_deref())?)?;
            commands::run_list(&project, json)
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "forge", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Project root for commands that need an existing project.
///
/// An explicit `--project` is used as-is; otherwise the manifest is searched
/// for upward from the working directory.
fn resolve_context(project: Option<&Path>) -> Result<ProjectContext> {
    match project {
        Some(dir) => {
            if !dir.is_dir() {
                return Err(CliError::user(format!(
                    "Project directory does not exist: {}",
                    dir.display()
                )));
            }
            Ok(ProjectContext::new(forge_fs::canonical_root(dir)?))
        }
        None => Ok(ProjectContext::discover(&std::env::current_dir()?)?),
    }
}

/// Project root for `init`, created if missing.
fn init_root(project: Option<&Path>) -> Result<PathBuf> {
    let dir = match project {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir()?,
    };
    std::fs::create_dir_all(&dir)?;
    Ok(forge_fs::canonical_root(&dir)?)
}

fn open_project(cli: &Cli, ctx: ProjectContext) -> Result<Project> {
    let cwd = std::env::current_dir()?;
    let extra: Vec<PathBuf> = cli.bundle_paths.iter().map(|p| cwd.join(p)).collect();
    Ok(Project::open(ctx, &extra)?)
}
