//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// forge - Deploy bundles into your project without clobbering local edits
#[derive(Parser, Debug)]
#[command(name = "forge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project directory (defaults to the nearest directory with a manifest)
    #[arg(long, global = true, value_name = "DIR")]
    pub project: Option<PathBuf>,

    /// Additional bundle source root, searched before the configured ones
    #[arg(
        long = "bundle-path",
        global = true,
        value_name = "DIR",
        env = "FORGE_BUNDLE_PATH"
    )]
    pub bundle_paths: Vec<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output formats for `forge diff`
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DiffFormat {
    /// Per-bundle counts
    #[default]
    Summary,
    /// Every changed file with a line diff
    Detailed,
    /// Machine-readable report
    Json,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Create the project manifest
    ///
    /// Examples:
    ///   forge init                     # Manifest named after the directory
    ///   forge init --starter web       # Also copy the files of the "web" starter
    Init {
        /// Project name
        #[arg(long)]
        name: Option<String>,

        /// Project version
        #[arg(long = "version", value_name = "VERSION")]
        project_version: Option<String>,

        /// Environment recorded in the manifest
        #[arg(long)]
        environment: Option<String>,

        /// Starter whose files are copied into the project
        #[arg(long)]
        starter: Option<String>,

        /// Replace an existing manifest
        #[arg(long)]
        force: bool,
    },

    /// Add a bundle to the project and deploy it
    ///
    /// Examples:
    ///   forge install core
    ///   forge install core --ownership '{"src/": "copy", "*.json": "merge"}'
    Install {
        /// Bundle name
        bundle: String,

        /// Reinstall and overwrite locally edited files
        #[arg(long)]
        force: bool,

        /// Ownership entries as a JSON object of pattern -> rule
        #[arg(long, value_name = "JSON")]
        ownership: Option<String>,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,
    },

    /// Deploy installed bundles into the project
    Deploy {
        /// Deploy only this bundle
        bundle: Option<String>,

        /// Overwrite locally edited files owned with `copy`
        #[arg(long)]
        force: bool,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Compare installed bundles with the project
    Diff {
        /// Compare only this bundle
        bundle: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = DiffFormat::Summary)]
        format: DiffFormat,
    },

    /// Remove a bundle from the project
    Remove {
        /// Bundle name
        bundle: String,

        /// Delete files even if they were edited locally
        #[arg(long)]
        force: bool,

        /// Delete the files the bundle deployed
        #[arg(long)]
        clean_files: bool,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,
    },

    /// Refresh bundle versions and redeploy
    Update {
        /// Update only this bundle
        bundle: Option<String>,

        /// Overwrite locally edited files owned with `copy`
        #[arg(long)]
        force: bool,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,
    },

    /// List installed bundles
    List {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    ///
    /// Examples:
    ///   forge completions bash > ~/.local/share/bash-completion/completions/forge
    ///   forge completions zsh > ~/.zfunc/_forge
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_no_command() {
        let cli = Cli::parse_from(["forge"]);
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "forge",
            "deploy",
            "--project",
            "/work/app",
            "--bundle-path",
            "/a",
            "--bundle-path",
            "/b",
            "-v",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.project, Some(PathBuf::from("/work/app")));
        assert_eq!(
            cli.bundle_paths,
            vec![PathBuf::from("/a"), PathBuf::from("/b")]
        );
    }

    #[test]
    fn parse_init_with_version() {
        let cli = Cli::parse_from(["forge", "init", "--name", "site", "--version", "2.0.0"]);
        match cli.command {
            Some(Commands::Init {
                name,
                project_version,
                force,
                ..
            }) => {
                assert_eq!(name.as_deref(), Some("site"));
                assert_eq!(project_version.as_deref(), Some("2.0.0"));
                assert!(!force);
            }
            _ => panic!("Expected Init command"),
        }
    }

    #[test]
    fn parse_install_command() {
        let cli = Cli::parse_from([
            "forge",
            "install",
            "core",
            "--ownership",
            r#"{"src/": "copy"}"#,
            "--dry-run",
        ]);
        match cli.command {
            Some(Commands::Install {
                bundle,
                force,
                ownership,
                dry_run,
            }) => {
                assert_eq!(bundle, "core");
                assert!(!force);
                assert_eq!(ownership.as_deref(), Some(r#"{"src/": "copy"}"#));
                assert!(dry_run);
            }
            _ => panic!("Expected Install command"),
        }
    }

    #[test]
    fn parse_deploy_defaults() {
        let cli = Cli::parse_from(["forge", "deploy"]);
        assert_eq!(
            cli.command,
            Some(Commands::Deploy {
                bundle: None,
                force: false,
                dry_run: false,
                json: false,
            })
        );
    }

    #[test]
    fn parse_diff_format() {
        let cli = Cli::parse_from(["forge", "diff", "core", "--format", "detailed"]);
        assert_eq!(
            cli.command,
            Some(Commands::Diff {
                bundle: Some("core".into()),
                format: DiffFormat::Detailed,
            })
        );

        let cli = Cli::parse_from(["forge", "diff"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Diff {
                format: DiffFormat::Summary,
                ..
            })
        ));
    }

    #[test]
    fn parse_remove_command() {
        let cli = Cli::parse_from(["forge", "remove", "core", "--clean-files"]);
        assert_eq!(
            cli.command,
            Some(Commands::Remove {
                bundle: "core".into(),
                force: false,
                clean_files: true,
                dry_run: false,
            })
        );
    }

    #[test]
    fn remove_requires_bundle() {
        assert!(Cli::try_parse_from(["forge", "remove"]).is_err());
    }

    #[test]
    fn parse_completions_command() {
        let cli = Cli::parse_from(["forge", "completions", "bash"]);
        assert!(matches!(cli.command, Some(Commands::Completions { .. })));
    }
}
