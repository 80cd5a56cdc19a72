//! Core deployment engine for forge
//!
//! This crate decides, file by file, how a bundle's contents land in a
//! project:
//!
//! - **Ownership**: resolves each path to `copy`, `copy-if-absent`, `merge`
//!   or `ignore` (exact > directory prefix > glob > default)
//! - **Reconciliation**: applies one rule to one file, protecting local edits
//!   through checksums recorded at the previous deploy
//! - **Deployment**: walks bundles in manifest order and records checksums
//! - **Diff**: read-only classification of bundle files against the project
//!
//! # Architecture
//!
//! ```text
//!                  forge-cli
//!                      |
//!                  forge-core
//!     +--------+-------+--------+--------+
//!     |        |       |        |        |
//!  project  deploy   diff   reconcile  source
//!                      |
//!                  forge-fs
//! ```
//!
//! # Example
//!
//! ```ignore
//! use forge_core::{Project, ProjectContext, ReconcileOptions};
//!
//! let ctx = ProjectContext::discover(&std::env::current_dir()?)?;
//! let project = Project::open(ctx, &[])?;
//! let report = project.deploy(None, ReconcileOptions::default())?;
//! println!("{} files created", report.count(forge_core::MergeAction::Created));
//! ```

pub mod config;
pub mod context;
pub mod deploy;
pub mod diff;
pub mod error;
pub mod manifest;
pub mod merge;
pub mod ownership;
pub mod project;
pub mod reconcile;
pub mod source;

pub use config::ForgeConfig;
pub use context::ProjectContext;
pub use deploy::{BundleDeployer, BundleReport, DeployReport};
pub use diff::{BundleDiff, DiffReporter, DiffResult, DiffStatus};
pub use error::{Error, Result};
pub use manifest::{Bundle, MANIFEST_FILE, ProjectManifest};
pub use merge::{JsonMergeStrategy, MergeOutcome, MergeStrategy, MergeStrategyRegistry};
pub use ownership::{OwnershipMap, OwnershipPattern, OwnershipRule};
pub use project::{
    DiffReport, InitOptions, InitReport, InstallOptions, KeepReason, Project, RemoveOptions,
    RemoveReport, UpdateReport, VersionChange,
};
pub use reconcile::{FileReconciler, MergeAction, MergeResult, ReconcileOptions, SkipReason};
pub use source::{AssetKind, BundleDescriptor, BundleFile, BundleSource, DirectoryBundleSource};
