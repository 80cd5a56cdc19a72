//! Project-level operations
//!
//! [`Project`] ties the manifest, configuration and a bundle source together
//! and implements the user-facing operations: init, install, deploy, diff,
//! update and remove. Each operation validates before it mutates, so a
//! configuration error leaves both the manifest and the project untouched.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::Serialize;

use forge_fs::{checksum, io};

use crate::config::ForgeConfig;
use crate::context::ProjectContext;
use crate::deploy::{BundleDeployer, DeployReport};
use crate::diff::{BundleDiff, DiffReporter, DiffStatus};
use crate::manifest::{Bundle, ProjectManifest};
use crate::ownership::OwnershipRule;
use crate::reconcile::ReconcileOptions;
use crate::source::{AssetKind, BundleSource};
use crate::{Error, Result};

/// Options for [`Project::init`].
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Project name; defaults to the root directory name
    pub name: Option<String>,
    /// Project version; defaults to `0.1.0`
    pub version: Option<String>,
    /// Environment; defaults to the configured one, then `development`
    pub environment: Option<String>,
    /// Starter asset to materialize into the project
    pub starter: Option<String>,
    /// Replace an existing manifest
    pub force: bool,
}

/// Result of [`Project::init`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitReport {
    pub manifest_path: PathBuf,
    pub created: Vec<String>,
    pub skipped: Vec<String>,
}

/// Options for [`Project::install`].
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Reinstall an installed bundle and overwrite locally edited files
    pub force: bool,
    /// Ownership entries layered over the bundle's defaults
    pub ownership: BTreeMap<String, OwnershipRule>,
    pub dry_run: bool,
}

/// Options for [`Project::remove`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveOptions {
    /// Delete files even if they were edited locally
    pub force: bool,
    /// Delete the bundle's deployed files
    pub clean_files: bool,
    pub dry_run: bool,
}

/// Why `remove --clean-files` left a file in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum KeepReason {
    /// Owned with the `ignore` rule
    Ignored,
    /// Never recorded as deployed
    NotDeployed,
    /// Changed since the last deploy
    LocallyModified,
    /// Also shipped by another installed bundle
    SharedWithBundle,
    /// Checking or deleting the file failed
    Failed { message: String },
}

impl std::fmt::Display for KeepReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ignored => f.write_str("ignored by ownership rule"),
            Self::NotDeployed => f.write_str("not deployed by forge"),
            Self::LocallyModified => f.write_str("modified locally (use --force to delete)"),
            Self::SharedWithBundle => f.write_str("shipped by another installed bundle"),
            Self::Failed { message } => write!(f, "could not delete: {}", message),
        }
    }
}

/// Result of [`Project::remove`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveReport {
    pub bundle: String,
    pub dry_run: bool,
    /// False when `--clean-files` could not locate the bundle's files
    pub available: bool,
    /// Files deleted (or that would be deleted)
    pub removed: Vec<String>,
    pub kept: Vec<(String, KeepReason)>,
}

/// A bundle version change made by [`Project::update`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionChange {
    pub bundle: String,
    pub from: String,
    pub to: String,
}

/// Result of [`Project::update`].
#[derive(Debug, Clone, Serialize)]
pub struct UpdateReport {
    pub versions: Vec<VersionChange>,
    /// Bundles whose descriptor could not be read, with the error
    pub unreadable: Vec<(String, String)>,
    pub deploy: DeployReport,
}

/// Result of [`Project::diff`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiffReport {
    pub bundles: Vec<BundleDiff>,
}

/// A project together with its configuration and bundle source.
pub struct Project {
    ctx: ProjectContext,
    config: ForgeConfig,
    source: Box<dyn BundleSource>,
}

impl Project {
    /// Open a project, reading its configuration and building the default
    /// directory source with `extra_roots` searched first.
    pub fn open(ctx: ProjectContext, extra_roots: &[PathBuf]) -> Result<Self> {
        let config = ForgeConfig::load(&ctx)?;
        let source = config.bundle_source(&ctx, extra_roots);
        tracing::debug!(roots = ?source.roots(), "Bundle search roots");
        Ok(Self::with_source(ctx, config, Box::new(source)))
    }

    /// Open a project with an explicit configuration and source.
    pub fn with_source(
        ctx: ProjectContext,
        config: ForgeConfig,
        source: Box<dyn BundleSource>,
    ) -> Self {
        Self {
            ctx,
            config,
            source,
        }
    }

    pub fn context(&self) -> &ProjectContext {
        &self.ctx
    }

    pub fn config(&self) -> &ForgeConfig {
        &self.config
    }

    pub fn source(&self) -> &dyn BundleSource {
        self.source.as_ref()
    }

    /// Load the project manifest.
    pub fn manifest(&self) -> Result<ProjectManifest> {
        ProjectManifest::load(&self.ctx)
    }

    fn deployer(&self) -> BundleDeployer<'_> {
        BundleDeployer::new(self.source.as_ref())
            .with_default_ownership(self.config.default_ownership.clone())
    }

    /// Create the project manifest, optionally seeding files from a starter.
    ///
    /// Starter files never overwrite existing files.
    pub fn init(&self, options: InitOptions) -> Result<InitReport> {
        let manifest_path = self.ctx.manifest_path();
        if manifest_path.exists() && !options.force {
            return Err(Error::ManifestExists {
                path: manifest_path,
            });
        }

        let starter = match &options.starter {
            Some(name) => Some(
                self.source
                    .resolve_asset(name, AssetKind::Starter)?
                    .ok_or_else(|| Error::StarterNotFound { name: name.clone() })?,
            ),
            None => None,
        };

        let name = options.name.clone().unwrap_or_else(|| {
            self.ctx
                .root()
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "project".to_string())
        });
        let mut manifest =
            ProjectManifest::new(name, options.version.as_deref().unwrap_or("0.1.0"));
        if let Some(environment) = options
            .environment
            .clone()
            .or_else(|| self.config.environment.clone())
        {
            manifest.environment = environment;
        }

        let mut created = Vec::new();
        let mut skipped = Vec::new();
        if let Some(asset) = starter {
            for (relative, content) in &asset.files {
                let target = self.ctx.target_path(relative);
                if target.exists() {
                    skipped.push(relative.to_string());
                    continue;
                }
                io::write_atomic(&target, content)?;
                created.push(relative.to_string());
            }
            manifest.starter = Some(asset.descriptor.name);
        }

        manifest.save(&self.ctx)?;
        tracing::info!(
            path = %manifest_path.display(),
            starter = ?manifest.starter,
            "Initialized project"
        );

        Ok(InitReport {
            manifest_path,
            created,
            skipped,
        })
    }

    /// Add a bundle to the manifest and deploy it.
    ///
    /// Ownership is the bundle descriptor's defaults overlaid with
    /// `options.ownership`.
    pub fn install(&self, name: &str, options: InstallOptions) -> Result<DeployReport> {
        let mut manifest = self.manifest()?;
        if manifest.bundle(name).is_some() && !options.force {
            return Err(Error::BundleAlreadyInstalled {
                name: name.to_string(),
            });
        }

        let descriptor = self
            .source
            .describe(name, AssetKind::Bundle)?
            .ok_or_else(|| Error::BundleNotFound {
                name: name.to_string(),
            })?;

        let mut bundle = Bundle::new(name, descriptor.version);
        bundle.ownership = descriptor.ownership;
        bundle.ownership.extend(options.ownership);
        manifest.upsert_bundle(bundle);

        let reconcile = ReconcileOptions {
            force: options.force,
            dry_run: options.dry_run,
        };
        let report = self
            .deployer()
            .deploy(&self.ctx, &mut manifest, Some(name), reconcile);

        if !options.dry_run {
            manifest.save(&self.ctx)?;
        }
        Ok(report)
    }

    /// Deploy every installed bundle, or just `only`.
    pub fn deploy(&self, only: Option<&str>, options: ReconcileOptions) -> Result<DeployReport> {
        let mut manifest = self.manifest()?;
        if let Some(name) = only {
            ensure_installed(&manifest, name)?;
        }

        let report = self.deployer().deploy(&self.ctx, &mut manifest, only, options);

        if !options.dry_run {
            manifest.save(&self.ctx)?;
        }
        Ok(report)
    }

    /// Refresh bundle versions from their descriptors and redeploy.
    pub fn update(&self, only: Option<&str>, options: ReconcileOptions) -> Result<UpdateReport> {
        let mut manifest = self.manifest()?;
        if let Some(name) = only {
            ensure_installed(&manifest, name)?;
        }

        let mut versions = Vec::new();
        let mut unreadable = Vec::new();
        for bundle in manifest
            .bundles
            .iter_mut()
            .filter(|b| only.is_none_or(|name| b.name == name))
        {
            match self.source.describe(&bundle.name, AssetKind::Bundle) {
                Ok(Some(descriptor)) if descriptor.version != bundle.version => {
                    versions.push(VersionChange {
                        bundle: bundle.name.clone(),
                        from: std::mem::replace(&mut bundle.version, descriptor.version.clone()),
                        to: descriptor.version,
                    });
                }
                Ok(Some(_)) => {}
                // Reported by the deploy below as unavailable
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(bundle = %bundle.name, error = %e, "Cannot read bundle descriptor");
                    unreadable.push((bundle.name.clone(), e.to_string()));
                }
            }
        }
        if !versions.is_empty() {
            manifest.touch();
        }

        let deploy = self.deployer().deploy(&self.ctx, &mut manifest, only, options);

        if !options.dry_run {
            manifest.save(&self.ctx)?;
        }
        Ok(UpdateReport {
            versions,
            unreadable,
            deploy,
        })
    }

    /// Remove a bundle from the manifest, optionally deleting its files.
    ///
    /// Only files whose current checksum matches the one recorded at the
    /// last deploy are deleted, unless `force` is set. Files shipped by
    /// another installed bundle and `ignore`-owned files are always kept.
    pub fn remove(&self, name: &str, options: RemoveOptions) -> Result<RemoveReport> {
        let mut manifest = self.manifest()?;
        let bundle = ensure_installed(&manifest, name)?.clone();

        let mut report = RemoveReport {
            bundle: name.to_string(),
            dry_run: options.dry_run,
            available: true,
            removed: Vec::new(),
            kept: Vec::new(),
        };

        if options.clean_files {
            self.clean_files(&manifest, &bundle, options, &mut report)?;
        }

        if options.dry_run {
            return Ok(report);
        }

        for path in &report.removed {
            manifest.forget_checksum(path);
        }
        manifest.remove_bundle(name);
        manifest.save(&self.ctx)?;
        tracing::info!(bundle = name, removed = report.removed.len(), "Removed bundle");
        Ok(report)
    }

    fn clean_files(
        &self,
        manifest: &ProjectManifest,
        bundle: &Bundle,
        options: RemoveOptions,
        report: &mut RemoveReport,
    ) -> Result<()> {
        let Some(files) = self.source.bundle_files(&bundle.name)? else {
            tracing::warn!(
                bundle = %bundle.name,
                "Bundle not found in any source, cannot determine its files"
            );
            report.available = false;
            return Ok(());
        };

        let shared = self.paths_shipped_by_others(manifest, &bundle.name)?;
        let ownership = self.deployer().ownership_for(bundle);

        for file in files {
            let path = file.relative.to_string();
            let target = self.ctx.target_path(&file.relative);
            if !target.is_file() {
                continue;
            }

            let keep = if ownership.resolve(&path) == OwnershipRule::Ignore {
                Some(KeepReason::Ignored)
            } else if shared.contains(&path) {
                Some(KeepReason::SharedWithBundle)
            } else if options.force {
                None
            } else {
                match manifest.checksum(&path) {
                    None => Some(KeepReason::NotDeployed),
                    Some(recorded) => match checksum::compute_file_checksum(&target) {
                        Ok(local) => (local != recorded).then_some(KeepReason::LocallyModified),
                        Err(e) => Some(KeepReason::Failed {
                            message: e.to_string(),
                        }),
                    },
                }
            };

            let keep = match keep {
                None if !options.dry_run => {
                    io::remove_file_and_empty_parents(&target, self.ctx.root())
                        .err()
                        .map(|e| KeepReason::Failed {
                            message: e.to_string(),
                        })
                }
                other => other,
            };

            match keep {
                Some(KeepReason::Failed { message }) => {
                    tracing::warn!(path = %path, error = %message, "Cannot delete file");
                    report.kept.push((path, KeepReason::Failed { message }));
                }
                Some(reason) => {
                    tracing::debug!(path = %path, %reason, "Keeping file");
                    report.kept.push((path, reason));
                }
                None => report.removed.push(path),
            }
        }
        Ok(())
    }

    /// Compare installed bundles (or just `only`) with the project.
    ///
    /// The manifest's checksum map is shared by all bundles, so for each
    /// bundle the paths shipped by the other installed bundles are excluded
    /// before looking for deleted files. A stale path shipped by no bundle is
    /// reported under the first bundle only.
    pub fn diff(&self, only: Option<&str>) -> Result<DiffReport> {
        let manifest = self.manifest()?;
        if let Some(name) = only {
            ensure_installed(&manifest, name)?;
        }

        let reporter = DiffReporter::new(self.source.as_ref());
        let mut report = DiffReport::default();
        let mut reported_deleted = BTreeSet::new();

        for bundle in manifest
            .bundles
            .iter()
            .filter(|b| only.is_none_or(|name| b.name == name))
        {
            let others = self.paths_shipped_by_others(&manifest, &bundle.name)?;
            let stored: BTreeMap<String, String> = manifest
                .checksums
                .iter()
                .filter(|(path, _)| !others.contains(*path) && !reported_deleted.contains(*path))
                .map(|(path, sum)| (path.clone(), sum.clone()))
                .collect();

            let diff = reporter.bundle_diff(&self.ctx, &bundle.name, &stored)?;
            reported_deleted.extend(
                diff.results
                    .iter()
                    .filter(|r| r.status == DiffStatus::Deleted)
                    .map(|r| r.path.clone()),
            );
            report.bundles.push(diff);
        }
        Ok(report)
    }

    /// Unified diff for one file of an installed bundle.
    pub fn line_diff(&self, bundle: &str, relative: &str) -> Result<Option<String>> {
        DiffReporter::new(self.source.as_ref()).line_diff(&self.ctx, bundle, relative)
    }

    fn paths_shipped_by_others(
        &self,
        manifest: &ProjectManifest,
        bundle_name: &str,
    ) -> Result<BTreeSet<String>> {
        let mut paths = BTreeSet::new();
        for other in manifest.bundles.iter().filter(|b| b.name != bundle_name) {
            if let Some(files) = self.source.bundle_files(&other.name)? {
                paths.extend(files.into_iter().map(|f| f.relative.to_string()));
            }
        }
        Ok(paths)
    }
}

fn ensure_installed<'m>(manifest: &'m ProjectManifest, name: &str) -> Result<&'m Bundle> {
    manifest.bundle(name).ok_or_else(|| Error::BundleNotInstalled {
        name: name.to_string(),
    })
}

