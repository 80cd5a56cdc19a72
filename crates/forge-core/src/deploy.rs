//! Bundle deployment
//!
//! Walks each bundle's file set, resolves the ownership rule of every file,
//! reconciles it, and records checksums for the files that changed.

use std::collections::BTreeMap;

use serde::Serialize;

use forge_fs::{NormalizedPath, checksum};

use crate::context::ProjectContext;
use crate::manifest::{Bundle, ProjectManifest};
use crate::ownership::{OwnershipMap, OwnershipRule};
use crate::reconcile::{FileReconciler, MergeAction, MergeResult, ReconcileOptions};
use crate::source::BundleSource;

/// Outcome of deploying one bundle.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleReport {
    pub bundle: String,
    /// False when the bundle's files could not be located
    pub available: bool,
    pub results: Vec<MergeResult>,
}

/// Outcome of a deploy across bundles.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployReport {
    pub dry_run: bool,
    pub bundles: Vec<BundleReport>,
}

impl DeployReport {
    /// All file results, in deployment order.
    pub fn results(&self) -> impl Iterator<Item = &MergeResult> {
        self.bundles.iter().flat_map(|b| b.results.iter())
    }

    /// Number of results with the given action.
    pub fn count(&self, action: MergeAction) -> usize {
        self.results().filter(|r| r.action == action).count()
    }

    /// Whether any file was (or would be) changed.
    pub fn has_changes(&self) -> bool {
        self.results().any(MergeResult::is_change)
    }

    /// Results the user should be warned about.
    pub fn warnings(&self) -> impl Iterator<Item = &MergeResult> {
        self.results().filter(|r| r.is_warning())
    }

    /// Bundles whose files could not be located.
    pub fn missing_bundles(&self) -> impl Iterator<Item = &str> {
        self.bundles
            .iter()
            .filter(|b| !b.available)
            .map(|b| b.bundle.as_str())
    }
}

/// Deploys bundles from a [`BundleSource`] into a project.
pub struct BundleDeployer<'a> {
    source: &'a dyn BundleSource,
    reconciler: FileReconciler,
    /// Project-wide rules applied beneath each bundle's own ownership table
    default_ownership: BTreeMap<String, OwnershipRule>,
}

impl<'a> BundleDeployer<'a> {
    pub fn new(source: &'a dyn BundleSource) -> Self {
        Self {
            source,
            reconciler: FileReconciler::new(),
            default_ownership: BTreeMap::new(),
        }
    }

    /// Use a custom reconciler (e.g. with extra merge strategies).
    pub fn with_reconciler(mut self, reconciler: FileReconciler) -> Self {
        self.reconciler = reconciler;
        self
    }

    /// Project-wide ownership entries; a bundle's own entries take precedence.
    pub fn with_default_ownership(mut self, rules: BTreeMap<String, OwnershipRule>) -> Self {
        self.default_ownership = rules;
        self
    }

    /// Effective ownership map for a bundle.
    pub fn ownership_for(&self, bundle: &Bundle) -> OwnershipMap {
        OwnershipMap::from_rules(self.default_ownership.iter().chain(bundle.ownership.iter()))
    }

    /// Deploy one bundle's files.
    ///
    /// A bundle that cannot be located produces no results and a warning.
    pub fn deploy_bundle(
        &self,
        ctx: &ProjectContext,
        bundle_name: &str,
        ownership: &OwnershipMap,
        options: ReconcileOptions,
        existing_checksums: &BTreeMap<String, String>,
    ) -> Vec<MergeResult> {
        self.try_deploy_bundle(ctx, bundle_name, ownership, options, existing_checksums)
            .unwrap_or_default()
    }

    fn try_deploy_bundle(
        &self,
        ctx: &ProjectContext,
        bundle_name: &str,
        ownership: &OwnershipMap,
        options: ReconcileOptions,
        existing_checksums: &BTreeMap<String, String>,
    ) -> Option<Vec<MergeResult>> {
        let files = match self.source.bundle_files(bundle_name) {
            Ok(Some(files)) => files,
            Ok(None) => {
                tracing::warn!(bundle = bundle_name, "Bundle not found in any source, skipping");
                return None;
            }
            Err(e) => {
                tracing::warn!(bundle = bundle_name, error = %e, "Cannot read bundle, skipping");
                return None;
            }
        };

        let results = files
            .iter()
            .map(|file| {
                let rule = ownership.resolve(file.relative.as_str());
                let target = ctx.target_path(&file.relative);
                let existing = existing_checksums
                    .get(file.relative.as_str())
                    .map(String::as_str);
                self.reconciler.reconcile(
                    &file.absolute,
                    &target,
                    &file.relative,
                    rule,
                    existing,
                    options,
                )
            })
            .collect();

        Some(results)
    }

    /// Deploy the manifest's bundles in order, or only `only` when given.
    ///
    /// Records a fresh checksum for every changed or up-to-date file and
    /// refreshes `lastUpdated` when any checksum moved. Nothing is recorded in dry-run mode. The caller saves
    /// the manifest.
    pub fn deploy(
        &self,
        ctx: &ProjectContext,
        manifest: &mut ProjectManifest,
        only: Option<&str>,
        options: ReconcileOptions,
    ) -> DeployReport {
        let bundles: Vec<Bundle> = manifest
            .bundles
            .iter()
            .filter(|b| only.is_none_or(|name| b.name == name))
            .cloned()
            .collect();

        let mut report = DeployReport {
            dry_run: options.dry_run,
            bundles: Vec::with_capacity(bundles.len()),
        };

        for bundle in &bundles {
            let ownership = self.ownership_for(bundle);
            let outcome =
                self.try_deploy_bundle(ctx, &bundle.name, &ownership, options, &manifest.checksums);

            report.bundles.push(BundleReport {
                bundle: bundle.name.clone(),
                available: outcome.is_some(),
                results: outcome.unwrap_or_default(),
            });
        }

        if !options.dry_run {
            record_checksums(ctx, manifest, &report);
        }

        tracing::info!(
            bundles = report.bundles.len(),
            created = report.count(MergeAction::Created),
            updated = report.count(MergeAction::Updated),
            merged = report.count(MergeAction::Merged),
            skipped = report.count(MergeAction::Skipped),
            dry_run = options.dry_run,
            "Deploy finished"
        );
        report
    }
}

fn record_checksums(ctx: &ProjectContext, manifest: &mut ProjectManifest, report: &DeployReport) {
    let mut changed = false;
    for result in report.results().filter(|r| r.should_record_checksum()) {
        let target = ctx.target_path(&NormalizedPath::new(&result.path));
        match checksum::compute_file_checksum(&target) {
            Ok(sum) if manifest.checksum(&result.path) == Some(sum.as_str()) => {}
            Ok(sum) => {
                manifest.record_checksum(result.path.clone(), sum);
                changed = true;
            }
            Err(e) => {
                tracing::warn!(path = %result.path, error = %e, "Cannot checksum deployed file");
            }
        }
    }
    if changed {
        manifest.touch();
    }
}
