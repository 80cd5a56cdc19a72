//! Read-only comparison of bundles against the project
//!
//! Each bundle file is compared with its local counterpart by checksum.
//! Paths recorded in the manifest that the bundle no longer ships, but that
//! still exist locally, are reported as deleted from the bundle.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use similar::TextDiff;

use forge_fs::{NormalizedPath, checksum, io};

use crate::Result;
use crate::context::ProjectContext;
use crate::source::BundleSource;

/// Classification of one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffStatus {
    /// Shipped by the bundle, missing locally
    Added,
    /// Present on both sides with different content
    Modified,
    /// No longer shipped by the bundle, still present locally
    Deleted,
    /// Present on both sides with identical content
    Unchanged,
}

impl fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
            Self::Unchanged => "unchanged",
        })
    }
}

/// Diff entry for one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResult {
    pub path: String,
    pub status: DiffStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_checksum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_checksum: Option<String>,
}

/// Diff of one bundle.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleDiff {
    pub bundle: String,
    /// False when the bundle's files could not be located
    pub available: bool,
    pub results: Vec<DiffResult>,
}

impl BundleDiff {
    /// Number of entries with the given status.
    pub fn count(&self, status: DiffStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    /// Whether anything differs.
    pub fn has_changes(&self) -> bool {
        self.results.iter().any(|r| r.status != DiffStatus::Unchanged)
    }
}

/// Computes diffs without touching the filesystem.
pub struct DiffReporter<'a> {
    source: &'a dyn BundleSource,
}

impl<'a> DiffReporter<'a> {
    pub fn new(source: &'a dyn BundleSource) -> Self {
        Self { source }
    }

    /// Compare one bundle with the project.
    ///
    /// `stored_checksums` are the checksums recorded at the last deploy.
    /// A bundle that cannot be located yields no entries.
    pub fn compute_diffs(
        &self,
        ctx: &ProjectContext,
        bundle_name: &str,
        stored_checksums: &BTreeMap<String, String>,
    ) -> Result<Vec<DiffResult>> {
        Ok(self
            .bundle_diff(ctx, bundle_name, stored_checksums)?
            .results)
    }

    /// Compare one bundle with the project, reporting availability.
    pub fn bundle_diff(
        &self,
        ctx: &ProjectContext,
        bundle_name: &str,
        stored_checksums: &BTreeMap<String, String>,
    ) -> Result<BundleDiff> {
        let Some(files) = self.source.bundle_files(bundle_name)? else {
            tracing::warn!(bundle = bundle_name, "Bundle not found in any source");
            return Ok(BundleDiff {
                bundle: bundle_name.to_string(),
                available: false,
                results: Vec::new(),
            });
        };

        let mut results = Vec::with_capacity(files.len());
        let mut seen = BTreeSet::new();

        for file in &files {
            seen.insert(file.relative.as_str());
            let bundle_sum = file_checksum(&file.absolute)?;
            let target = ctx.target_path(&file.relative);

            let (status, local_sum) = if target.is_file() {
                let local_sum = file_checksum(&target)?;
                let status = if local_sum == bundle_sum {
                    DiffStatus::Unchanged
                } else {
                    DiffStatus::Modified
                };
                (status, Some(local_sum))
            } else {
                (DiffStatus::Added, None)
            };

            results.push(DiffResult {
                path: file.relative.to_string(),
                status,
                local_checksum: local_sum,
                bundle_checksum: Some(bundle_sum),
            });
        }

        for path in stored_checksums.keys() {
            if seen.contains(path.as_str()) {
                continue;
            }
            let relative = NormalizedPath::new(path);
            if !relative.is_contained() {
                tracing::warn!(path = %path, "Ignoring checksum key outside the project");
                continue;
            }
            let target = ctx.target_path(&relative);
            if target.is_file() {
                results.push(DiffResult {
                    path: path.clone(),
                    status: DiffStatus::Deleted,
                    local_checksum: Some(file_checksum(&target)?),
                    bundle_checksum: None,
                });
            }
        }

        tracing::debug!(bundle = bundle_name, entries = results.len(), "Computed diff");
        Ok(BundleDiff {
            bundle: bundle_name.to_string(),
            available: true,
            results,
        })
    }

    /// Unified line diff from the local file to the bundle file.
    ///
    /// Returns `None` when the bundle does not ship `relative` or either side
    /// is not UTF-8 text.
    pub fn line_diff(
        &self,
        ctx: &ProjectContext,
        bundle_name: &str,
        relative: &str,
    ) -> Result<Option<String>> {
        let Some(files) = self.source.bundle_files(bundle_name)? else {
            return Ok(None);
        };
        let Some(file) = files.iter().find(|f| f.relative.as_str() == relative) else {
            return Ok(None);
        };

        let target = ctx.target_path(&file.relative);
        let local = if target.is_file() {
            match io::read_text(&target) {
                Ok(text) => text,
                Err(_) => return Ok(None),
            }
        } else {
            String::new()
        };
        let Ok(bundle) = io::read_text(&file.absolute) else {
            return Ok(None);
        };

        let diff = TextDiff::from_lines(&local, &bundle);
        let rendered = diff
            .unified_diff()
            .context_radius(3)
            .header(&format!("local/{}", relative), &format!("bundle/{}", relative))
            .to_string();
        Ok(Some(rendered))
    }
}

fn file_checksum(path: &std::path::Path) -> Result<String> {
    checksum::compute_file_checksum(path)
        .map_err(|e| forge_fs::Error::io(path, e).into())
}
