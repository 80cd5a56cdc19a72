//! File reconciliation
//!
//! Applies one ownership rule to one (bundle file, project file) pair. The
//! decision compares three things: the bundle file, the local file, and the
//! checksum recorded for the local file at the previous deploy.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use forge_fs::{NormalizedPath, checksum, io};

use crate::merge::{MergeOutcome, MergeStrategyRegistry};
use crate::ownership::OwnershipRule;
use crate::{Error, Result};

/// Options shared by deploy-like operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Overwrite `copy`-owned files even if they were edited locally
    pub force: bool,
    /// Decide what would happen without writing anything
    pub dry_run: bool,
}

/// What happened (or would happen) to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeAction {
    Created,
    Updated,
    Merged,
    Skipped,
}

impl fmt::Display for MergeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Merged => "merged",
            Self::Skipped => "skipped",
        })
    }
}

/// Why a file was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum SkipReason {
    /// Owned with the `ignore` rule
    Ignored,
    /// `copy-if-absent` and the file already exists
    Exists,
    /// Local file already matches the bundle
    UpToDate,
    /// Local file was merged before and nothing new arrived
    AlreadyMerged,
    /// Local file changed since the last deploy; `--force` overrides
    LocallyModified,
    /// No merge strategy for this file type
    NoMergeStrategy { extension: String },
    /// Reading, parsing or writing failed
    Failed { message: String },
}

impl SkipReason {
    /// Whether the user should be told about this skip.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Self::LocallyModified | Self::NoMergeStrategy { .. } | Self::Failed { .. }
        )
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ignored => write!(f, "ignored by ownership rule"),
            Self::Exists => write!(f, "already exists"),
            Self::UpToDate => write!(f, "up to date"),
            Self::AlreadyMerged => write!(f, "already merged"),
            Self::LocallyModified => {
                write!(f, "modified locally since last deploy (use --force to overwrite)")
            }
            Self::NoMergeStrategy { extension } if extension.is_empty() => {
                write!(f, "no merge strategy for files without an extension")
            }
            Self::NoMergeStrategy { extension } => {
                write!(f, "no merge strategy for .{} files", extension)
            }
            Self::Failed { message } => write!(f, "{}", message),
        }
    }
}

/// Result of reconciling one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeResult {
    pub path: String,
    pub action: MergeAction,
    pub rule: OwnershipRule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<SkipReason>,
}

impl MergeResult {
    fn new(path: &NormalizedPath, rule: OwnershipRule, action: MergeAction) -> Self {
        Self {
            path: path.to_string(),
            action,
            rule,
            skip_reason: None,
        }
    }

    fn skipped(path: &NormalizedPath, rule: OwnershipRule, reason: SkipReason) -> Self {
        Self {
            path: path.to_string(),
            action: MergeAction::Skipped,
            rule,
            skip_reason: Some(reason),
        }
    }

    /// Whether this result changed (or would change) the project.
    pub fn is_change(&self) -> bool {
        self.action != MergeAction::Skipped
    }

    /// Whether the local file now holds content the manifest should record.
    ///
    /// True for changes and for `copy` targets that already match the bundle,
    /// which may have been brought in line by hand.
    pub fn should_record_checksum(&self) -> bool {
        self.is_change() || self.skip_reason == Some(SkipReason::UpToDate)
    }

    /// Whether the user should be warned about this result.
    pub fn is_warning(&self) -> bool {
        self.skip_reason.as_ref().is_some_and(SkipReason::is_warning)
    }
}

/// Applies ownership rules to individual files.
#[derive(Debug, Default)]
pub struct FileReconciler {
    strategies: MergeStrategyRegistry,
}

impl FileReconciler {
    /// Create a reconciler with the built-in merge strategies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reconciler with a custom strategy registry.
    pub fn with_strategies(strategies: MergeStrategyRegistry) -> Self {
        Self { strategies }
    }

    /// Reconcile `target` with `source` under `rule`.
    ///
    /// `existing_checksum` is the checksum recorded for this path at the
    /// previous deploy. Never fails: I/O and parse errors are logged and
    /// reported as [`SkipReason::Failed`].
    pub fn reconcile(
        &self,
        source: &Path,
        target: &Path,
        relative: &NormalizedPath,
        rule: OwnershipRule,
        existing_checksum: Option<&str>,
        options: ReconcileOptions,
    ) -> MergeResult {
        let result = self
            .try_reconcile(source, target, relative, rule, existing_checksum, options)
            .unwrap_or_else(|e| {
                tracing::warn!(path = %relative, %rule, error = %e, "Skipping file");
                MergeResult::skipped(
                    relative,
                    rule,
                    SkipReason::Failed {
                        message: e.to_string(),
                    },
                )
            });

        tracing::debug!(
            path = %relative,
            %rule,
            action = %result.action,
            dry_run = options.dry_run,
            "Reconciled file"
        );
        result
    }

    fn try_reconcile(
        &self,
        source: &Path,
        target: &Path,
        relative: &NormalizedPath,
        rule: OwnershipRule,
        existing_checksum: Option<&str>,
        options: ReconcileOptions,
    ) -> Result<MergeResult> {
        match rule {
            OwnershipRule::Ignore => Ok(MergeResult::skipped(relative, rule, SkipReason::Ignored)),
            _ if !target.exists() => {
                write_copy(source, target, options)?;
                Ok(MergeResult::new(relative, rule, MergeAction::Created))
            }
            OwnershipRule::CopyIfAbsent => {
                Ok(MergeResult::skipped(relative, rule, SkipReason::Exists))
            }
            OwnershipRule::Copy => self.overwrite(source, target, relative, existing_checksum, options),
            OwnershipRule::Merge => self.merge(source, target, relative, options),
        }
    }

    fn overwrite(
        &self,
        source: &Path,
        target: &Path,
        relative: &NormalizedPath,
        existing_checksum: Option<&str>,
        options: ReconcileOptions,
    ) -> Result<MergeResult> {
        let rule = OwnershipRule::Copy;
        let local = file_checksum(target)?;

        if file_checksum(source)? == local {
            return Ok(MergeResult::skipped(relative, rule, SkipReason::UpToDate));
        }

        if !options.force
            && let Some(recorded) = existing_checksum
            && recorded != local
        {
            tracing::warn!(
                path = %relative,
                recorded = checksum::short_checksum(recorded),
                local = checksum::short_checksum(&local),
                "Local edits detected, not overwriting"
            );
            return Ok(MergeResult::skipped(
                relative,
                rule,
                SkipReason::LocallyModified,
            ));
        }

        write_copy(source, target, options)?;
        Ok(MergeResult::new(relative, rule, MergeAction::Updated))
    }

    fn merge(
        &self,
        source: &Path,
        target: &Path,
        relative: &NormalizedPath,
        options: ReconcileOptions,
    ) -> Result<MergeResult> {
        let rule = OwnershipRule::Merge;
        let extension = relative.extension().unwrap_or_default();

        let Some(strategy) = self.strategies.get(extension) else {
            return Ok(MergeResult::skipped(
                relative,
                rule,
                SkipReason::NoMergeStrategy {
                    extension: extension.to_string(),
                },
            ));
        };

        // Both sides are parsed before anything is written
        let source_text = io::read_text(source)?;
        let target_text = io::read_text(target)?;
        let merged = match strategy.merge(&source_text, &target_text)? {
            MergeOutcome::Unchanged => {
                return Ok(MergeResult::skipped(relative, rule, SkipReason::AlreadyMerged));
            }
            MergeOutcome::Changed(merged) => merged,
        };

        if !options.dry_run {
            io::write_text(target, &merged)?;
        }
        tracing::debug!(path = %relative, format = strategy.format(), "Merged file");
        Ok(MergeResult::new(relative, rule, MergeAction::Merged))
    }
}

fn write_copy(source: &Path, target: &Path, options: ReconcileOptions) -> Result<()> {
    if options.dry_run {
        // Still surface an unreadable source in dry-run
        if !source.is_file() {
            return Err(Error::Fs(forge_fs::Error::io(
                source,
                std::io::Error::new(std::io::ErrorKind::NotFound, "bundle file is missing"),
            )));
        }
        return Ok(());
    }
    io::copy_file(source, target)?;
    Ok(())
}

fn file_checksum(path: &Path) -> Result<String> {
    checksum::compute_file_checksum(path).map_err(|e| Error::Fs(forge_fs::Error::io(path, e)))
}
