//! Format-aware merge strategies
//!
//! The reconciler looks up a [`MergeStrategy`] by file extension when a path
//! is owned with the `merge` rule. Only JSON is registered by default; files
//! of any other type are skipped rather than overwritten.

mod json;

pub use json::{JsonMergeStrategy, deep_merge};

use std::collections::HashMap;

use crate::Result;

/// Outcome of merging a bundle file into an existing local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The local file already contains everything the bundle contributes
    Unchanged,
    /// New content to write to the local file
    Changed(String),
}

/// Combines a bundle file with the local copy of the same file.
pub trait MergeStrategy: Send + Sync {
    /// Short name of the format, for logs.
    fn format(&self) -> &'static str;

    /// Merge `source` (bundle content) into `target` (local content).
    ///
    /// Must fail without side effects if either input cannot be parsed.
    fn merge(&self, source: &str, target: &str) -> Result<MergeOutcome>;
}

/// Extension-keyed set of merge strategies.
pub struct MergeStrategyRegistry {
    strategies: HashMap<String, Box<dyn MergeStrategy>>,
}

impl MergeStrategyRegistry {
    /// Create a registry with no strategies.
    pub fn empty() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// Create a registry with the built-in strategies.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("json", JsonMergeStrategy);
        registry
    }

    /// Register a strategy for an extension (without the leading dot).
    pub fn register(&mut self, extension: &str, strategy: impl MergeStrategy + 'static) {
        self.strategies
            .insert(extension.to_ascii_lowercase(), Box::new(strategy));
    }

    /// Look up the strategy for an extension, case-insensitively.
    pub fn get(&self, extension: &str) -> Option<&dyn MergeStrategy> {
        self.strategies
            .get(&extension.to_ascii_lowercase())
            .map(|s| s.as_ref())
    }

    /// Registered extensions, sorted.
    pub fn extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.strategies.keys().map(String::as_str).collect();
        exts.sort_unstable();
        exts
    }
}

impl Default for MergeStrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MergeStrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MergeStrategyRegistry")
            .field("extensions", &self.extensions())
            .finish()
    }
}
