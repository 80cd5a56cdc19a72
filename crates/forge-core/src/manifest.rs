//! Project manifest (`fractory.manifest.json`)
//!
//! The manifest lists the bundles installed in a project, their ownership
//! maps, and the checksum of every file as it stood after the last deploy.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use forge_fs::ConfigStore;

use crate::context::ProjectContext;
use crate::ownership::OwnershipRule;
use crate::{Error, Result};

/// File name of the project manifest, at the project root.
pub const MANIFEST_FILE: &str = "fractory.manifest.json";

fn default_environment() -> String {
    "development".to_string()
}

/// A bundle installed in the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    /// Identifier used to locate the bundle's files
    pub name: String,
    /// Opaque version tag
    pub version: String,
    /// Pattern -> rule; unmatched paths use `copy-if-absent`
    #[serde(default)]
    pub ownership: BTreeMap<String, OwnershipRule>,
}

impl Bundle {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ownership: BTreeMap::new(),
        }
    }

    /// Builder-style helper to add an ownership entry.
    pub fn with_rule(mut self, pattern: impl Into<String>, rule: OwnershipRule) -> Self {
        self.ownership.insert(pattern.into(), rule);
        self
    }
}

/// Persistent per-project state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectManifest {
    pub name: String,
    pub version: String,
    /// Installed bundles, in deployment order
    #[serde(default)]
    pub bundles: Vec<Bundle>,
    /// Relative path -> SHA-256 hex digest after the last deploy
    #[serde(default)]
    pub checksums: BTreeMap<String, String>,
    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starter: Option<String>,
}

impl ProjectManifest {
    /// Create an empty manifest.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            bundles: Vec::new(),
            checksums: BTreeMap::new(),
            last_updated: Utc::now(),
            environment: default_environment(),
            starter: None,
        }
    }

    /// Load the manifest of a project.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManifestNotFound`] if the file does not exist, or a
    /// parse error if it is not a valid manifest.
    pub fn load(ctx: &ProjectContext) -> Result<Self> {
        let path = ctx.manifest_path();
        if !path.is_file() {
            return Err(Error::ManifestNotFound { path });
        }
        Ok(ConfigStore::new().load(&path)?)
    }

    /// Save the manifest atomically.
    pub fn save(&self, ctx: &ProjectContext) -> Result<()> {
        ConfigStore::new().save(&ctx.manifest_path(), self)?;
        tracing::debug!(path = %ctx.manifest_path().display(), "Saved project manifest");
        Ok(())
    }

    /// Mark the manifest as modified now.
    pub fn touch(&mut self) {
        self.last_updated = Utc::now();
    }

    /// Get an installed bundle by name.
    pub fn bundle(&self, name: &str) -> Option<&Bundle> {
        self.bundles.iter().find(|b| b.name == name)
    }

    /// Get a mutable reference to an installed bundle by name.
    pub fn bundle_mut(&mut self, name: &str) -> Option<&mut Bundle> {
        self.bundles.iter_mut().find(|b| b.name == name)
    }

    /// Add a bundle, replacing an existing entry of the same name in place.
    pub fn upsert_bundle(&mut self, bundle: Bundle) {
        match self.bundle_mut(&bundle.name) {
            Some(existing) => *existing = bundle,
            None => self.bundles.push(bundle),
        }
        self.touch();
    }

    /// Remove a bundle by name.
    ///
    /// Checksums are left in place; callers prune the paths they clean.
    pub fn remove_bundle(&mut self, name: &str) -> Option<Bundle> {
        let pos = self.bundles.iter().position(|b| b.name == name)?;
        let removed = self.bundles.remove(pos);
        self.touch();
        Some(removed)
    }

    /// Checksum recorded for a relative path at the last deploy.
    pub fn checksum(&self, path: &str) -> Option<&str> {
        self.checksums.get(path).map(String::as_str)
    }

    /// Record the checksum of a deployed file.
    pub fn record_checksum(&mut self, path: impl Into<String>, checksum: impl Into<String>) {
        self.checksums.insert(path.into(), checksum.into());
    }

    /// Forget the checksum of a path.
    pub fn forget_checksum(&mut self, path: &str) -> Option<String> {
        self.checksums.remove(path)
    }
}
