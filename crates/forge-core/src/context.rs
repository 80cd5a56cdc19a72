//! Project context
//!
//! Every core operation receives an explicit [`ProjectContext`] instead of
//! consulting the process working directory.

use std::path::{Path, PathBuf};

use forge_fs::NormalizedPath;

use crate::Result;
use crate::manifest::MANIFEST_FILE;

/// Directory (relative to the project root) holding forge's own files.
pub const FORGE_DIR: &str = ".fractary";

/// Project configuration file, relative to the project root.
pub const CONFIG_FILE: &str = ".fractary/forge.toml";

/// The project a command operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext {
    root: PathBuf,
}

impl ProjectContext {
    /// Create a context rooted at `root` as given.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Locate the project containing `start`.
    ///
    /// Walks up from `start` looking for `fractory.manifest.json`, git-style.
    /// If none is found, `start` itself becomes the root so that `init` can
    /// create a manifest there.
    pub fn discover(start: &Path) -> Result<Self> {
        let start = forge_fs::canonical_root(start)?;

        let mut current = Some(start.as_path());
        while let Some(dir) = current {
            if dir.join(MANIFEST_FILE).is_file() {
                tracing::debug!(root = %dir.display(), "Found project manifest");
                return Ok(Self::new(dir));
            }
            current = dir.parent();
        }

        Ok(Self::new(start))
    }

    /// The project root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the project manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    /// Path of the optional project configuration file.
    pub fn config_path(&self) -> PathBuf {
        self.target_path(&NormalizedPath::new(CONFIG_FILE))
    }

    /// Project-local bundle source root.
    pub fn local_source_root(&self) -> PathBuf {
        self.root.join(FORGE_DIR)
    }

    /// Absolute target path of a bundle-relative file.
    pub fn target_path(&self, relative: &NormalizedPath) -> PathBuf {
        relative.under(&self.root)
    }
}
