//! [`TestRegistry`] builder for bundle and starter sources.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempDir;

/// A temporary source root laid out as `bundles/<name>/...` and
/// `starters/<name>/...`.
///
/// # Example
///
/// ```rust,no_run
/// use forge_test_utils::TestRegistry;
///
/// let registry = TestRegistry::new();
/// registry.add_bundle_file("core", "src/main.rs", "fn main() {}");
/// registry.add_descriptor("core", serde_json::json!({"version": "1.0.0"}));
/// ```
pub struct TestRegistry {
    temp_dir: TempDir,
}

impl Default for TestRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRegistry {
    /// Create an empty registry root.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Root to pass as a bundle search path.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Directory of a bundle.
    pub fn bundle_dir(&self, bundle: &str) -> PathBuf {
        self.root().join("bundles").join(bundle)
    }

    /// Directory of a starter.
    pub fn starter_dir(&self, starter: &str) -> PathBuf {
        self.root().join("starters").join(starter)
    }

    /// Write a file shipped by `bundle`.
    pub fn add_bundle_file(&self, bundle: &str, relative: &str, content: &str) -> PathBuf {
        write(&self.bundle_dir(bundle).join(relative), content)
    }

    /// Delete a file from `bundle`.
    pub fn remove_bundle_file(&self, bundle: &str, relative: &str) {
        fs::remove_file(self.bundle_dir(bundle).join(relative)).unwrap();
    }

    /// Write `bundle.json` for a bundle.
    pub fn add_descriptor(&self, bundle: &str, descriptor: Value) {
        write(
            &self.bundle_dir(bundle).join("bundle.json"),
            &serde_json::to_string_pretty(&descriptor).unwrap(),
        );
    }

    /// Write a file shipped by `starter`.
    pub fn add_starter_file(&self, starter: &str, relative: &str, content: &str) -> PathBuf {
        write(&self.starter_dir(starter).join(relative), content)
    }
}

fn write(path: &Path, content: &str) -> PathBuf {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
    path.to_path_buf()
}
