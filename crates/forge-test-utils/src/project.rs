//! [`TestProject`] builder for deploy scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::TempDir;

/// Manifest file written by [`TestProject::init_manifest`].
pub const MANIFEST_FILE: &str = "fractory.manifest.json";

/// A temporary project directory with helper methods for setup and
/// assertion.
///
/// # Example
///
/// ```rust,no_run
/// use forge_test_utils::TestProject;
///
/// let project = TestProject::new();
/// project.init_manifest(&[("core", "1.0.0")]);
/// project.write_file("config/app.json", "{}");
/// project.assert_file_exists("config/app.json");
/// ```
pub struct TestProject {
    temp_dir: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    /// Create an empty project directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Return the project root.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of a project-relative path.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write a project file, creating parent directories.
    pub fn write_file(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    /// Read a project file as text.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read_file(&self, relative: &str) -> String {
        let path = self.path(relative);
        fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }

    /// Write a manifest listing `bundles` (name, version) with no ownership
    /// entries and no recorded checksums.
    pub fn init_manifest(&self, bundles: &[(&str, &str)]) {
        let bundles: Vec<Value> = bundles
            .iter()
            .map(|(name, version)| json!({"name": name, "version": version}))
            .collect();
        self.write_manifest(json!({
            "name": "test-project",
            "version": "0.1.0",
            "bundles": bundles,
            "checksums": {},
            "lastUpdated": "2024-01-01T00:00:00Z",
            "environment": "development"
        }));
    }

    /// Write an arbitrary manifest document.
    pub fn write_manifest(&self, manifest: Value) {
        self.write_file(
            MANIFEST_FILE,
            &serde_json::to_string_pretty(&manifest).unwrap(),
        );
    }

    /// Parse the manifest as raw JSON.
    pub fn manifest_json(&self) -> Value {
        serde_json::from_str(&self.read_file(MANIFEST_FILE)).unwrap()
    }

    /// Assert that `relative` exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, relative: &str) {
        let full_path = self.path(relative);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `relative` does **not** exist.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_file_not_exists(&self, relative: &str) {
        let full_path = self.path(relative);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `relative` contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, relative: &str, content: &str) {
        let file_content = self.read_file(relative);
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            relative,
            content,
            file_content
        );
    }
}
