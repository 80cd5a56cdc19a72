//! Normalized path handling for cross-platform compatibility

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// A path normalized to use forward slashes internally.
///
/// Relative bundle paths are stored and compared in this form (they are the
/// keys of the manifest's checksum map and the subjects of ownership
/// patterns), and converted to platform-native form only at I/O boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    ///
    /// Converts backslashes to forward slashes and drops `.` segments.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        let replaced = path_str.replace('\\', "/");
        let absolute = replaced.starts_with('/');

        let segments: Vec<&str> = replaced
            .split('/')
            .filter(|s| !s.is_empty() && *s != ".")
            .collect();

        let mut inner = segments.join("/");
        if absolute {
            inner.insert(0, '/');
        }
        Self { inner }
    }

    /// Compute `path` relative to `base`, normalized.
    ///
    /// Returns `None` if `path` is not below `base`.
    pub fn relative(path: &Path, base: &Path) -> Option<Self> {
        path.strip_prefix(base).ok().map(Self::new)
    }

    /// Whether this path stays below whatever root it is joined to.
    ///
    /// False for absolute paths, drive-prefixed paths and paths with `..`
    /// segments.
    pub fn is_contained(&self) -> bool {
        if self.inner.is_empty() || self.inner.starts_with('/') {
            return false;
        }
        let first = self.inner.split('/').next().unwrap_or_default();
        !first.contains(':') && self.inner.split('/').all(|s| s != "..")
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        self.inner.split('/').filter(|s| !s.is_empty()).fold(
            if self.inner.starts_with('/') {
                PathBuf::from("/")
            } else {
                PathBuf::new()
            },
            |acc, segment| acc.join(segment),
        )
    }

    /// Resolve this relative path under a native root directory.
    pub fn under(&self, root: &Path) -> PathBuf {
        root.join(self.to_native())
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        self.inner.rsplit('/').next().filter(|s| !s.is_empty())
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 {
                None
            } else {
                Some(&name[idx + 1..])
            }
        })
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.inner)
    }
}

/// Canonicalize a project root without the `\\?\` prefix on Windows.
pub fn canonical_root(path: &Path) -> Result<PathBuf> {
    dunce::canonicalize(path).map_err(|e| Error::io(path, e))
}
