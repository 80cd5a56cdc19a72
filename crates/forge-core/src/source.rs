//! Bundle sources
//!
//! A [`BundleSource`] locates the files shipped by a bundle (or a starter).
//! The deployer and diff reporter only see this trait; the built-in
//! [`DirectoryBundleSource`] serves assets from local directories laid out as
//!
//! ```text
//! <root>/bundles/<name>/...    bundle files
//! <root>/bundles/<name>/bundle.json    optional descriptor
//! <root>/starters/<name>/...   starter files
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use forge_fs::{ConfigStore, NormalizedPath, io};

use crate::ownership::OwnershipRule;
use crate::{Error, Result};

/// Descriptor file inside an asset directory. Never deployed.
pub const DESCRIPTOR_FILE: &str = "bundle.json";

/// Version recorded for assets without a descriptor.
pub const DEFAULT_VERSION: &str = "0.0.0";

/// Kind of asset a source can resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Bundle,
    Starter,
}

impl AssetKind {
    /// Directory under a source root holding assets of this kind.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Bundle => "bundles",
            Self::Starter => "starters",
        }
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bundle => f.write_str("bundle"),
            Self::Starter => f.write_str("starter"),
        }
    }
}

/// Metadata shipped alongside an asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Default ownership applied when the bundle is installed
    #[serde(default)]
    pub ownership: BTreeMap<String, OwnershipRule>,
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

/// One file shipped by a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleFile {
    /// Path relative to the bundle root, also the path under the project
    pub relative: NormalizedPath,
    /// Where the file can be read from
    pub absolute: PathBuf,
}

/// A fully materialized asset.
#[derive(Debug, Clone)]
pub struct ResolvedAsset {
    pub descriptor: BundleDescriptor,
    pub files: BTreeMap<NormalizedPath, Vec<u8>>,
}

/// Supplies bundle and starter file sets.
pub trait BundleSource {
    /// Files shipped by a bundle, sorted by relative path.
    ///
    /// Returns `Ok(None)` when the bundle cannot be located.
    fn bundle_files(&self, name: &str) -> Result<Option<Vec<BundleFile>>>;

    /// Descriptor of an asset, or `None` when it cannot be located.
    fn describe(&self, name: &str, kind: AssetKind) -> Result<Option<BundleDescriptor>>;

    /// Load an asset's descriptor and file contents.
    fn resolve_asset(&self, name: &str, kind: AssetKind) -> Result<Option<ResolvedAsset>>;
}

/// Serves assets from an ordered list of local directories.
///
/// The first root containing the asset wins.
#[derive(Debug, Clone, Default)]
pub struct DirectoryBundleSource {
    roots: Vec<PathBuf>,
}

impl DirectoryBundleSource {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Search roots, in priority order.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Directory of an asset, if any root provides it.
    pub fn locate(&self, name: &str, kind: AssetKind) -> Result<Option<PathBuf>> {
        validate_asset_name(name)?;
        let found = self
            .roots
            .iter()
            .map(|root| root.join(kind.dir_name()).join(name))
            .find(|dir| dir.is_dir());
        match &found {
            Some(dir) => tracing::debug!(asset = name, %kind, dir = %dir.display(), "Located asset"),
            None => tracing::debug!(asset = name, %kind, roots = ?self.roots, "Asset not found"),
        }
        Ok(found)
    }

    fn walk(dir: &Path) -> Result<Vec<BundleFile>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(relative) = NormalizedPath::relative(entry.path(), dir) else {
                continue;
            };
            if relative.as_str() == DESCRIPTOR_FILE {
                continue;
            }
            files.push(BundleFile {
                relative,
                absolute: entry.into_path(),
            });
        }
        files.sort_by(|a, b| a.relative.cmp(&b.relative));
        Ok(files)
    }

    fn read_descriptor(dir: &Path, name: &str) -> Result<BundleDescriptor> {
        let path = dir.join(DESCRIPTOR_FILE);
        let mut descriptor: BundleDescriptor = if path.is_file() {
            ConfigStore::new().load(&path)?
        } else {
            BundleDescriptor::default()
        };
        if descriptor.name.is_empty() {
            descriptor.name = name.to_string();
        }
        if descriptor.version.is_empty() {
            descriptor.version = default_version();
        }
        Ok(descriptor)
    }
}

impl BundleSource for DirectoryBundleSource {
    fn bundle_files(&self, name: &str) -> Result<Option<Vec<BundleFile>>> {
        match self.locate(name, AssetKind::Bundle)? {
            Some(dir) => Ok(Some(Self::walk(&dir)?)),
            None => Ok(None),
        }
    }

    fn describe(&self, name: &str, kind: AssetKind) -> Result<Option<BundleDescriptor>> {
        match self.locate(name, kind)? {
            Some(dir) => Ok(Some(Self::read_descriptor(&dir, name)?)),
            None => Ok(None),
        }
    }

    fn resolve_asset(&self, name: &str, kind: AssetKind) -> Result<Option<ResolvedAsset>> {
        let Some(dir) = self.locate(name, kind)? else {
            return Ok(None);
        };

        let descriptor = Self::read_descriptor(&dir, name)?;
        let mut files = BTreeMap::new();
        for file in Self::walk(&dir)? {
            files.insert(file.relative, io::read_bytes(&file.absolute)?);
        }

        Ok(Some(ResolvedAsset { descriptor, files }))
    }
}

/// Asset names must be a single, non-hidden path segment.
pub fn validate_asset_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("name is empty")
    } else if name.contains('/') || name.contains('\\') {
        Some("name must not contain path separators")
    } else if name.starts_with('.') {
        Some("name must not start with '.'")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::InvalidAssetName {
            name: name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}
