//! Project configuration (`.fractary/forge.toml`)
//!
//! Optional. Adds bundle search roots and project-wide ownership defaults on
//! top of what the manifest declares.
//!
//! ```toml
//! bundle_paths = ["../shared-bundles"]
//!
//! [default_ownership]
//! "*.lock" = "ignore"
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use forge_fs::ConfigStore;

use crate::Result;
use crate::context::{FORGE_DIR, ProjectContext};
use crate::ownership::OwnershipRule;
use crate::source::DirectoryBundleSource;

/// Settings read from the project configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForgeConfig {
    /// Extra bundle source roots; relative paths are resolved from the project root
    #[serde(default)]
    pub bundle_paths: Vec<PathBuf>,

    /// Ownership entries applied beneath every bundle's own table
    #[serde(default)]
    pub default_ownership: BTreeMap<String, OwnershipRule>,

    /// Environment recorded in new manifests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}

impl ForgeConfig {
    /// Load the project configuration, or defaults if the file is absent.
    pub fn load(ctx: &ProjectContext) -> Result<Self> {
        let path = ctx.config_path();
        if !path.is_file() {
            return Ok(Self::default());
        }
        tracing::debug!(path = %path.display(), "Loading project configuration");
        Ok(ConfigStore::new().load(&path)?)
    }

    /// Bundle source roots in priority order.
    ///
    /// 1. `extra` roots (command line / environment)
    /// 2. `bundle_paths` from this configuration
    /// 3. the project's own `.fractary/`
    /// 4. the user's `~/.fractary/`
    pub fn search_roots(&self, ctx: &ProjectContext, extra: &[PathBuf]) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = Vec::new();
        let configured = self.bundle_paths.iter().map(|p| ctx.root().join(p));

        for root in extra
            .iter()
            .cloned()
            .chain(configured)
            .chain(std::iter::once(ctx.local_source_root()))
            .chain(dirs::home_dir().map(|home| home.join(FORGE_DIR)))
        {
            if !roots.contains(&root) {
                roots.push(root);
            }
        }
        roots
    }

    /// Build the directory source for this project.
    pub fn bundle_source(&self, ctx: &ProjectContext, extra: &[PathBuf]) -> DirectoryBundleSource {
        DirectoryBundleSource::new(self.search_roots(ctx, extra))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn missing_config_is_default() {
        let temp = TempDir::new().unwrap();
        let ctx = ProjectContext::new(temp.path());
        assert_eq!(ForgeConfig::load(&ctx).unwrap(), ForgeConfig::default());
    }

    #[test]
    fn loads_toml_config() {
        let temp = TempDir::new().unwrap();
        let ctx = ProjectContext::new(temp.path());
        fs::create_dir_all(temp.path().join(FORGE_DIR)).unwrap();
        fs::write(
            ctx.config_path(),
            "bundle_paths = [\"vendor/bundles\"]\nenvironment = \"staging\"\n\n[default_ownership]\n\"*.lock\" = \"ignore\"\n",
        )
        .unwrap();

        let config = ForgeConfig::load(&ctx).unwrap();
        assert_eq!(config.bundle_paths, vec![PathBuf::from("vendor/bundles")]);
        assert_eq!(config.environment.as_deref(), Some("staging"));
        assert_eq!(
            config.default_ownership.get("*.lock"),
            Some(&OwnershipRule::Ignore)
        );
    }

    #[test]
    fn search_roots_are_ordered_and_deduplicated() {
        let ctx = ProjectContext::new("/project");
        let config = ForgeConfig {
            bundle_paths: vec![PathBuf::from("shared"), PathBuf::from("/cli")],
            ..Default::default()
        };

        let roots = config.search_roots(&ctx, &[PathBuf::from("/cli")]);

        assert_eq!(roots[0], PathBuf::from("/cli"));
        assert_eq!(roots[1], PathBuf::from("/project/shared"));
        assert_eq!(roots[2], PathBuf::from("/project").join(FORGE_DIR));
        assert_eq!(roots.iter().filter(|r| **r == PathBuf::from("/cli")).count(), 1);
    }
}
