//! Error types for forge-core

use std::path::PathBuf;

/// Result type for forge-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in forge-core operations
///
/// Only project-level problems surface here. Failures scoped to a single file
/// or a single bundle are downgraded to skipped results by the deployer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No project manifest at the expected path
    #[error("Project manifest not found at {path} (run `forge init` first)")]
    ManifestNotFound { path: PathBuf },

    /// A manifest already exists and would be overwritten
    #[error("Project manifest already exists at {path}")]
    ManifestExists { path: PathBuf },

    /// Bundle is not listed in the project manifest
    #[error("Bundle '{name}' is not installed in this project")]
    BundleNotInstalled { name: String },

    /// Bundle is already listed in the project manifest
    #[error("Bundle '{name}' is already installed (use --force to reinstall)")]
    BundleAlreadyInstalled { name: String },

    /// Bundle could not be located in any bundle source
    #[error("Bundle '{name}' was not found in any bundle source")]
    BundleNotFound { name: String },

    /// Starter could not be located in any bundle source
    #[error("Starter '{name}' was not found in any bundle source")]
    StarterNotFound { name: String },

    /// Asset names must be a single path segment
    #[error("Invalid asset name '{name}': {reason}")]
    InvalidAssetName { name: String, reason: String },

    /// Ownership overrides could not be parsed
    #[error("Invalid ownership map: {message}")]
    InvalidOwnership { message: String },

    /// A merge strategy could not parse or combine its inputs
    #[error("Cannot merge {format} content: {message}")]
    Merge {
        format: &'static str,
        message: String,
    },

    /// Filesystem error from forge-fs
    #[error(transparent)]
    Fs(#[from] forge_fs::Error),

    /// Error while walking a bundle directory
    #[error(transparent)]
    Walk(#[from] walkdir::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error is a problem with the project's configuration rather
    /// than with the environment.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ManifestNotFound { .. }
                | Self::ManifestExists { .. }
                | Self::BundleNotInstalled { .. }
                | Self::BundleAlreadyInstalled { .. }
                | Self::BundleNotFound { .. }
                | Self::StarterNotFound { .. }
                | Self::InvalidAssetName { .. }
                | Self::InvalidOwnership { .. }
                | Self::Fs(forge_fs::Error::ConfigParse { .. })
        )
    }
}
