//! Filesystem primitives for the forge bundle deployer
//!
//! Provides normalized relative paths, SHA-256 checksums, atomic writes and
//! format-agnostic config loading.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod path;

pub use checksum::{compute_content_checksum, compute_file_checksum, short_checksum};
pub use config::ConfigStore;
pub use error::{Error, Result};
pub use path::{NormalizedPath, canonical_root};
