//! SHA-256 checksum utilities
//!
//! Checksums are the lowercase hex digest of the raw bytes, with no prefix.
//! This is the value persisted in `fractory.manifest.json`; the shortened form
//! from [`short_checksum`] is for display only.

use sha2::{Digest, Sha256};
use std::path::Path;

/// Number of hex characters shown when a checksum is displayed.
pub const SHORT_LEN: usize = 8;

/// Compute the SHA-256 checksum of in-memory bytes.
pub fn compute_content_checksum(content: impl AsRef<[u8]>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_ref());
    format!("{:x}", hasher.finalize())
}

/// Compute the SHA-256 checksum of a file's contents.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn compute_file_checksum(path: &Path) -> std::io::Result<String> {
    let content = std::fs::read(path)?;
    Ok(compute_content_checksum(content))
}

/// Truncate a checksum for display.
pub fn short_checksum(checksum: &str) -> &str {
    match checksum.char_indices().nth(SHORT_LEN) {
        Some((idx, _)) => &checksum[..idx],
        None => checksum,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn known_digest_without_prefix() {
        assert_eq!(
            compute_content_checksum("hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn empty_content_has_a_digest() {
        assert_eq!(
            compute_content_checksum(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn one_byte_changes_the_digest() {
        assert_ne!(
            compute_content_checksum("{\"a\": 1}"),
            compute_content_checksum("{\"a\": 2}")
        );
    }

    #[test]
    fn file_digest_covers_raw_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        let bytes = [0u8, 159, 146, 150, b'\n'];
        std::fs::write(&path, bytes).unwrap();

        assert_eq!(
            compute_file_checksum(&path).unwrap(),
            compute_content_checksum(bytes)
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(compute_file_checksum(&dir.path().join("absent")).is_err());
    }

    #[test]
    fn short_checksum_truncates_for_display() {
        let checksum = compute_content_checksum("hello world");
        assert_eq!(short_checksum(&checksum), "b94d27b9");
        assert_eq!(short_checksum("abc"), "abc");
    }
}
