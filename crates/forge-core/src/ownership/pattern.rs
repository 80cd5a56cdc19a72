//! Ownership path patterns

use regex::Regex;

/// One key of an ownership map, classified by shape.
///
/// Keys containing `*` are globs, keys ending in `/` are directory prefixes,
/// anything else must match the relative path exactly.
#[derive(Debug, Clone)]
pub enum OwnershipPattern {
    /// Matches a single relative path
    Exact(String),
    /// Matches every path under a directory (key ends with `/`)
    DirectoryPrefix(String),
    /// `*` matches any run of characters, including `/`
    Glob { pattern: String, regex: Regex },
}

impl OwnershipPattern {
    /// Classify an ownership map key.
    pub fn parse(key: &str) -> Result<Self, regex::Error> {
        if key.contains('*') {
            let body = key
                .split('*')
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(".*");
            let regex = Regex::new(&format!("^{}$", body))?;
            Ok(Self::Glob {
                pattern: key.to_string(),
                regex,
            })
        } else if key.ends_with('/') {
            Ok(Self::DirectoryPrefix(key.to_string()))
        } else {
            Ok(Self::Exact(key.to_string()))
        }
    }

    /// The original map key.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Exact(path) => path,
            Self::DirectoryPrefix(prefix) => prefix,
            Self::Glob { pattern, .. } => pattern,
        }
    }

    /// Whether this pattern applies to `path`.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(exact) => exact == path,
            Self::DirectoryPrefix(prefix) => path.starts_with(prefix.as_str()),
            Self::Glob { regex, .. } => regex.is_match(path),
        }
    }
}

impl PartialEq for OwnershipPattern {
    fn eq(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
            && self.as_str() == other.as_str()
    }
}

impl Eq for OwnershipPattern {}
