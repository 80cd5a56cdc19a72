//! Ownership rules

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Per-path policy governing how a bundle file may touch its target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OwnershipRule {
    /// Bundle is authoritative; overwrite unless the target was edited locally
    Copy,
    /// Create the target only if it does not exist yet
    #[default]
    CopyIfAbsent,
    /// Combine source and target using a format-aware merge strategy
    Merge,
    /// Never touch the target
    Ignore,
}

impl OwnershipRule {
    /// All rules, in declaration order.
    pub const ALL: [OwnershipRule; 4] = [
        OwnershipRule::Copy,
        OwnershipRule::CopyIfAbsent,
        OwnershipRule::Merge,
        OwnershipRule::Ignore,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Copy => "copy",
            Self::CopyIfAbsent => "copy-if-absent",
            Self::Merge => "merge",
            Self::Ignore => "ignore",
        }
    }
}

impl fmt::Display for OwnershipRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OwnershipRule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|rule| rule.as_str() == s)
            .ok_or_else(|| Error::InvalidOwnership {
                message: format!(
                    "unknown rule '{}' (expected one of: copy, copy-if-absent, merge, ignore)",
                    s
                ),
            })
    }
}
