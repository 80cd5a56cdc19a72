//! Ownership rule resolution
//!
//! An ownership map assigns [`OwnershipRule`]s to path patterns. Resolution
//! is a fixed priority ladder:
//!
//! 1. exact path match
//! 2. directory prefix, longest prefix wins
//! 3. glob, first match in lexicographic key order
//! 4. the map's default rule (`copy-if-absent` unless overridden)

mod pattern;
mod rule;

pub use pattern::OwnershipPattern;
pub use rule::OwnershipRule;

use std::collections::BTreeMap;

use crate::{Error, Result};

/// Resolved ownership patterns for one bundle.
#[derive(Debug, Clone, Default)]
pub struct OwnershipMap {
    exact: BTreeMap<String, OwnershipRule>,
    /// Sorted longest-first, ties broken lexicographically
    prefixes: Vec<(String, OwnershipRule)>,
    /// Sorted lexicographically by pattern
    globs: Vec<(OwnershipPattern, OwnershipRule)>,
    default: OwnershipRule,
}

impl OwnershipMap {
    /// Create an empty map resolving everything to `copy-if-absent`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from the `ownership` table of a bundle.
    pub fn from_rules<'a>(rules: impl IntoIterator<Item = (&'a String, &'a OwnershipRule)>) -> Self {
        let mut map = Self::new();
        for (key, rule) in rules {
            map.insert(key, *rule);
        }
        map
    }

    /// Parse a JSON object of `pattern -> rule`, as given on the command line.
    pub fn parse_overrides(json: &str) -> Result<BTreeMap<String, OwnershipRule>> {
        serde_json::from_str(json).map_err(|e| Error::InvalidOwnership {
            message: e.to_string(),
        })
    }

    /// Change the rule used when no pattern matches.
    pub fn with_default(mut self, rule: OwnershipRule) -> Self {
        self.default = rule;
        self
    }

    /// Add or replace the rule for a pattern key.
    pub fn insert(&mut self, key: &str, rule: OwnershipRule) {
        match OwnershipPattern::parse(key) {
            Ok(OwnershipPattern::Exact(path)) => {
                self.exact.insert(path, rule);
            }
            Ok(OwnershipPattern::DirectoryPrefix(prefix)) => {
                self.prefixes.retain(|(existing, _)| existing != &prefix);
                self.prefixes.push((prefix, rule));
                self.prefixes
                    .sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
            }
            Ok(glob @ OwnershipPattern::Glob { .. }) => {
                self.globs.retain(|(existing, _)| existing != &glob);
                self.globs.push((glob, rule));
                self.globs.sort_by(|(a, _), (b, _)| a.as_str().cmp(b.as_str()));
            }
            Err(e) => {
                tracing::warn!(pattern = key, error = %e, "Ignoring unusable ownership pattern");
            }
        }
    }

    /// Number of patterns in the map.
    pub fn len(&self) -> usize {
        self.exact.len() + self.prefixes.len() + self.globs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve the rule for a bundle-relative path.
    pub fn resolve(&self, relative_path: &str) -> OwnershipRule {
        self.resolve_with_pattern(relative_path)
            .map(|(_, rule)| rule)
            .unwrap_or(self.default)
    }

    /// Resolve the rule for a path together with the key that produced it.
    ///
    /// Returns `None` when the default rule applies.
    pub fn resolve_with_pattern(&self, relative_path: &str) -> Option<(&str, OwnershipRule)> {
        if let Some((key, rule)) = self.exact.get_key_value(relative_path) {
            return Some((key.as_str(), *rule));
        }

        if let Some((prefix, rule)) = self
            .prefixes
            .iter()
            .find(|(prefix, _)| relative_path.starts_with(prefix.as_str()))
        {
            return Some((prefix.as_str(), *rule));
        }

        self.globs
            .iter()
            .find(|(glob, _)| glob.matches(relative_path))
            .map(|(glob, rule)| (glob.as_str(), *rule))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn build(entries: &[(&str, OwnershipRule)]) -> OwnershipMap {
        let mut map = OwnershipMap::new();
        for (key, rule) in entries {
            map.insert(key, *rule);
        }
        map
    }

    #[test]
    fn exact_beats_prefix_beats_glob() {
        let map = build(&[
            ("a/b.txt", OwnershipRule::Ignore),
            ("a/", OwnershipRule::Copy),
            ("*.txt", OwnershipRule::CopyIfAbsent),
        ]);

        assert_eq!(map.resolve("a/b.txt"), OwnershipRule::Ignore);
        assert_eq!(map.resolve("a/c.txt"), OwnershipRule::Copy);
        assert_eq!(map.resolve("z.txt"), OwnershipRule::CopyIfAbsent);
    }

    #[test]
    fn prefix_beats_glob_regardless_of_insertion_order() {
        let map = build(&[
            ("*.json", OwnershipRule::Merge),
            ("config/", OwnershipRule::Ignore),
        ]);

        assert_eq!(map.resolve("config/app.json"), OwnershipRule::Ignore);
        assert_eq!(map.resolve("app.json"), OwnershipRule::Merge);
    }

    #[test]
    fn longest_prefix_wins() {
        let shallow_first = build(&[
            ("src/", OwnershipRule::Copy),
            ("src/components/", OwnershipRule::Ignore),
        ]);
        let deep_first = build(&[
            ("src/components/", OwnershipRule::Ignore),
            ("src/", OwnershipRule::Copy),
        ]);

        for map in [shallow_first, deep_first] {
            assert_eq!(map.resolve("src/components/button.tsx"), OwnershipRule::Ignore);
            assert_eq!(map.resolve("src/index.ts"), OwnershipRule::Copy);
        }
    }

    #[test]
    fn globs_resolve_in_lexicographic_order() {
        let map = build(&[
            ("docs/*", OwnershipRule::Copy),
            ("*.md", OwnershipRule::Merge),
        ]);

        // "*.md" sorts before "docs/*"
        assert_eq!(map.resolve("docs/guide.md"), OwnershipRule::Merge);
        assert_eq!(map.resolve("docs/logo.svg"), OwnershipRule::Copy);
    }

    #[test]
    fn unmatched_path_uses_default() {
        let map = build(&[("src/", OwnershipRule::Copy)]);
        assert_eq!(map.resolve("README.md"), OwnershipRule::CopyIfAbsent);
        assert_eq!(map.resolve_with_pattern("README.md"), None);

        let map = map.with_default(OwnershipRule::Ignore);
        assert_eq!(map.resolve("README.md"), OwnershipRule::Ignore);
    }

    #[test]
    fn insert_replaces_existing_key() {
        let mut map = build(&[("src/", OwnershipRule::Copy), ("*.rs", OwnershipRule::Copy)]);
        map.insert("src/", OwnershipRule::Ignore);
        map.insert("*.rs", OwnershipRule::Merge);

        assert_eq!(map.len(), 2);
        assert_eq!(map.resolve("src/lib.rs"), OwnershipRule::Ignore);
        assert_eq!(map.resolve("build.rs"), OwnershipRule::Merge);
    }

    #[test]
    fn resolve_reports_matching_key() {
        let map = build(&[("config/", OwnershipRule::Merge)]);
        assert_eq!(
            map.resolve_with_pattern("config/app.json"),
            Some(("config/", OwnershipRule::Merge))
        );
    }

    #[test]
    fn parse_overrides_reads_json_object() {
        let overrides =
            OwnershipMap::parse_overrides(r#"{"src/": "copy", "*.json": "merge"}"#).unwrap();
        assert_eq!(overrides.get("src/"), Some(&OwnershipRule::Copy));
        assert_eq!(overrides.get("*.json"), Some(&OwnershipRule::Merge));
    }

    #[test]
    fn parse_overrides_rejects_bad_rule() {
        let result = OwnershipMap::parse_overrides(r#"{"src/": "clobber"}"#);
        assert!(matches!(result, Err(Error::InvalidOwnership { .. })));
    }
}
