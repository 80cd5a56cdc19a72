//! JSON merge strategy

use serde_json::Value;

use super::{MergeOutcome, MergeStrategy};
use crate::{Error, Result};

/// Recursive object merge where the bundle wins on conflicts.
///
/// Objects are merged key by key. Arrays, scalars and type mismatches take
/// the bundle's value. Keys present only in the local file are preserved.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMergeStrategy;

impl MergeStrategy for JsonMergeStrategy {
    fn format(&self) -> &'static str {
        "json"
    }

    fn merge(&self, source: &str, target: &str) -> Result<MergeOutcome> {
        let source: Value = parse(source, "bundle")?;
        let original: Value = parse(target, "local")?;

        let mut merged = original.clone();
        deep_merge(&mut merged, &source);

        if merged == original {
            return Ok(MergeOutcome::Unchanged);
        }

        let mut output = serde_json::to_string_pretty(&merged)?;
        output.push('\n');
        Ok(MergeOutcome::Changed(output))
    }
}

fn parse(content: &str, side: &str) -> Result<Value> {
    serde_json::from_str(content).map_err(|e| Error::Merge {
        format: "JSON",
        message: format!("{} file is not valid JSON: {}", side, e),
    })
}

/// Deep merge `overlay` into `base`.
///
/// If both values are objects, merge them recursively with `overlay` taking
/// precedence. Otherwise, `overlay` replaces `base`.
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                if let Some(base_val) = base_map.get_mut(key) {
                    deep_merge(base_val, overlay_val);
                } else {
                    base_map.insert(key.clone(), overlay_val.clone());
                }
            }
        }
        (base, overlay) => {
            *base = overlay.clone();
        }
    }
}
