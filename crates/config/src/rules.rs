// Copyright 2025 OpenObserve Inc.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Rule configuration: the `rule_name -> RuleConfig` mapping that drives routing,
//! dedup windows, and escalation mentions. Cached in memory behind an `ArcSwap`
//! and backed by a file (bootstrap) and, optionally, a database table (persisted
//! source of truth, merged with the file on startup).

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static RULES: Lazy<ArcSwap<HashMap<String, RuleConfig>>> =
    Lazy::new(|| ArcSwap::from(Arc::new(HashMap::new())));

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleConfig {
    pub channel_id: String,
    #[serde(default = "default_suppress_window_ms")]
    pub suppress_window_ms: i64,
    #[serde(default)]
    pub important_labels: Vec<String>,
    #[serde(default)]
    pub hidden_labels: Vec<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub mentions: Vec<String>,
}

fn default_suppress_window_ms() -> i64 {
    300_000
}

#[derive(Debug, Error)]
pub enum RuleConfigError {
    #[error("rule config must be a JSON object, got: {0}")]
    NotAnObject(&'static str),
    #[error("rule '{0}' is missing a channel_id")]
    MissingChannelId(String),
    #[error("failed to read rule config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse rule config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Returns the cached rule map.
pub fn get_rules() -> Arc<HashMap<String, RuleConfig>> {
    RULES.load().clone()
}

/// Looks up a single rule by name.
pub fn get_rule(rule_name: &str) -> Option<RuleConfig> {
    RULES.load().get(rule_name).cloned()
}

/// Validates a raw JSON document against the `RuleConfig` shape, rejecting
/// anything that isn't an object and any entry without a `channel_id`. Non-string
/// elements of `mentions` are silently dropped rather than rejected, matching the
/// permissive-field/required-shape split used for the webhook normalizer.
pub fn validate(raw: &serde_json::Value) -> Result<HashMap<String, RuleConfig>, RuleConfigError> {
    let obj = raw
        .as_object()
        .ok_or(RuleConfigError::NotAnObject(json_kind(raw)))?;

    let mut parsed = HashMap::with_capacity(obj.len());
    for (name, value) in obj {
        let mut entry: serde_json::Value = value.clone();
        if let Some(map) = entry.as_object_mut() {
            if let Some(mentions) = map.get_mut("mentions") {
                if let Some(arr) = mentions.as_array() {
                    let filtered: Vec<serde_json::Value> = arr
                        .iter()
                        .filter(|v| v.is_string())
                        .cloned()
                        .collect();
                    *mentions = serde_json::Value::Array(filtered);
                }
            }
        }
        if entry.get("channel_id").and_then(|v| v.as_str()).is_none() {
            return Err(RuleConfigError::MissingChannelId(name.clone()));
        }
        let rule: RuleConfig = serde_json::from_value(entry)?;
        parsed.insert(name.clone(), rule);
    }
    Ok(parsed)
}

fn json_kind(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Reads and validates the rule config file, without touching the cache.
pub fn load_from_file(path: &str) -> Result<HashMap<String, RuleConfig>, RuleConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|e| RuleConfigError::Io {
        path: path.to_string(),
        source: e,
    })?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    validate(&value)
}

/// Re-reads the rule config file and, on success, swaps it into the cache. On
/// failure the existing cache is left untouched.
pub fn reload_from_file(path: &str) -> Result<(), RuleConfigError> {
    let parsed = load_from_file(path)?;
    RULES.store(Arc::new(parsed));
    Ok(())
}

/// Validates and installs a rule map directly, bypassing the file. Callers that
/// also persist to a database should write through before calling this.
pub fn push(rules: HashMap<String, RuleConfig>) {
    RULES.store(Arc::new(rules));
}

/// Merges a persisted (database) rule map with a file-loaded one, with file
/// entries winning on key collision — the file is the operator's hand-edited
/// override, the database is the last-synced snapshot.
pub fn merge(
    persisted: HashMap<String, RuleConfig>,
    file: HashMap<String, RuleConfig>,
) -> HashMap<String, RuleConfig> {
    let mut merged = persisted;
    merged.extend(file);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validate_rejects_non_object() {
        let err = validate(&json!(["not", "an", "object"])).unwrap_err();
        assert!(matches!(err, RuleConfigError::NotAnObject("array")));
    }

    #[test]
    fn validate_rejects_missing_channel_id() {
        let err = validate(&json!({"high-cpu": {}})).unwrap_err();
        assert!(matches!(err, RuleConfigError::MissingChannelId(name) if name == "high-cpu"));
    }

    #[test]
    fn validate_filters_non_string_mentions() {
        let parsed = validate(&json!({
            "high-cpu": {
                "channel_id": "123",
                "mentions": ["@oncall", 42, "@lead"],
            }
        }))
        .unwrap();
        assert_eq!(
            parsed["high-cpu"].mentions,
            vec!["@oncall".to_string(), "@lead".to_string()]
        );
    }

    #[test]
    fn validate_applies_default_suppress_window() {
        let parsed = validate(&json!({"high-cpu": {"channel_id": "123"}})).unwrap();
        assert_eq!(parsed["high-cpu"].suppress_window_ms, 300_000);
    }

    #[test]
    fn merge_prefers_file_on_collision() {
        let mut persisted = HashMap::new();
        persisted.insert(
            "high-cpu".to_string(),
            RuleConfig {
                channel_id: "persisted".to_string(),
                suppress_window_ms: 300_000,
                important_labels: vec![],
                hidden_labels: vec![],
                thumbnail_url: None,
                mentions: vec![],
            },
        );
        let mut file = HashMap::new();
        file.insert(
            "high-cpu".to_string(),
            RuleConfig {
                channel_id: "from-file".to_string(),
                suppress_window_ms: 60_000,
                important_labels: vec![],
                hidden_labels: vec![],
                thumbnail_url: None,
                mentions: vec![],
            },
        );
        let merged = merge(persisted, file);
        assert_eq!(merged["high-cpu"].channel_id, "from-file");
    }

    #[test]
    fn default_and_sns_rules_coexist_without_shadowing() {
        let parsed = validate(&json!({
            "default": {"channel_id": "default-channel"},
            "sns": {"channel_id": "sns-channel"},
        }))
        .unwrap();
        assert_eq!(parsed["default"].channel_id, "default-channel");
        assert_eq!(parsed["sns"].channel_id, "sns-channel");
    }
}
