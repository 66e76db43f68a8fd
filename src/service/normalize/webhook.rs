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

//! Alertmanager-shaped webhook batch -> `CanonicalAlert`.

use std::collections::BTreeMap;

use rand::Rng;
use serde::Deserialize;

use crate::common::meta::alert::{AlertStatus, CanonicalAlert, Field, Severity};
use crate::common::utils::sanitize::{is_sentinel_timestamp, sanitize_text};
use config::RuleConfig;

#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub alerts: Vec<WebhookAlertItem>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookAlertItem {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub fingerprint: Option<String>,
    #[serde(default, rename = "startsAt")]
    pub starts_at: Option<String>,
    #[serde(default, rename = "endsAt")]
    pub ends_at: Option<String>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

const ALLOWED_SEVERITIES: [&str; 4] = ["info", "warning", "high", "critical"];

/// Converts one batch into canonical alerts, looking up each item's rule
/// config (for `important_labels`/`hidden_labels`) along the way.
pub fn normalize_batch(
    payload: WebhookPayload,
    rule_lookup: impl Fn(&str) -> Option<RuleConfig>,
    source: &str,
) -> Vec<CanonicalAlert> {
    payload
        .alerts
        .into_iter()
        .map(|item| normalize_item(item, &rule_lookup, source))
        .collect()
}

fn normalize_item(
    item: WebhookAlertItem,
    rule_lookup: &impl Fn(&str) -> Option<RuleConfig>,
    source: &str,
) -> CanonicalAlert {
    let rule_name = item
        .labels
        .get("alertname")
        .or_else(|| item.labels.get("alert_type"))
        .cloned()
        .unwrap_or_else(|| "default".to_string());

    let alert_id = item.fingerprint.clone().unwrap_or_else(|| {
        let nonce: u64 = rand::rng().random();
        format!("{rule_name}-{}-{nonce}", item.starts_at.as_deref().unwrap_or(""))
    });

    let resource = ["instance", "DBInstanceIdentifier", "resource"]
        .iter()
        .find_map(|key| item.labels.get(*key))
        .filter(|v| !v.is_empty())
        .cloned();

    let status = if item.status.eq_ignore_ascii_case("resolved") {
        AlertStatus::Resolved
    } else {
        AlertStatus::Firing
    };

    let severity = item
        .labels
        .get("severity")
        .map(|s| s.to_lowercase())
        .filter(|s| ALLOWED_SEVERITIES.contains(&s.as_str()))
        .map(|s| match s.as_str() {
            "info" => Severity::Info,
            "high" => Severity::High,
            "critical" => Severity::Critical,
            _ => Severity::Warning,
        })
        .unwrap_or_default();

    let description = item
        .annotations
        .get("summary")
        .or_else(|| item.annotations.get("description"))
        .map(|s| sanitize_text(s))
        .unwrap_or_else(|| "No description".to_string());

    let title = item
        .labels
        .get("alertname")
        .cloned()
        .unwrap_or_else(|| rule_name.clone());

    let rule = rule_lookup(&rule_name);
    let fields = build_fields(&item.labels, &item.annotations, rule.as_ref());

    let resolved_at = item
        .ends_at
        .as_deref()
        .filter(|ts| !is_sentinel_timestamp(ts))
        .and_then(|ts| chrono::DateTime::parse_from_rfc3339(ts).ok())
        .map(|dt| dt.timestamp_millis());

    let started_at = item
        .starts_at
        .as_deref()
        .filter(|ts| !is_sentinel_timestamp(ts))
        .and_then(|ts| chrono::DateTime::parse_from_rfc3339(ts).ok())
        .map(|dt| dt.timestamp_millis());

    CanonicalAlert {
        alert_id,
        resource,
        rule_name,
        status,
        severity,
        title,
        description,
        fields,
        started_at,
        resolved_at,
        channel_id: rule.map(|r| r.channel_id),
        source: source.to_string(),
    }
}

fn build_fields(
    labels: &BTreeMap<String, String>,
    annotations: &BTreeMap<String, String>,
    rule: Option<&RuleConfig>,
) -> Vec<Field> {
    let mut fields = Vec::new();
    let hidden: Vec<&str> = rule
        .map(|r| r.hidden_labels.iter().map(String::as_str).collect())
        .unwrap_or_default();

    if let Some(rule) = rule {
        if !rule.important_labels.is_empty() {
            let key_info = rule
                .important_labels
                .iter()
                .filter_map(|name| labels.get(name).map(|v| format!("{name}={v}")))
                .collect::<Vec<_>>()
                .join(", ");
            if !key_info.is_empty() {
                fields.push(Field {
                    name: "Key info".to_string(),
                    value: key_info,
                });
            }
        }
    }

    for (name, value) in labels {
        if name == "alertname" || hidden.contains(&name.as_str()) {
            continue;
        }
        fields.push(Field {
            name: name.clone(),
            value: value.clone(),
        });
    }

    for (name, value) in annotations {
        fields.push(Field {
            name: name.clone(),
            value: sanitize_text(value),
        });
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_rules(_: &str) -> Option<RuleConfig> {
        None
    }

    #[test]
    fn rule_name_falls_back_to_alert_type_then_default() {
        let mut item = WebhookAlertItem {
            status: "firing".to_string(),
            fingerprint: Some("fp1".to_string()),
            starts_at: None,
            ends_at: None,
            labels: BTreeMap::new(),
            annotations: BTreeMap::new(),
        };
        let alert = normalize_item(item.clone(), &no_rules, "grafana");
        assert_eq!(alert.rule_name, "default");

        item.labels.insert("alert_type".to_string(), "disk-full".to_string());
        let alert = normalize_item(item.clone(), &no_rules, "grafana");
        assert_eq!(alert.rule_name, "disk-full");

        item.labels.insert("alertname".to_string(), "HighCpu".to_string());
        let alert = normalize_item(item, &no_rules, "grafana");
        assert_eq!(alert.rule_name, "HighCpu");
    }

    #[test]
    fn status_resolved_is_case_insensitive() {
        let item = WebhookAlertItem {
            status: "RESOLVED".to_string(),
            fingerprint: Some("fp1".to_string()),
            starts_at: None,
            ends_at: None,
            labels: BTreeMap::new(),
            annotations: BTreeMap::new(),
        };
        let alert = normalize_item(item, &no_rules, "grafana");
        assert_eq!(alert.status, AlertStatus::Resolved);
    }

    #[test]
    fn severity_falls_back_to_warning_for_unknown_value() {
        let mut item = WebhookAlertItem {
            status: "firing".to_string(),
            fingerprint: Some("fp1".to_string()),
            starts_at: None,
            ends_at: None,
            labels: BTreeMap::new(),
            annotations: BTreeMap::new(),
        };
        item.labels.insert("severity".to_string(), "banana".to_string());
        let alert = normalize_item(item, &no_rules, "grafana");
        assert_eq!(alert.severity, Severity::Warning);
    }

    #[test]
    fn sentinel_ends_at_is_treated_as_absent() {
        let item = WebhookAlertItem {
            status: "resolved".to_string(),
            fingerprint: Some("fp1".to_string()),
            starts_at: None,
            ends_at: Some("0001-01-01T00:00:00Z".to_string()),
            labels: BTreeMap::new(),
            annotations: BTreeMap::new(),
        };
        let alert = normalize_item(item, &no_rules, "grafana");
        assert_eq!(alert.resolved_at, None);
    }

    #[test]
    fn description_falls_back_through_summary_description_default() {
        let mut item = WebhookAlertItem {
            status: "firing".to_string(),
            fingerprint: Some("fp1".to_string()),
            starts_at: None,
            ends_at: None,
            labels: BTreeMap::new(),
            annotations: BTreeMap::new(),
        };
        let alert = normalize_item(item.clone(), &no_rules, "grafana");
        assert_eq!(alert.description, "No description");

        item.annotations
            .insert("description".to_string(), "fallback desc".to_string());
        let alert = normalize_item(item.clone(), &no_rules, "grafana");
        assert_eq!(alert.description, "fallback desc");

        item.annotations
            .insert("summary".to_string(), "preferred %!f(<nil>)".to_string());
        let alert = normalize_item(item, &no_rules, "grafana");
        assert_eq!(alert.description, "preferred N/A");
    }

    #[test]
    fn resource_prefers_instance_over_other_keys() {
        let mut item = WebhookAlertItem {
            status: "firing".to_string(),
            fingerprint: Some("fp1".to_string()),
            starts_at: None,
            ends_at: None,
            labels: BTreeMap::new(),
            annotations: BTreeMap::new(),
        };
        item.labels
            .insert("resource".to_string(), "generic-resource".to_string());
        item.labels
            .insert("instance".to_string(), "db-1".to_string());
        let alert = normalize_item(item, &no_rules, "grafana");
        assert_eq!(alert.resource.as_deref(), Some("db-1"));
    }
}
