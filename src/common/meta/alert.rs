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

//! The single internal alert representation every normalizer converts into,
//! and every downstream stage (dedup, processor, chat mirror) consumes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Firing,
    Resolved,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    High,
    Critical,
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Warning
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Field {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CanonicalAlert {
    pub alert_id: String,
    #[serde(default)]
    pub resource: Option<String>,
    pub rule_name: String,
    pub status: AlertStatus,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub started_at: Option<i64>,
    #[serde(default)]
    pub resolved_at: Option<i64>,
    #[serde(default)]
    pub channel_id: Option<String>,
    pub source: String,
}

/// Discord embed field count limit.
pub const MAX_FIELDS: usize = 25;
/// Discord embed field value length limit.
pub const MAX_FIELD_VALUE_LEN: usize = 1024;

impl CanonicalAlert {
    /// The stable key identifying one logical incident across repeated
    /// deliveries of the same alert.
    pub fn incident_key(&self) -> String {
        format!(
            "{}:{}",
            self.alert_id,
            self.resource.as_deref().unwrap_or("default")
        )
    }

    /// Truncates `fields` to the Discord embed limits. Excess fields are
    /// dropped from the tail; over-long values are truncated, not rejected.
    pub fn clamp_fields(&mut self) {
        self.fields.truncate(MAX_FIELDS);
        for field in &mut self.fields {
            if field.value.len() > MAX_FIELD_VALUE_LEN {
                field.value.truncate(MAX_FIELD_VALUE_LEN);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CanonicalAlert {
        CanonicalAlert {
            alert_id: "alert-1".to_string(),
            resource: Some("db-primary".to_string()),
            rule_name: "high-cpu".to_string(),
            status: AlertStatus::Firing,
            severity: Severity::Critical,
            title: "High CPU".to_string(),
            description: "CPU above 90%".to_string(),
            fields: vec![],
            started_at: Some(1_000),
            resolved_at: None,
            channel_id: Some("chan-1".to_string()),
            source: "grafana".to_string(),
        }
    }

    #[test]
    fn incident_key_combines_alert_id_and_resource() {
        assert_eq!(sample().incident_key(), "alert-1:db-primary");
    }

    #[test]
    fn incident_key_defaults_resource() {
        let mut a = sample();
        a.resource = None;
        assert_eq!(a.incident_key(), "alert-1:default");
    }

    #[test]
    fn clamp_fields_truncates_count_and_length() {
        let mut a = sample();
        for i in 0..30 {
            a.fields.push(Field {
                name: format!("f{i}"),
                value: "x".repeat(2000),
            });
        }
        a.clamp_fields();
        assert_eq!(a.fields.len(), MAX_FIELDS);
        assert!(a.fields.iter().all(|f| f.value.len() <= MAX_FIELD_VALUE_LEN));
    }

    #[test]
    fn severity_default_is_warning() {
        assert_eq!(Severity::default(), Severity::Warning);
    }
}
