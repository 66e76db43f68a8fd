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

//! SNS-notification-shaped queue envelope -> `CanonicalAlert`.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::common::meta::alert::{AlertStatus, CanonicalAlert, Severity};
use config::RuleConfig;

#[derive(Debug, Deserialize)]
pub struct SnsEnvelope {
    #[serde(default)]
    pub subject: Option<String>,
    pub message: String,
    #[serde(default, rename = "MessageAttributes")]
    pub message_attributes: HashMap<String, SnsMessageAttribute>,
}

#[derive(Debug, Deserialize)]
pub struct SnsMessageAttribute {
    #[serde(rename = "Value")]
    pub value: String,
}

pub fn normalize(
    envelope: SnsEnvelope,
    rule_lookup: impl Fn(&str) -> Option<RuleConfig>,
) -> CanonicalAlert {
    let message: Value = serde_json::from_str(&envelope.message).unwrap_or(Value::Null);

    let rule_name = derive_rule_name(&envelope, &message);
    let rule = rule_lookup(&rule_name);

    let status = if is_resolved(&message) {
        AlertStatus::Resolved
    } else {
        AlertStatus::Firing
    };

    let resource = extract_resource(&message);
    let title = rule_name.clone();
    let description = message
        .get("AlarmDescription")
        .and_then(Value::as_str)
        .unwrap_or("No description")
        .to_string();

    CanonicalAlert {
        alert_id: envelope
            .subject
            .clone()
            .unwrap_or_else(|| rule_name.clone()),
        resource,
        rule_name,
        status,
        severity: Severity::Warning,
        title,
        description,
        fields: Vec::new(),
        started_at: None,
        resolved_at: None,
        channel_id: rule.map(|r| r.channel_id),
        source: "sns".to_string(),
    }
}

fn derive_rule_name(envelope: &SnsEnvelope, message: &Value) -> String {
    let derived = envelope
        .subject
        .clone()
        .filter(|s| !s.is_empty())
        .or_else(|| {
            envelope
                .message_attributes
                .get("event_type")
                .map(|a| a.value.clone())
        })
        .or_else(|| {
            envelope
                .message_attributes
                .get("rule_name")
                .map(|a| a.value.clone())
        })
        .or_else(|| {
            message
                .get("detail-type")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .or_else(|| message.get("source").and_then(Value::as_str).map(str::to_string))
        .or_else(|| {
            message
                .get("eventName")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| "sns".to_string());

    derived.split_whitespace().collect::<Vec<_>>().join("_")
}

fn is_resolved(message: &Value) -> bool {
    message.get("NewStateValue").and_then(Value::as_str) == Some("OK")
        || message
            .get("detail")
            .and_then(|d| d.get("state"))
            .and_then(|s| s.get("value"))
            .and_then(Value::as_str)
            == Some("OK")
}

fn extract_resource(message: &Value) -> Option<String> {
    message
        .get("AlarmName")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| {
            message
                .get("detail")
                .and_then(|d| d.get("resource"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .or_else(|| {
            message
                .get("detail")
                .and_then(|d| d.get("resources"))
                .and_then(Value::as_array)
                .and_then(|arr| arr.first())
                .and_then(Value::as_str)
                .map(str::to_string)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_rules(_: &str) -> Option<RuleConfig> {
        None
    }

    fn envelope(subject: Option<&str>, message: &str) -> SnsEnvelope {
        SnsEnvelope {
            subject: subject.map(str::to_string),
            message: message.to_string(),
            message_attributes: HashMap::new(),
        }
    }

    #[test]
    fn rule_name_prefers_subject() {
        let alert = normalize(
            envelope(Some("High CPU Alarm"), "{}"),
            no_rules,
        );
        assert_eq!(alert.rule_name, "High_CPU_Alarm");
    }

    #[test]
    fn rule_name_falls_back_to_message_fields() {
        let alert = normalize(envelope(None, r#"{"detail-type": "EC2 State Change"}"#), no_rules);
        assert_eq!(alert.rule_name, "EC2_State_Change");
    }

    #[test]
    fn rule_name_falls_back_to_sns_literal() {
        let alert = normalize(envelope(None, "{}"), no_rules);
        assert_eq!(alert.rule_name, "sns");
    }

    #[test]
    fn resolved_detection_new_state_value() {
        let alert = normalize(
            envelope(Some("x"), r#"{"NewStateValue": "OK"}"#),
            no_rules,
        );
        assert_eq!(alert.status, AlertStatus::Resolved);
    }

    #[test]
    fn resolved_detection_detail_state_value() {
        let alert = normalize(
            envelope(Some("x"), r#"{"detail": {"state": {"value": "OK"}}}"#),
            no_rules,
        );
        assert_eq!(alert.status, AlertStatus::Resolved);
    }

    #[test]
    fn resource_extraction_falls_back_to_first_arn() {
        let alert = normalize(
            envelope(
                Some("x"),
                r#"{"detail": {"resources": ["arn:aws:ec2:us-east-1:1:instance/i-1"]}}"#,
            ),
            no_rules,
        );
        assert_eq!(
            alert.resource.as_deref(),
            Some("arn:aws:ec2:us-east-1:1:instance/i-1")
        );
    }
}
