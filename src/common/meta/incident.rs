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

//! Per-incident lifecycle record: `Firing -> Acknowledged -> Resolved`. Lives
//! in the incident store keyed by `incident_key`.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use infra::entity::alert_incidents;

/// Record TTL from last write.
pub const RECORD_TTL_MS: i64 = 7 * 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum IncidentState {
    #[default]
    Firing,
    Acknowledged,
    Resolved,
}

impl std::fmt::Display for IncidentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Firing => write!(f, "firing"),
            Self::Acknowledged => write!(f, "acknowledged"),
            Self::Resolved => write!(f, "resolved"),
        }
    }
}

impl std::str::FromStr for IncidentState {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "firing" => Ok(Self::Firing),
            "acknowledged" => Ok(Self::Acknowledged),
            "resolved" => Ok(Self::Resolved),
            _ => Err("invalid incident state"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IncidentRecord {
    pub incident_key: String,
    pub message_id: Option<String>,
    pub channel_id: String,
    pub thread_id: Option<String>,
    pub state: IncidentState,
    pub rule_name: String,
    pub severity: String,
    pub updated_at: i64,
    pub acknowledged_by: Option<String>,
    pub acknowledged_at: Option<i64>,
    pub resolved_by: Option<String>,
    pub resolved_at: Option<i64>,
    pub mention_level: i32,
}

impl IncidentRecord {
    pub fn into_model(self, now_ms: i64) -> alert_incidents::Model {
        alert_incidents::Model {
            incident_key: self.incident_key,
            message_id: self.message_id,
            channel_id: self.channel_id,
            thread_id: self.thread_id,
            state: self.state.to_string(),
            rule_name: self.rule_name,
            severity: self.severity,
            updated_at: self.updated_at,
            acknowledged_by: self.acknowledged_by,
            acknowledged_at: self.acknowledged_at,
            resolved_by: self.resolved_by,
            resolved_at: self.resolved_at,
            mention_level: self.mention_level,
            expires_at: now_ms + RECORD_TTL_MS,
        }
    }
}

impl From<alert_incidents::Model> for IncidentRecord {
    fn from(model: alert_incidents::Model) -> Self {
        Self {
            incident_key: model.incident_key,
            message_id: model.message_id,
            channel_id: model.channel_id,
            thread_id: model.thread_id,
            state: model.state.parse().unwrap_or_default(),
            rule_name: model.rule_name,
            severity: model.severity,
            updated_at: model.updated_at,
            acknowledged_by: model.acknowledged_by,
            acknowledged_at: model.acknowledged_at,
            resolved_by: model.resolved_by,
            resolved_at: model.resolved_at,
            mention_level: model.mention_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incident_state_round_trips_through_string() {
        for state in [
            IncidentState::Firing,
            IncidentState::Acknowledged,
            IncidentState::Resolved,
        ] {
            let parsed: IncidentState = state.to_string().parse().unwrap();
            assert_eq!(parsed, state);
        }
    }

    #[test]
    fn record_round_trips_through_model() {
        let record = IncidentRecord {
            incident_key: "alert-1:default".to_string(),
            message_id: Some("msg-1".to_string()),
            channel_id: "chan-1".to_string(),
            thread_id: None,
            state: IncidentState::Firing,
            rule_name: "high-cpu".to_string(),
            severity: "critical".to_string(),
            updated_at: 1_000,
            acknowledged_by: None,
            acknowledged_at: None,
            resolved_by: None,
            resolved_at: None,
            mention_level: 0,
        };
        let model = record.clone().into_model(1_000);
        let back: IncidentRecord = model.into();
        assert_eq!(back.incident_key, record.incident_key);
        assert_eq!(back.state, record.state);
    }
}
