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

//! Core per-alert pipeline: rule lookup -> dedup gate -> lifecycle expiry ->
//! chat emit -> audit. Chat and audit failures are logged, never propagated;
//! the only hard stop is "no rule configured" or "deduped".

use std::sync::Arc;

use config::rules;
use infra::audit::{self, NewAuditEvent};
use infra::incidents as incident_store;

use crate::common::clock::Clock;
use crate::common::meta::alert::{AlertStatus, CanonicalAlert};
use crate::common::meta::incident::IncidentState;
use crate::metrics;
use crate::service::chat::mirror::ChatMirror;
use crate::service::chat::ChatClient;
use crate::service::dedup_gate::{self, GateDecision};

const RESOLVED_REUSE_WINDOW_MS: i64 = 30 * 60 * 1000;
const ACKNOWLEDGED_REUSE_WINDOW_MS: i64 = 90 * 60 * 1000;

pub struct Processor<C: ChatClient> {
    mirror: Arc<ChatMirror<C>>,
    clock: Arc<dyn Clock>,
}

impl<C: ChatClient> Processor<C> {
    pub fn new(mirror: Arc<ChatMirror<C>>, clock: Arc<dyn Clock>) -> Self {
        Self { mirror, clock }
    }

    pub async fn process(&self, mut alert: CanonicalAlert) {
        metrics::ALERTS_RECEIVED
            .with_label_values(&[alert.source.as_str()])
            .inc();

        let Some(rule) = rules::get_rule(&alert.rule_name) else {
            metrics::ALERTS_SUPPRESSED.with_label_values(&["no_config"]).inc();
            log::warn!(
                "component=processor event=no_config alert_id={} rule_name={}",
                alert.alert_id,
                alert.rule_name
            );
            return;
        };

        let now = self.clock.now_ms();

        let decision = match dedup_gate::check(&alert, rule.suppress_window_ms, now).await {
            Ok(decision) => decision,
            Err(e) => {
                log::error!("component=processor event=dedup_error alert_id={} error={e}", alert.alert_id);
                return;
            }
        };
        if decision == GateDecision::Suppressed {
            metrics::ALERTS_SUPPRESSED.with_label_values(&["dedup"]).inc();
            return;
        }

        if let Err(e) = self.expire_stale_incident(&alert, now).await {
            log::error!(
                "component=processor event=lifecycle_expiry_error alert_id={} error={e}",
                alert.alert_id
            );
        }

        alert.clamp_fields();

        let message_id = match self.mirror.emit(&alert, &rule).await {
            Ok(id) => {
                metrics::ALERTS_EMITTED
                    .with_label_values(&[alert.rule_name.as_str()])
                    .inc();
                Some(id)
            }
            Err(e) => {
                metrics::CHAT_API_ERRORS.with_label_values(&["emit"]).inc();
                log::error!("component=processor event=chat_emit_error alert_id={} error={e}", alert.alert_id);
                None
            }
        };

        let event = NewAuditEvent {
            alert_id: alert.alert_id.clone(),
            resource: alert.resource.clone(),
            status: format!("{:?}", alert.status).to_lowercase(),
            message_id,
            channel_id: alert.channel_id.clone(),
            severity: format!("{:?}", alert.severity).to_lowercase(),
            rule_name: alert.rule_name.clone(),
            source: alert.source.clone(),
            acknowledged_by: None,
            resolved_by: None,
        };
        if let Err(e) = audit::append(event, now).await {
            log::warn!("component=processor event=audit_append_error alert_id={} error={e}", alert.alert_id);
        }
    }

    /// Drops the prior incident record if it is "too old" to reuse: resolved
    /// more than 30 minutes ago, or acknowledged more than 90 minutes ago.
    /// Anything newer reuses the existing thread via the chat mirror.
    async fn expire_stale_incident(&self, alert: &CanonicalAlert, now: i64) -> infra::errors::Result<()> {
        if alert.status != AlertStatus::Firing {
            return Ok(());
        }
        let incident_key = alert.incident_key();
        let Some(record) = incident_store::get(&incident_key).await? else {
            return Ok(());
        };
        let state: IncidentState = record.state.parse().unwrap_or_default();

        let stale = match state {
            IncidentState::Resolved => record
                .resolved_at
                .map(|ts| now - ts > RESOLVED_REUSE_WINDOW_MS)
                .unwrap_or(false),
            IncidentState::Acknowledged => record
                .acknowledged_at
                .map(|ts| now - ts > ACKNOWLEDGED_REUSE_WINDOW_MS)
                .unwrap_or(false),
            IncidentState::Firing => false,
        };

        if stale {
            incident_store::delete(&incident_key).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reuse_windows_are_sane() {
        assert!(RESOLVED_REUSE_WINDOW_MS < ACKNOWLEDGED_REUSE_WINDOW_MS);
    }
}
