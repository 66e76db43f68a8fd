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

//! Reflects a `CanonicalAlert` into exactly one Discord message per
//! `incident_key`. Concurrent emits for the same key are serialized by a
//! sharded map of keyed mutexes, reclaimed once the guard's last holder drops.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use config::RuleConfig;
use infra::audit::{self, NewAuditEvent};
use infra::entity::alert_incidents;
use infra::{dedup, incidents as incident_store};

use crate::common::clock::Clock;
use crate::common::meta::alert::{AlertStatus, CanonicalAlert};
use crate::common::meta::incident::{IncidentRecord, IncidentState};
use crate::service::chat::{Button, ButtonKind, ChatClient, Embed};

const ACK_MENTION_DELAY_MS: i64 = 60 * 60 * 1000;
const TROUBLESHOOT_CHUNK_LEN: usize = 2000;

pub struct ChatMirror<C: ChatClient> {
    client: Arc<C>,
    clock: Arc<dyn Clock>,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl<C: ChatClient> ChatMirror<C> {
    pub fn new(client: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            clock,
            locks: DashMap::new(),
        }
    }

    fn lock_for(&self, incident_key: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(incident_key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Reflects `alert` into chat, creating or updating its incident record.
    /// Returns the resulting message id.
    pub async fn emit(&self, alert: &CanonicalAlert, rule: &RuleConfig) -> infra::errors::Result<String> {
        let incident_key = alert.incident_key();
        let guard = self.lock_for(&incident_key);
        let _held = guard.lock().await;

        let now = self.clock.now_ms();
        let existing = incident_store::get(&incident_key).await?;

        let message_id = match existing {
            Some(record) if record.message_id.is_some() => {
                self.update_existing(alert, rule, record, now).await?
            }
            _ => self.create_new(alert, rule, now).await?,
        };

        Ok(message_id)
    }

    async fn update_existing(
        &self,
        alert: &CanonicalAlert,
        rule: &RuleConfig,
        record: alert_incidents::Model,
        now: i64,
    ) -> infra::errors::Result<String> {
        let incident: IncidentRecord = record.clone().into();
        let message_id = record.message_id.clone().unwrap();

        if self
            .client
            .fetch_message(&record.channel_id, &message_id)
            .await
            .is_none()
        {
            return self.create_new(alert, rule, now).await;
        }

        let embed = build_embed(alert, rule);
        let buttons = buttons_for_status(alert.status, &incident.incident_key);
        let _ = self
            .client
            .edit_message(&record.channel_id, &message_id, &embed, &buttons)
            .await;

        if alert.status == AlertStatus::Firing {
            if let Some(thread_id) = record.thread_id.clone().map(super::ThreadId) {
                let _ = self.client.post_in_thread(&thread_id, "🔁 Alert repeated").await;

                if incident.state == IncidentState::Acknowledged {
                    if let Some(ack_at) = incident.acknowledged_at {
                        if now - ack_at > ACK_MENTION_DELAY_MS {
                            if let Some(first) = rule.mentions.first() {
                                let _ = self
                                    .client
                                    .post_in_thread(&thread_id, &format!("{first} still firing"))
                                    .await;
                            }
                        }
                    }
                }
            }
        }

        let resolved_at = if alert.status == AlertStatus::Resolved {
            Some(alert.resolved_at.unwrap_or(now))
        } else {
            incident.resolved_at
        };
        let state = match alert.status {
            AlertStatus::Resolved => IncidentState::Resolved,
            AlertStatus::Firing => IncidentState::Firing,
        };

        let updated = IncidentRecord {
            incident_key: incident.incident_key,
            message_id: Some(message_id.clone()),
            channel_id: record.channel_id,
            thread_id: record.thread_id,
            state,
            rule_name: alert.rule_name.clone(),
            severity: format!("{:?}", alert.severity).to_lowercase(),
            updated_at: now,
            acknowledged_by: incident.acknowledged_by,
            acknowledged_at: incident.acknowledged_at,
            resolved_by: incident.resolved_by,
            resolved_at,
            mention_level: incident.mention_level,
        };
        incident_store::put(updated.into_model(now)).await?;

        Ok(message_id)
    }

    async fn create_new(
        &self,
        alert: &CanonicalAlert,
        rule: &RuleConfig,
        now: i64,
    ) -> infra::errors::Result<String> {
        let embed = build_embed(alert, rule);
        let buttons = buttons_for_status(alert.status, &alert.incident_key());
        let channel_id = alert
            .channel_id
            .clone()
            .unwrap_or_else(|| rule.channel_id.clone());

        let sent = self
            .client
            .send_message(&channel_id, &embed, &buttons)
            .await
            .map_err(|e| infra::errors::Error::Message(e.to_string()))?;

        let title_prefix: String = alert.title.chars().take(50).collect();
        let thread = self
            .client
            .create_thread(&channel_id, &sent.message_id, &format!("Incident: {title_prefix}"))
            .await
            .ok();

        let record = IncidentRecord {
            incident_key: alert.incident_key(),
            message_id: Some(sent.message_id.clone()),
            channel_id,
            thread_id: thread.map(|t| t.0),
            state: IncidentState::Firing,
            rule_name: alert.rule_name.clone(),
            severity: format!("{:?}", alert.severity).to_lowercase(),
            updated_at: now,
            acknowledged_by: None,
            acknowledged_at: None,
            resolved_by: None,
            resolved_at: None,
            mention_level: 0,
        };
        incident_store::put(record.into_model(now)).await?;

        Ok(sent.message_id)
    }

    pub async fn acknowledge(
        &self,
        incident_key: &str,
        user_id: &str,
        rule: &RuleConfig,
    ) -> infra::errors::Result<()> {
        let guard = self.lock_for(incident_key);
        let _held = guard.lock().await;
        let now = self.clock.now_ms();

        let Some(record) = incident_store::get(incident_key).await? else {
            return Ok(());
        };
        let mut incident: IncidentRecord = record.into();
        incident.state = IncidentState::Acknowledged;
        incident.acknowledged_by = Some(user_id.to_string());
        incident.acknowledged_at = Some(now);

        dedup::set_ttl(
            incident_key.split(':').next().unwrap_or(incident_key),
            rule.suppress_window_ms.max(10 * 60 * 1000),
            now,
        )
        .await?;

        incident_store::put(incident.clone().into_model(now)).await?;

        let event = audit_event_for(&incident, "acknowledged", Some(user_id.to_string()), None);
        if let Err(e) = audit::append(event, now).await {
            log::warn!("component=chat_mirror event=audit_append_error incident_key={incident_key} error={e}");
        }

        Ok(())
    }

    pub async fn resolve(&self, incident_key: &str, user_id: &str) -> infra::errors::Result<()> {
        let guard = self.lock_for(incident_key);
        let _held = guard.lock().await;
        let now = self.clock.now_ms();

        let Some(record) = incident_store::get(incident_key).await? else {
            return Ok(());
        };
        let mut incident: IncidentRecord = record.into();
        incident.state = IncidentState::Resolved;
        incident.resolved_by = Some(user_id.to_string());
        incident.resolved_at = Some(now);

        dedup::clear(incident_key.split(':').next().unwrap_or(incident_key)).await?;

        incident_store::put(incident.clone().into_model(now)).await?;

        let event = audit_event_for(&incident, "resolved", None, Some(user_id.to_string()));
        if let Err(e) = audit::append(event, now).await {
            log::warn!("component=chat_mirror event=audit_append_error incident_key={incident_key} error={e}");
        }

        Ok(())
    }

    pub async fn troubleshoot(&self, incident_key: &str, guide: Option<&str>) -> infra::errors::Result<()> {
        let Some(record) = incident_store::get(incident_key).await? else {
            return Ok(());
        };

        let destination = record.thread_id.clone().map(super::ThreadId);
        let content = guide.unwrap_or("No troubleshooting guide configured for this rule.");

        for chunk in chunk_for_discord(content) {
            match &destination {
                Some(thread_id) => {
                    let _ = self.client.post_in_thread(thread_id, &chunk).await;
                }
                None => {
                    let _ = self.client.post_in_channel(&record.channel_id, &chunk).await;
                }
            }
        }
        Ok(())
    }
}

/// Builds the audit row for a button-driven lifecycle transition. `alert_id`
/// and `resource` are recovered from `incident_key` the same way
/// `CanonicalAlert::incident_key` built it (`default` means "no resource").
fn audit_event_for(
    incident: &IncidentRecord,
    status: &str,
    acknowledged_by: Option<String>,
    resolved_by: Option<String>,
) -> NewAuditEvent {
    let (alert_id, resource) = match incident.incident_key.split_once(':') {
        Some((id, "default")) => (id.to_string(), None),
        Some((id, res)) => (id.to_string(), Some(res.to_string())),
        None => (incident.incident_key.clone(), None),
    };

    NewAuditEvent {
        alert_id,
        resource,
        status: status.to_string(),
        message_id: incident.message_id.clone(),
        channel_id: Some(incident.channel_id.clone()),
        severity: incident.severity.clone(),
        rule_name: incident.rule_name.clone(),
        source: "discord_interaction".to_string(),
        acknowledged_by,
        resolved_by,
    }
}

/// Button custom_ids carry the incident_key so the `/interactions` handler
/// can resolve a click back to a record without a side lookup table.
fn buttons_for_status(status: AlertStatus, incident_key: &str) -> Vec<Button> {
    match status {
        AlertStatus::Firing => vec![
            Button {
                kind: ButtonKind::Acknowledge,
                label: "Acknowledge".to_string(),
                custom_id: format!("ack:{incident_key}"),
            },
            Button {
                kind: ButtonKind::Resolve,
                label: "Resolve".to_string(),
                custom_id: format!("resolve:{incident_key}"),
            },
            Button {
                kind: ButtonKind::Troubleshoot,
                label: "Troubleshoot".to_string(),
                custom_id: format!("troubleshoot:{incident_key}"),
            },
        ],
        AlertStatus::Resolved => Vec::new(),
    }
}

fn build_embed(alert: &CanonicalAlert, rule: &RuleConfig) -> Embed {
    let color = match alert.status {
        AlertStatus::Resolved => 0x2ecc71,
        AlertStatus::Firing => match alert.severity {
            crate::common::meta::alert::Severity::Critical => 0xe74c3c,
            crate::common::meta::alert::Severity::High => 0xe67e22,
            crate::common::meta::alert::Severity::Warning => 0xf1c40f,
            crate::common::meta::alert::Severity::Info => 0x3498db,
        },
    };

    Embed {
        title: alert.title.clone(),
        description: alert.description.clone(),
        color,
        fields: alert.fields.clone(),
        thumbnail_url: rule.thumbnail_url.clone(),
    }
}

/// Splits troubleshooting content on line boundaries so each chunk fits
/// Discord's 2000-character message limit without cutting a line mid-way.
fn chunk_for_discord(content: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in content.lines() {
        if current.len() + line.len() + 1 > TROUBLESHOOT_CHUNK_LEN {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    if chunks.is_empty() {
        chunks.push(String::new());
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_for_discord_respects_limit() {
        let long_line = "x".repeat(500);
        let content = std::iter::repeat(long_line).take(10).collect::<Vec<_>>().join("\n");
        let chunks = chunk_for_discord(&content);
        assert!(chunks.iter().all(|c| c.len() <= TROUBLESHOOT_CHUNK_LEN));
        assert!(chunks.len() > 1);
    }

    #[test]
    fn chunk_for_discord_single_chunk_for_short_content() {
        let chunks = chunk_for_discord("short guide");
        assert_eq!(chunks, vec!["short guide".to_string()]);
    }
}
