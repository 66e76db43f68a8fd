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

//! Every 60s, walks firing critical incidents and posts leveled mentions the
//! longer they go unacknowledged. Ticking `mention_level` must never touch
//! `updated_at`: that field is the escalation clock, and resetting it would
//! push every later threshold further out.

use std::sync::Arc;
use std::time::Duration;

use config::rules;
use infra::entity::alert_incidents;
use infra::incidents as incident_store;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::common::clock::Clock;
use crate::common::meta::incident::IncidentState;
use crate::service::chat::{ChatClient, ThreadId};

const TICK: Duration = Duration::from_secs(60);
const LEVEL_WINDOW_MS: i64 = 5 * 60 * 1000;

pub async fn run<C: ChatClient>(client: Arc<C>, clock: Arc<dyn Clock>, shutdown: CancellationToken) {
    let mut interval = time::interval(TICK);
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = interval.tick() => {
                if let Err(e) = tick(&client, clock.as_ref()).await {
                    log::error!("component=escalation event=tick_error error={e}");
                }
            }
        }
    }
}

async fn tick<C: ChatClient>(client: &C, clock: &dyn Clock) -> infra::errors::Result<()> {
    let now = clock.now_ms();
    let mut cursor = None;

    loop {
        let page = incident_store::list_keys(cursor, incident_store::DEFAULT_PAGE_SIZE).await?;
        if page.is_empty() {
            break;
        }
        let next_cursor = page.last().map(|r| (r.updated_at, r.incident_key.clone()));

        for record in &page {
            if let Err(e) = escalate_one(client, record, now).await {
                log::error!(
                    "component=escalation event=escalate_error incident_key={} error={e}",
                    record.incident_key
                );
            }
        }

        if page.len() < incident_store::DEFAULT_PAGE_SIZE as usize {
            break;
        }
        cursor = next_cursor.as_ref().map(|(ts, key)| (*ts, key.as_str()));
    }
    Ok(())
}

async fn escalate_one<C: ChatClient>(
    client: &C,
    record: &alert_incidents::Model,
    now: i64,
) -> infra::errors::Result<()> {
    let state: IncidentState = record.state.parse().unwrap_or_default();
    if state != IncidentState::Firing || record.severity != "critical" {
        return Ok(());
    }

    let Some(rule) = rules::get_rule(&record.rule_name) else {
        return Ok(());
    };
    if rule.mentions.is_empty() {
        return Ok(());
    }

    let level = record.mention_level as usize;
    if level >= rule.mentions.len() {
        return Ok(());
    }

    let elapsed = now - record.updated_at;
    let threshold = (level as i64 + 1) * LEVEL_WINDOW_MS;
    if elapsed < threshold {
        return Ok(());
    }

    let mention = &rule.mentions[level];
    let message = format!("@{mention} escalation level {} for this incident", level + 1);

    match record.thread_id.clone() {
        Some(thread) => {
            let _ = client.post_in_thread(&ThreadId(thread), &message).await;
        }
        None => {
            let _ = client.post_in_channel(&record.channel_id, &message).await;
        }
    }

    let mut next = record.clone();
    next.mention_level = level as i32 + 1;
    incident_store::put(next).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_window_is_five_minutes() {
        assert_eq!(LEVEL_WINDOW_MS, 5 * 60 * 1000);
    }
}
