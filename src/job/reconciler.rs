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

//! Runs 5 minutes after startup, then every 30 minutes. Walks incidents that
//! are not yet resolved and drops or repairs records the chat backend has
//! forgotten about: a gone channel or message means the incident itself is
//! gone; a gone thread just means the notification scratchpad is gone.

use std::sync::Arc;
use std::time::Duration;

use infra::incidents as incident_store;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::common::meta::incident::IncidentState;
use crate::service::chat::{ChannelKind, ChatClient, ThreadId};

const STARTUP_DELAY: Duration = Duration::from_secs(5 * 60);
const INTERVAL: Duration = Duration::from_secs(30 * 60);

pub async fn run<C: ChatClient>(client: Arc<C>, shutdown: CancellationToken) {
    tokio::select! {
        _ = shutdown.cancelled() => return,
        _ = time::sleep(STARTUP_DELAY) => {}
    }

    let mut interval = time::interval(INTERVAL);
    loop {
        if let Err(e) = tick(&client).await {
            log::error!("component=reconciler event=tick_error error={e}");
        }
        tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = interval.tick() => {}
        }
    }
}

async fn tick<C: ChatClient>(client: &C) -> infra::errors::Result<()> {
    let mut cursor = None;
    loop {
        let page = incident_store::list_keys(cursor, incident_store::DEFAULT_PAGE_SIZE).await?;
        if page.is_empty() {
            break;
        }
        let next_cursor = page.last().map(|r| (r.updated_at, r.incident_key.clone()));

        for record in &page {
            let state: IncidentState = record.state.parse().unwrap_or_default();
            if state == IncidentState::Resolved {
                continue;
            }
            if let Err(e) = reconcile_one(client, record).await {
                log::error!(
                    "component=reconciler event=reconcile_error incident_key={} error={e}",
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

async fn reconcile_one<C: ChatClient>(
    client: &C,
    record: &infra::entity::alert_incidents::Model,
) -> infra::errors::Result<()> {
    match client.fetch_channel(&record.channel_id).await {
        None => {
            incident_store::delete(&record.incident_key).await?;
            return Ok(());
        }
        Some(ChannelKind::Dm) | Some(ChannelKind::Other) => {
            incident_store::delete(&record.incident_key).await?;
            return Ok(());
        }
        Some(ChannelKind::Text) => {}
    }

    let Some(message_id) = &record.message_id else {
        incident_store::delete(&record.incident_key).await?;
        return Ok(());
    };
    if client.fetch_message(&record.channel_id, message_id).await.is_none() {
        incident_store::delete(&record.incident_key).await?;
        return Ok(());
    }

    if let Some(thread_id) = &record.thread_id {
        if client.fetch_thread(&ThreadId(thread_id.clone())).await.is_none() {
            incident_store::clear_thread(&record.incident_key).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_delay_precedes_interval() {
        assert!(STARTUP_DELAY < INTERVAL);
    }
}
