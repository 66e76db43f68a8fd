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

//! Sweeps `alert_events` on startup and then hourly. An unset TTL disables
//! the sweep entirely rather than running with some implicit default.

use std::time::Duration;

use infra::audit;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::common::clock::Clock;

const INTERVAL: Duration = Duration::from_secs(60 * 60);

pub async fn run(clock: std::sync::Arc<dyn Clock>, ttl_raw: String, shutdown: CancellationToken) {
    let Some(ttl_ms) = audit::parse_ttl_ms(&ttl_raw) else {
        log::info!("component=audit_retention event=disabled");
        return;
    };

    sweep_once(clock.as_ref(), ttl_ms).await;

    let mut interval = time::interval(INTERVAL);
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = interval.tick() => {
                sweep_once(clock.as_ref(), ttl_ms).await;
            }
        }
    }
}

async fn sweep_once(clock: &dyn Clock, ttl_ms: i64) {
    let cutoff = clock.now_ms() - ttl_ms;
    match audit::sweep(cutoff).await {
        Ok(rows) => log::info!("component=audit_retention event=swept rows={rows}"),
        Err(e) => log::error!("component=audit_retention event=sweep_error error={e}"),
    }
}
