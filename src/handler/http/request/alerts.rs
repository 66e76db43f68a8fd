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

//! `POST /alerts`: accepts an Alertmanager-shaped webhook batch, normalizes it,
//! and hands each alert to the processor in the background. The body is read
//! as raw bytes and deserialized by hand (rather than the `Json<T>` extractor)
//! so a malformed payload is logged and dropped instead of Axum rejecting it
//! with a 400 — this endpoint always returns 200 to avoid upstream retry
//! storms against a source that can't fix its own payload.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use config::rules;

use crate::handler::http::models::IngestResponse;
use crate::handler::http::AppState;
use crate::service::chat::ChatClient;
use crate::service::normalize::webhook::{self, WebhookPayload};

pub async fn ingest<C: ChatClient + 'static>(
    State(state): State<AppState<C>>,
    body: Bytes,
) -> Json<IngestResponse> {
    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("component=alerts event=parse_error error={e}");
            return Json(IngestResponse { received: true });
        }
    };

    let alerts = webhook::normalize_batch(payload, rules::get_rule, "webhook");

    for alert in alerts {
        let processor = state.processor.clone();
        let permits = state.worker_permits.clone();
        tokio::spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };
            processor.process(alert).await;
        });
    }

    Json(IngestResponse { received: true })
}
