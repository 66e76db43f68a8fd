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

//! `POST /interactions`: Discord's button-callback webhook. Verified against
//! the Ed25519 request-signature scheme Discord documents for interaction
//! endpoints, then dispatched to the matching lifecycle transition.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde_json::{json, Value};

use crate::handler::http::AppState;
use crate::service::chat::ChatClient;

const PING: u64 = 1;
const MESSAGE_COMPONENT: u64 = 3;

pub async fn interactions<C: ChatClient + 'static>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !verify_signature(&headers, &body) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };

    let interaction_type = payload.get("type").and_then(Value::as_u64).unwrap_or(0);
    if interaction_type == PING {
        return Json(json!({"type": 1})).into_response();
    }
    if interaction_type != MESSAGE_COMPONENT {
        return Json(json!({"type": 6})).into_response();
    }

    let custom_id = payload
        .pointer("/data/custom_id")
        .and_then(Value::as_str)
        .unwrap_or("");
    let user_id = payload
        .pointer("/member/user/id")
        .or_else(|| payload.pointer("/user/id"))
        .and_then(Value::as_str)
        .unwrap_or("unknown");

    let Some((action, incident_key)) = custom_id.split_once(':') else {
        return Json(json!({"type": 6})).into_response();
    };

    let result = match action {
        "ack" => {
            let rule_name = infra::incidents::get(incident_key)
                .await
                .ok()
                .flatten()
                .map(|r| r.rule_name);
            let rule = rule_name
                .and_then(|name| config::rules::get_rule(&name))
                .unwrap_or_else(default_rule);
            state.mirror.acknowledge(incident_key, user_id, &rule).await
        }
        "resolve" => state.mirror.resolve(incident_key, user_id).await,
        "troubleshoot" => {
            let guide = match infra::incidents::get(incident_key).await {
                Ok(Some(record)) => infra::guides::get(&record.rule_name)
                    .await
                    .ok()
                    .flatten()
                    .map(|g| g.content),
                _ => None,
            };
            state.mirror.troubleshoot(incident_key, guide.as_deref()).await
        }
        _ => return Json(json!({"type": 6})).into_response(),
    };

    if let Err(e) = result {
        log::error!("component=interactions event=dispatch_error action={action} error={e}");
    }

    Json(json!({"type": 6})).into_response()
}

fn verify_signature(headers: &HeaderMap, body: &[u8]) -> bool {
    let cfg = config::get_config();
    if cfg.discord.public_key.is_empty() {
        return true;
    }

    let Some(signature_hex) = headers.get("X-Signature-Ed25519").and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let Some(timestamp) = headers.get("X-Signature-Timestamp").and_then(|v| v.to_str().ok()) else {
        return false;
    };

    let Ok(public_key_bytes) = hex::decode(&cfg.discord.public_key) else {
        return false;
    };
    let Ok(public_key_array): Result<[u8; 32], _> = public_key_bytes.try_into() else {
        return false;
    };
    let Ok(verifying_key) = VerifyingKey::from_bytes(&public_key_array) else {
        return false;
    };

    let Ok(signature_bytes) = hex::decode(signature_hex) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(&signature_bytes) else {
        return false;
    };

    let mut message = timestamp.as_bytes().to_vec();
    message.extend_from_slice(body);

    verifying_key.verify(&message, &signature).is_ok()
}

/// Fallback used when the rule backing an incident has since been removed
/// from config; acknowledge should still extend the dedup TTL by the default
/// window rather than fail the interaction.
fn default_rule() -> config::RuleConfig {
    config::RuleConfig {
        channel_id: String::new(),
        suppress_window_ms: 300_000,
        important_labels: Vec::new(),
        hidden_labels: Vec::new(),
        thumbnail_url: None,
        mentions: Vec::new(),
    }
}
