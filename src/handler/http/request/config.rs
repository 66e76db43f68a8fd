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

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use config::rules;

use crate::common::clock::Clock;
use crate::handler::http::models::{GetConfigResponse, PushConfigRequest, PushConfigResponse, ReloadResponse};
use crate::handler::http::AppState;
use crate::service::chat::ChatClient;

pub async fn reload() -> Json<ReloadResponse> {
    let cfg = config::get_config();
    match rules::reload_from_file(&cfg.common.rule_config_file_path) {
        Ok(()) => Json(ReloadResponse {
            ok: true,
            entries: Some(rules::get_rules().len()),
            error: None,
        }),
        Err(e) => Json(ReloadResponse { ok: false, entries: None, error: Some(e.to_string()) }),
    }
}

pub async fn get_config() -> Json<GetConfigResponse> {
    Json(GetConfigResponse {
        config: (*rules::get_rules()).clone(),
    })
}

pub async fn push_config<C: ChatClient + 'static>(
    State(state): State<AppState<C>>,
    Json(body): Json<PushConfigRequest>,
) -> (StatusCode, Json<PushConfigResponse>) {
    let now = state.clock.now_ms();
    let raw = match serde_json::to_value(&body.0) {
        Ok(v) => v,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(PushConfigResponse { ok: false, error: Some(e.to_string()) }),
            );
        }
    };
    let validated = match rules::validate(&raw) {
        Ok(v) => v,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(PushConfigResponse { ok: false, error: Some(e.to_string()) }),
            );
        }
    };

    if let Err(e) = infra::rule_store::save(raw, now).await {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(PushConfigResponse { ok: false, error: Some(e.to_string()) }),
        );
    }

    rules::push(validated);

    (StatusCode::OK, Json(PushConfigResponse { ok: true, error: None }))
}
