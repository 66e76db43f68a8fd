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

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::common::clock::Clock;
use crate::handler::http::models::{ErrorResponse, GuideQuery, GuideResponse, UpsertGuideRequest};
use crate::handler::http::AppState;
use crate::service::chat::ChatClient;

pub async fn get_guide<C: ChatClient>(
    Query(query): Query<GuideQuery>,
) -> Result<Json<Vec<GuideResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let to_response = |m: infra::entity::troubleshooting_guides::Model| GuideResponse {
        rule_name: m.rule_name,
        content: m.content,
        updated_at: m.updated_at,
    };

    let result = match query.alert_type {
        Some(rule_name) => infra::guides::get(&rule_name)
            .await
            .map(|opt| opt.into_iter().map(to_response).collect()),
        None => infra::guides::get_all()
            .await
            .map(|v| v.into_iter().map(to_response).collect()),
    };

    result.map(Json).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse { error: e.to_string() }),
        )
    })
}

pub async fn upsert_guide<C: ChatClient + 'static>(
    State(state): State<AppState<C>>,
    Json(body): Json<UpsertGuideRequest>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    if config::get_config().database.url.is_empty() {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse { error: "no database configured".to_string() }),
        ));
    }
    let now = state.clock.now_ms();
    infra::guides::upsert(&body.alert_type, &body.content, now)
        .await
        .map(|()| StatusCode::OK)
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse { error: e.to_string() }),
            )
        })
}
