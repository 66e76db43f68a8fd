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

//! Request/response DTOs for the HTTP surface, kept separate from the
//! internal `CanonicalAlert`/`RuleConfig` shapes so wire format and domain
//! model can drift independently.

use std::collections::HashMap;

use config::RuleConfig;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct IngestResponse {
    pub received: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReloadResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GetConfigResponse {
    pub config: HashMap<String, RuleConfig>,
}

#[derive(Debug, Deserialize)]
pub struct PushConfigRequest(pub HashMap<String, RuleConfig>);

#[derive(Debug, Serialize, ToSchema)]
pub struct PushConfigResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GuideQuery {
    pub alert_type: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertGuideRequest {
    pub alert_type: String,
    pub content: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GuideResponse {
    pub rule_name: String,
    pub content: String,
    pub updated_at: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
