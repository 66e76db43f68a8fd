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

//! Axum router assembly. Generic over `ChatClient` so the same wiring serves
//! the `serenity`-backed production client and the in-memory test client.

pub mod auth;
pub mod models;
pub mod request;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{middleware, Router};
use tokio::sync::Semaphore;

use crate::common::clock::Clock;
use crate::service::chat::mirror::ChatMirror;
use crate::service::chat::ChatClient;
use crate::service::processor::Processor;

#[derive(Clone)]
pub struct AppState<C: ChatClient> {
    pub mirror: Arc<ChatMirror<C>>,
    pub processor: Arc<Processor<C>>,
    pub clock: Arc<dyn Clock>,
    /// Bounds alerts processed concurrently out of `POST /alerts`, so a burst
    /// in the source webhook can't spawn an unbounded number of tasks.
    pub worker_permits: Arc<Semaphore>,
}

pub fn router<C: ChatClient + 'static>(state: AppState<C>) -> Router {
    let protected = Router::new()
        .route("/alerts", post(request::alerts::ingest::<C>))
        .route("/reload", get(request::config::reload).post(request::config::reload))
        .route("/get-config", get(request::config::get_config))
        .route("/push-config", post(request::config::push_config::<C>))
        .route(
            "/troubleshooting-guide",
            get(request::guides::get_guide::<C>).post(request::guides::upsert_guide::<C>),
        )
        .route("/interactions", post(request::interactions::interactions::<C>))
        .route("/health", get(request::health::health))
        .route("/metrics", get(request::metrics::metrics))
        .route_layer(middleware::from_fn(auth::require_bearer));

    Router::new().merge(protected).with_state(state)
}
