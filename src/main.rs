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

//! Process entrypoint: loads configuration, connects the database, bootstraps
//! rule config, wires the chat client into the mirror/processor, spawns the
//! background jobs and the queue poller, then serves the HTTP router until a
//! shutdown signal arrives.

mod common;
mod handler;
mod ingress;
mod job;
mod metrics;
mod service;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::common::clock::{Clock, SystemClock};
use crate::handler::http::AppState;
use crate::service::chat::memory_client::InMemoryChatClient;
use crate::service::chat::mirror::ChatMirror;
use crate::service::chat::serenity_client::SerenityChatClient;
use crate::service::chat::{Button, ChannelKind, ChatClient, ChatMessage, ChatResult, Embed, ThreadId};
use crate::service::processor::Processor;

/// Picks between the production Discord client and the in-memory fallback at
/// startup, so the rest of the binary stays generic over a single concrete
/// `ChatClient` rather than threading a second type parameter everywhere.
enum AnyChatClient {
    Discord(SerenityChatClient),
    Memory(InMemoryChatClient),
}

#[async_trait]
impl ChatClient for AnyChatClient {
    async fn send_message(&self, channel_id: &str, embed: &Embed, buttons: &[Button]) -> ChatResult<ChatMessage> {
        match self {
            Self::Discord(c) => c.send_message(channel_id, embed, buttons).await,
            Self::Memory(c) => c.send_message(channel_id, embed, buttons).await,
        }
    }

    async fn edit_message(
        &self,
        channel_id: &str,
        message_id: &str,
        embed: &Embed,
        buttons: &[Button],
    ) -> ChatResult<()> {
        match self {
            Self::Discord(c) => c.edit_message(channel_id, message_id, embed, buttons).await,
            Self::Memory(c) => c.edit_message(channel_id, message_id, embed, buttons).await,
        }
    }

    async fn create_thread(&self, channel_id: &str, message_id: &str, name: &str) -> ChatResult<ThreadId> {
        match self {
            Self::Discord(c) => c.create_thread(channel_id, message_id, name).await,
            Self::Memory(c) => c.create_thread(channel_id, message_id, name).await,
        }
    }

    async fn post_in_thread(&self, thread_id: &ThreadId, content: &str) -> ChatResult<()> {
        match self {
            Self::Discord(c) => c.post_in_thread(thread_id, content).await,
            Self::Memory(c) => c.post_in_thread(thread_id, content).await,
        }
    }

    async fn post_in_channel(&self, channel_id: &str, content: &str) -> ChatResult<()> {
        match self {
            Self::Discord(c) => c.post_in_channel(channel_id, content).await,
            Self::Memory(c) => c.post_in_channel(channel_id, content).await,
        }
    }

    async fn fetch_message(&self, channel_id: &str, message_id: &str) -> Option<ChatMessage> {
        match self {
            Self::Discord(c) => c.fetch_message(channel_id, message_id).await,
            Self::Memory(c) => c.fetch_message(channel_id, message_id).await,
        }
    }

    async fn fetch_channel(&self, channel_id: &str) -> Option<ChannelKind> {
        match self {
            Self::Discord(c) => c.fetch_channel(channel_id).await,
            Self::Memory(c) => c.fetch_channel(channel_id).await,
        }
    }

    async fn fetch_thread(&self, thread_id: &ThreadId) -> Option<()> {
        match self {
            Self::Discord(c) => c.fetch_thread(thread_id).await,
            Self::Memory(c) => c.fetch_thread(thread_id).await,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cfg = config::get_config();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cfg.log.level)).init();
    metrics::init();

    if let Err(e) = infra::init().await {
        log::error!("component=main event=db_init_failed error={e}");
        return ExitCode::FAILURE;
    }

    if let Err(e) = bootstrap_rules(&cfg.common.rule_config_file_path).await {
        log::error!("component=main event=rule_bootstrap_failed error={e}");
        return ExitCode::FAILURE;
    }

    let chat_client = if cfg.discord.token.is_empty() {
        log::warn!("component=main event=discord_disabled reason=no_token");
        AnyChatClient::Memory(InMemoryChatClient::new())
    } else {
        let client = SerenityChatClient::new(&cfg.discord.token);
        if let Err(e) = client.login_check().await {
            log::error!("component=main event=discord_login_failed error={e}");
            return ExitCode::FAILURE;
        }
        AnyChatClient::Discord(client)
    };

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let client = Arc::new(chat_client);
    let mirror = Arc::new(ChatMirror::new(client.clone(), clock.clone()));
    let processor = Arc::new(Processor::new(mirror.clone(), clock.clone()));

    let shutdown = CancellationToken::new();
    let mut background = tokio::task::JoinSet::new();
    background.spawn(job::escalation::run(client.clone(), clock.clone(), shutdown.clone()));
    background.spawn(job::reconciler::run(client.clone(), shutdown.clone()));
    background.spawn(job::audit_retention::run(clock.clone(), cfg.audit.ttl.clone(), shutdown.clone()));
    background.spawn(ingress::queue_poller::run(processor.clone(), shutdown.clone()));

    let worker_permits = Arc::new(tokio::sync::Semaphore::new(cfg.common.worker_pool_size));
    let state = AppState {
        mirror,
        processor,
        clock,
        worker_permits,
    };
    let router = handler::http::router(state);

    let addr = format!("{}:{}", cfg.http.bind_addr, cfg.http.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            log::error!("component=main event=bind_failed addr={addr} error={e}");
            return ExitCode::FAILURE;
        }
    };
    log::info!("component=main event=listening addr={addr}");

    let serve_shutdown = shutdown.clone();
    let serve_result = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            wait_for_signal().await;
            serve_shutdown.cancel();
        })
        .await;

    if let Err(e) = serve_result {
        log::error!("component=main event=serve_error error={e}");
    }

    shutdown.cancel();
    let grace = Duration::from_secs(cfg.common.shutdown_grace_secs);
    if tokio::time::timeout(grace, async {
        while background.join_next().await.is_some() {}
    })
    .await
    .is_err()
    {
        log::warn!("component=main event=shutdown_grace_exceeded grace_secs={}", cfg.common.shutdown_grace_secs);
    }

    ExitCode::SUCCESS
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        let mut terminate = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = terminate.recv() => {},
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Loads the rule config file, merges it over whatever is already persisted in
/// the database (file wins on key collision), then installs the merged map as
/// the active cache and writes it back so the database stays the source of
/// truth for the next restart.
async fn bootstrap_rules(path: &str) -> anyhow::Result<()> {
    let now_ms = chrono::Utc::now().timestamp_millis();
    let persisted_raw = infra::rule_store::load(now_ms).await?;
    let persisted = config::rules::validate(&persisted_raw).unwrap_or_default();

    let file = match config::rules::load_from_file(path) {
        Ok(rules) => rules,
        Err(e) => {
            log::warn!("component=main event=rule_file_missing path={path} error={e}");
            Default::default()
        }
    };

    let merged = config::rules::merge(persisted, file);
    let raw = serde_json::to_value(&merged)?;
    infra::rule_store::save(raw, now_ms).await?;
    config::rules::push(merged);
    Ok(())
}
