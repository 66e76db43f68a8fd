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

//! Process-wide environment configuration, loaded once from `ZR_*` variables and
//! cached behind an `ArcSwap` so background jobs and request handlers never pay
//! for re-parsing it, while `refresh_config` lets tests (and the `/reload` sibling
//! env-reload path) pick up a changed environment without restarting the process.

use std::sync::Arc;

use arc_swap::ArcSwap;
use dotenv_config::EnvConfig;
use once_cell::sync::Lazy;

static CONFIG: Lazy<ArcSwap<Config>> = Lazy::new(|| ArcSwap::from(Arc::new(init())));

pub fn get_config() -> Arc<Config> {
    CONFIG.load().clone()
}

pub fn refresh_config() -> Result<(), anyhow::Error> {
    CONFIG.store(Arc::new(init()));
    Ok(())
}

fn init() -> Config {
    dotenvy::dotenv_override().ok();
    match Config::init() {
        Ok(cfg) => cfg,
        Err(e) => panic!("environment configuration error: {e}"),
    }
}

#[derive(EnvConfig, Debug, Clone)]
pub struct Config {
    pub http: Http,
    pub discord: Discord,
    pub database: Database,
    pub dedup: Dedup,
    pub queue: Queue,
    pub audit: Audit,
    pub log: Log,
    pub common: Common,
}

#[derive(EnvConfig, Debug, Clone)]
pub struct Http {
    #[env_config(name = "ZR_HTTP_PORT", default = 5090)]
    pub port: u16,
    #[env_config(name = "ZR_HTTP_BIND_ADDR", default = "0.0.0.0")]
    pub bind_addr: String,
    #[env_config(name = "ZR_AUTH_TOKEN", default = "")]
    pub auth_token: String,
}

#[derive(EnvConfig, Debug, Clone)]
pub struct Discord {
    #[env_config(name = "ZR_DISCORD_TOKEN", default = "")]
    pub token: String,
    #[env_config(name = "ZR_DEFAULT_CHANNEL_ID", default = "")]
    pub default_channel_id: String,
    #[env_config(name = "ZR_GUILD_ID", default = "")]
    pub guild_id: String,
    #[env_config(name = "ZR_DISCORD_REQUEST_TIMEOUT_SECS", default = 10)]
    pub request_timeout_secs: u64,
    #[env_config(name = "ZR_DISCORD_PUBLIC_KEY", default = "")]
    pub public_key: String,
}

#[derive(EnvConfig, Debug, Clone)]
pub struct Database {
    #[env_config(name = "ZR_DATABASE_URL", default = "sqlite://alertrelay.db?mode=rwc")]
    pub url: String,
    #[env_config(name = "ZR_DB_POOL_SIZE", default = 5)]
    pub pool_size: u32,
}

#[derive(EnvConfig, Debug, Clone)]
pub struct Dedup {
    #[env_config(name = "ZR_DEDUP_DEFAULT_WINDOW_MS", default = 300_000)]
    pub default_suppress_window_ms: i64,
    #[env_config(name = "ZR_DEDUP_MIN_TTL_MS", default = 1_000)]
    pub min_ttl_ms: i64,
}

#[derive(EnvConfig, Debug, Clone)]
pub struct Queue {
    #[env_config(name = "ZR_QUEUE_URL", default = "")]
    pub url: String,
    #[env_config(name = "ZR_QUEUE_REGION", default = "")]
    pub region: String,
    #[env_config(name = "ZR_QUEUE_WAIT_TIME_SECS", default = 20)]
    pub wait_time_secs: i32,
    #[env_config(name = "ZR_QUEUE_BATCH_SIZE", default = 10)]
    pub batch_size: i32,
    #[env_config(name = "ZR_QUEUE_VISIBILITY_TIMEOUT_SECS", default = 60)]
    pub visibility_timeout_secs: i32,
}

#[derive(EnvConfig, Debug, Clone)]
pub struct Audit {
    #[env_config(name = "ZR_AUDIT_TTL", default = "")]
    pub ttl: String,
}

#[derive(EnvConfig, Debug, Clone)]
pub struct Log {
    #[env_config(name = "ZR_LOG_LEVEL", default = "info")]
    pub level: String,
}

#[derive(EnvConfig, Debug, Clone)]
pub struct Common {
    #[env_config(name = "ZR_ENVIRONMENT", default = "production")]
    pub environment: String,
    #[env_config(name = "ZR_CONFIG_FILE_PATH", default = "./config/rules.json")]
    pub rule_config_file_path: String,
    #[env_config(name = "ZR_SHUTDOWN_GRACE_SECS", default = 30)]
    pub shutdown_grace_secs: u64,
    #[env_config(name = "ZR_WORKER_POOL_SIZE", default = 64)]
    pub worker_pool_size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = Config::init().unwrap();
        assert_eq!(cfg.http.port, 5090);
        assert_eq!(cfg.dedup.default_suppress_window_ms, 300_000);
        assert_eq!(cfg.common.shutdown_grace_secs, 30);
    }
}
