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

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tokio::sync::OnceCell;

pub static ORM_CLIENT: OnceCell<DatabaseConnection> = OnceCell::const_new();

/// Connects using the configured `ZR_DATABASE_URL`, sized by `ZR_DB_POOL_SIZE`.
/// Called lazily through `ORM_CLIENT.get_or_init`, so the first caller pays the
/// connection cost and every later caller reuses the pool.
pub async fn connect_to_orm() -> DatabaseConnection {
    let cfg = config::get_config();
    let mut opt = ConnectOptions::new(cfg.database.url.clone());
    opt.max_connections(cfg.database.pool_size)
        .min_connections(1)
        .sqlx_logging(false);

    match Database::connect(opt).await {
        Ok(conn) => conn,
        Err(e) => panic!("failed to connect to database {}: {e}", cfg.database.url),
    }
}

pub async fn client() -> &'static DatabaseConnection {
    ORM_CLIENT.get_or_init(connect_to_orm).await
}
