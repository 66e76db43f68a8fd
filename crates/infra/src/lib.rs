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

pub mod audit;
pub mod db;
pub mod dedup;
pub mod entity;
pub mod errors;
pub mod guides;
pub mod incidents;
pub mod migration;
pub mod rule_store;

use sea_orm_migration::MigratorTrait;

/// Connects the pool and runs migrations to the latest version. Called once at
/// startup before any of the CRUD modules above are exercised.
pub async fn init() -> errors::Result<()> {
    let client = db::client().await;
    migration::Migrator::up(client, None)
        .await
        .map_err(|e| errors::Error::SeaOrmError(e))?;
    Ok(())
}
