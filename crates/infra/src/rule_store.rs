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

//! Persisted side of the rule config: a singleton row in `alerts_config`
//! holding the JSON rule map, merged with the file-loaded config on startup.

use sea_orm::{EntityTrait, Set};

use crate::db::{connect_to_orm, ORM_CLIENT};
use crate::entity::alerts_config::{self, Entity as AlertsConfig, SINGLETON_ID};
use crate::errors::{self, DbError, Error};

pub async fn load(now_ms: i64) -> errors::Result<serde_json::Value> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let existing = AlertsConfig::find_by_id(SINGLETON_ID)
        .one(client)
        .await
        .map_err(|e| Error::DbError(DbError::DBOperError(e.to_string(), "rule_store.load".to_string())))?;

    Ok(match existing {
        Some(row) => row.rules,
        None => {
            let empty = serde_json::json!({});
            save(empty.clone(), now_ms).await?;
            empty
        }
    })
}

pub async fn save(rules: serde_json::Value, now_ms: i64) -> errors::Result<()> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let model = alerts_config::ActiveModel {
        id: Set(SINGLETON_ID),
        rules: Set(rules),
        updated_at: Set(now_ms),
    };
    AlertsConfig::insert(model)
        .on_conflict(
            sea_orm::sea_query::OnConflict::column(alerts_config::Column::Id)
                .update_columns([alerts_config::Column::Rules, alerts_config::Column::UpdatedAt])
                .to_owned(),
        )
        .exec_without_returning(client)
        .await
        .map_err(|e| Error::DbError(DbError::DBOperError(e.to_string(), "rule_store.save".to_string())))?;
    Ok(())
}
