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

//! CRUD over `troubleshooting_guides`, keyed uniquely by `rule_name`.

use sea_orm::{EntityTrait, Set};

use crate::db::{connect_to_orm, ORM_CLIENT};
use crate::entity::troubleshooting_guides::{self, Entity as TroubleshootingGuides};
use crate::errors::{self, DbError, Error};

pub async fn get(rule_name: &str) -> errors::Result<Option<troubleshooting_guides::Model>> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    TroubleshootingGuides::find_by_id(rule_name.to_string())
        .one(client)
        .await
        .map_err(|e| Error::DbError(DbError::DBOperError(e.to_string(), rule_name.to_string())))
}

pub async fn get_all() -> errors::Result<Vec<troubleshooting_guides::Model>> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    TroubleshootingGuides::find()
        .all(client)
        .await
        .map_err(|e| Error::DbError(DbError::DBOperError(e.to_string(), "get_all".to_string())))
}

pub async fn upsert(rule_name: &str, content: &str, now_ms: i64) -> errors::Result<()> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let model = troubleshooting_guides::ActiveModel {
        rule_name: Set(rule_name.to_string()),
        content: Set(content.to_string()),
        updated_at: Set(now_ms),
    };
    TroubleshootingGuides::insert(model)
        .on_conflict(
            sea_orm::sea_query::OnConflict::column(troubleshooting_guides::Column::RuleName)
                .update_columns([
                    troubleshooting_guides::Column::Content,
                    troubleshooting_guides::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(client)
        .await
        .map_err(|e| Error::DbError(DbError::DBOperError(e.to_string(), rule_name.to_string())))?;
    Ok(())
}
