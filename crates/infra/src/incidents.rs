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

//! CRUD over `alert_incidents`, plus a keyset-paginated scan used by the
//! escalation loop and reconciler so a full enumeration never holds a
//! whole-table lock.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::db::{connect_to_orm, ORM_CLIENT};
use crate::entity::alert_incidents::{self, Entity as AlertIncidents};
use crate::errors::{self, DbError, Error};

pub const DEFAULT_PAGE_SIZE: u64 = 200;

pub async fn get(incident_key: &str) -> errors::Result<Option<alert_incidents::Model>> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    AlertIncidents::find_by_id(incident_key.to_string())
        .one(client)
        .await
        .map_err(|e| Error::DbError(DbError::DBOperError(e.to_string(), incident_key.to_string())))
}

pub async fn put(record: alert_incidents::Model) -> errors::Result<()> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let key = record.incident_key.clone();
    let active = record.into_active_model();

    AlertIncidents::insert(active)
        .on_conflict(
            sea_orm::sea_query::OnConflict::column(alert_incidents::Column::IncidentKey)
                .update_columns([
                    alert_incidents::Column::MessageId,
                    alert_incidents::Column::ChannelId,
                    alert_incidents::Column::ThreadId,
                    alert_incidents::Column::State,
                    alert_incidents::Column::RuleName,
                    alert_incidents::Column::Severity,
                    alert_incidents::Column::UpdatedAt,
                    alert_incidents::Column::AcknowledgedBy,
                    alert_incidents::Column::AcknowledgedAt,
                    alert_incidents::Column::ResolvedBy,
                    alert_incidents::Column::ResolvedAt,
                    alert_incidents::Column::MentionLevel,
                    alert_incidents::Column::ExpiresAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(client)
        .await
        .map_err(|e| Error::DbError(DbError::DBOperError(e.to_string(), key)))?;
    Ok(())
}

pub async fn delete(incident_key: &str) -> errors::Result<()> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    AlertIncidents::delete_by_id(incident_key.to_string())
        .exec(client)
        .await
        .map_err(|e| Error::DbError(DbError::DBOperError(e.to_string(), incident_key.to_string())))?;
    Ok(())
}

/// Only mutates `thread_id`; used by the reconciler when a thread has gone
/// missing but the rest of the incident is still healthy.
pub async fn clear_thread(incident_key: &str) -> errors::Result<()> {
    let Some(existing) = get(incident_key).await? else {
        return Ok(());
    };
    let mut active: alert_incidents::ActiveModel = existing.into_active_model();
    active.thread_id = Set(None);
    active
        .update(ORM_CLIENT.get_or_init(connect_to_orm).await)
        .await
        .map_err(|e| Error::DbError(DbError::DBOperError(e.to_string(), incident_key.to_string())))?;
    Ok(())
}

/// One page of a keyset-paginated scan over `(updated_at, incident_key)`.
/// Pass `None` to start from the beginning; subsequent calls pass the last
/// row's `(updated_at, incident_key)` cursor.
pub async fn list_keys(
    after: Option<(i64, &str)>,
    page_size: u64,
) -> errors::Result<Vec<alert_incidents::Model>> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let mut query = AlertIncidents::find().order_by_asc(alert_incidents::Column::UpdatedAt).order_by_asc(alert_incidents::Column::IncidentKey);

    if let Some((updated_at, incident_key)) = after {
        query = query.filter(
            sea_orm::Condition::any()
                .add(alert_incidents::Column::UpdatedAt.gt(updated_at))
                .add(
                    sea_orm::Condition::all()
                        .add(alert_incidents::Column::UpdatedAt.eq(updated_at))
                        .add(alert_incidents::Column::IncidentKey.gt(incident_key)),
                ),
        );
    }

    query
        .limit(page_size)
        .all(client)
        .await
        .map_err(|e| Error::DbError(DbError::DBOperError(e.to_string(), "list_keys".to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_page_size_is_reasonable() {
        assert!(DEFAULT_PAGE_SIZE > 0 && DEFAULT_PAGE_SIZE <= 1000);
    }
}
