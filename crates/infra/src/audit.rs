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

//! Append-only audit log (`alert_events`) plus a retention sweep. Append
//! failures are logged and swallowed by callers deliberately — audit is a
//! side channel, not part of the delivery guarantee.

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set};

use crate::db::{connect_to_orm, ORM_CLIENT};
use crate::entity::alert_events::{self, Entity as AlertEvents};
use crate::errors::{self, DbError, Error};

#[derive(Debug, Clone)]
pub struct NewAuditEvent {
    pub alert_id: String,
    pub resource: Option<String>,
    pub status: String,
    pub message_id: Option<String>,
    pub channel_id: Option<String>,
    pub severity: String,
    pub rule_name: String,
    pub source: String,
    pub acknowledged_by: Option<String>,
    pub resolved_by: Option<String>,
}

pub async fn append(event: NewAuditEvent, now_ms: i64) -> errors::Result<()> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let model = alert_events::ActiveModel {
        id: sea_orm::ActiveValue::NotSet,
        alert_id: Set(event.alert_id),
        resource: Set(event.resource),
        status: Set(event.status),
        message_id: Set(event.message_id),
        channel_id: Set(event.channel_id),
        severity: Set(event.severity),
        rule_name: Set(event.rule_name),
        source: Set(event.source),
        acknowledged_by: Set(event.acknowledged_by),
        resolved_by: Set(event.resolved_by),
        created_at: Set(now_ms),
    };
    AlertEvents::insert(model)
        .exec(client)
        .await
        .map_err(|e| Error::DbError(DbError::DBOperError(e.to_string(), "append".to_string())))?;
    Ok(())
}

/// Deletes rows older than `cutoff_ms`. A `None` TTL means retention is
/// disabled, so callers should not invoke this at all in that case; this
/// function itself always sweeps when called.
pub async fn sweep(cutoff_ms: i64) -> errors::Result<u64> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let res = AlertEvents::delete_many()
        .filter(alert_events::Column::CreatedAt.lt(cutoff_ms))
        .exec(client)
        .await
        .map_err(|e| Error::DbError(DbError::DBOperError(e.to_string(), "sweep".to_string())))?;
    Ok(res.rows_affected)
}

/// Parses a TTL string of the form `30d`, `30days`, or a raw integer number of
/// seconds. Returns `None` for an empty/unset string, which disables the sweep.
pub fn parse_ttl_ms(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(days) = trimmed
        .strip_suffix("days")
        .or_else(|| trimmed.strip_suffix('d'))
    {
        return days.trim().parse::<i64>().ok().map(|d| d * 86_400_000);
    }
    trimmed.parse::<i64>().ok().map(|secs| secs * 1_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ttl_empty_is_none() {
        assert_eq!(parse_ttl_ms(""), None);
        assert_eq!(parse_ttl_ms("   "), None);
    }

    #[test]
    fn parse_ttl_days_suffix() {
        assert_eq!(parse_ttl_ms("30d"), Some(30 * 86_400_000));
        assert_eq!(parse_ttl_ms("7days"), Some(7 * 86_400_000));
    }

    #[test]
    fn parse_ttl_raw_seconds() {
        assert_eq!(parse_ttl_ms("3600"), Some(3_600_000));
    }
}
