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

//! Thin wrapper translating `CanonicalAlert` lifecycle into dedup store calls:
//! a Resolved alert always clears; a Firing alert is gated by the rule's
//! `suppress_window_ms`.

use infra::dedup::{self, DedupOutcome};
use infra::errors::Result;

use crate::common::meta::alert::{AlertStatus, CanonicalAlert};

pub const MIN_TTL_MS: i64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Proceed,
    Suppressed,
}

pub async fn check(alert: &CanonicalAlert, suppress_window_ms: i64, now_ms: i64) -> Result<GateDecision> {
    match alert.status {
        AlertStatus::Resolved => {
            dedup::clear(&alert.alert_id).await?;
            Ok(GateDecision::Proceed)
        }
        AlertStatus::Firing => {
            let ttl = suppress_window_ms.max(MIN_TTL_MS);
            match dedup::test_and_set(&alert.alert_id, ttl, now_ms).await? {
                DedupOutcome::New => Ok(GateDecision::Proceed),
                DedupOutcome::Duplicate => Ok(GateDecision::Suppressed),
            }
        }
    }
}

/// Extends the dedup TTL on acknowledge so the incident doesn't get
/// re-delivered the moment a responder acts on it.
pub async fn extend_on_acknowledge(fingerprint: &str, suppress_window_ms: i64, now_ms: i64) -> Result<()> {
    const TEN_MINUTES_MS: i64 = 10 * 60 * 1000;
    dedup::set_ttl(fingerprint, suppress_window_ms.max(TEN_MINUTES_MS), now_ms).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_decision_variants_distinct() {
        assert_ne!(GateDecision::Proceed, GateDecision::Suppressed);
    }
}
