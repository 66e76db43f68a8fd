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

//! Prometheus counters rendered at `GET /metrics`. Grouped the way the rest of
//! the ambient stack groups its own metrics: one `Lazy<IntCounterVec>` per
//! concern, registered into a single process-wide registry.

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

pub const NAMESPACE: &str = "alertrelay";

pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

pub static ALERTS_RECEIVED: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new("alerts_received_total", "Alerts received by source.").namespace(NAMESPACE),
        &["source"],
    )
    .expect("metric created");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("metric registered");
    counter
});

pub static ALERTS_SUPPRESSED: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new("alerts_suppressed_total", "Alerts suppressed, by reason.").namespace(NAMESPACE),
        &["reason"],
    )
    .expect("metric created");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("metric registered");
    counter
});

pub static ALERTS_EMITTED: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new("alerts_emitted_total", "Chat emits, by rule.").namespace(NAMESPACE),
        &["rule_name"],
    )
    .expect("metric created");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("metric registered");
    counter
});

pub static CHAT_API_ERRORS: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new("chat_api_errors_total", "Discord API errors, by operation.").namespace(NAMESPACE),
        &["operation"],
    )
    .expect("metric created");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("metric registered");
    counter
});

pub fn init() {
    Lazy::force(&ALERTS_RECEIVED);
    Lazy::force(&ALERTS_SUPPRESSED);
    Lazy::force(&ALERTS_EMITTED);
    Lazy::force(&CHAT_API_ERRORS);
}

pub fn render() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .expect("encoding prometheus metrics never fails");
    String::from_utf8(buffer).expect("prometheus text encoding is always valid utf8")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_registered_metric_names() {
        init();
        ALERTS_RECEIVED.with_label_values(&["grafana"]).inc();
        let text = render();
        assert!(text.contains("alertrelay_alerts_received_total"));
    }
}
