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

//! Cleans up broken Go-template artifacts (`%!f(<nil>)`, `%!s(<nil>)`, ...)
//! that leak through from upstream alertmanager templates, and treats
//! sentinel zero-value timestamps as absent.

use once_cell::sync::Lazy;
use regex::Regex;

static TEMPLATE_ARTIFACT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%!\w\(<nil>\)").expect("static regex is valid"));

/// Replaces broken template artifacts like `%!f(<nil>)` with `N/A`.
pub fn sanitize_text(input: &str) -> String {
    TEMPLATE_ARTIFACT.replace_all(input, "N/A").into_owned()
}

/// Go's zero-value time renders as `0001-01-01T00:00:00Z`; treat that (or an
/// empty string) as an absent timestamp rather than a real one.
pub fn is_sentinel_timestamp(raw: &str) -> bool {
    raw.is_empty() || raw.starts_with("0001-01-01")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_float_artifact() {
        assert_eq!(sanitize_text("value: %!f(<nil>)"), "value: N/A");
    }

    #[test]
    fn sanitize_replaces_string_artifact() {
        assert_eq!(sanitize_text("name: %!s(<nil>)"), "name: N/A");
    }

    #[test]
    fn sanitize_leaves_clean_text_untouched() {
        assert_eq!(sanitize_text("all good"), "all good");
    }

    #[test]
    fn sentinel_timestamp_detection() {
        assert!(is_sentinel_timestamp(""));
        assert!(is_sentinel_timestamp("0001-01-01T00:00:00Z"));
        assert!(!is_sentinel_timestamp("2026-07-30T00:00:00Z"));
    }
}
