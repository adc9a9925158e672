//! The time-format mini-language used by `$SYS.time`/`$SYS.locale`-adjacent
//! formatting helpers: a handful of curly-brace directives (`{%Y}`, `{%m}`,
//! `{%d}`, `{%H}`, `{%M}`, `{%S}`, `{%z}`) plus a table of named presets
//! (`atom`, `cookie`, `iso8601`, `rfc822`, `rfc850`, `rfc1036`, `rfc1123`,
//! `rfc7231`, `rfc2822`, `rfc3339`, `rfc3339-ex`, `rss`, `w3c`) that resolve
//! to a fixed `chrono` format string.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use std::collections::HashMap;

static KEYWORD_FORMATS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("atom", "%Y-%m-%dT%H:%M:%S%:z");
    m.insert("cookie", "%A, %d-%b-%Y %H:%M:%S UTC");
    m.insert("iso8601", "%Y-%m-%dT%H:%M:%S%:z");
    m.insert("rfc822", "%a, %d %b %y %H:%M:%S %z");
    m.insert("rfc850", "%A, %d-%b-%y %H:%M:%S UTC");
    m.insert("rfc1036", "%A, %d %b %y %H:%M:%S %z");
    m.insert("rfc1123", "%a, %d %b %Y %H:%M:%S %z");
    m.insert("rfc7231", "%a, %d %b %Y %H:%M:%S GMT");
    m.insert("rfc2822", "%a, %d %b %Y %H:%M:%S %z");
    m.insert("rfc3339", "%Y-%m-%dT%H:%M:%S%:z");
    m.insert("rfc3339-ex", "%Y-%m-%dT%H:%M:%S%.f%:z");
    m.insert("rss", "%a, %d %b %Y %H:%M:%S %z");
    m.insert("w3c", "%Y-%m-%dT%H:%M:%S%:z");
    m
});

/// Resolve a named preset (e.g. `"rfc3339"`) to its `chrono` strftime
/// pattern, if it's one of the known keywords.
pub fn keyword_pattern(keyword: &str) -> Option<&'static str> {
    KEYWORD_FORMATS.get(keyword).copied()
}

/// Format `when` using either a known keyword or a raw `chrono` strftime
/// pattern — whichever `fmt` resolves to.
pub fn format(when: DateTime<Utc>, fmt: &str) -> String {
    let pattern = keyword_pattern(fmt).unwrap_or(fmt);
    when.format(pattern).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 27, 12, 0, 0).unwrap()
    }

    #[test]
    fn rfc3339_keyword_resolves() {
        assert_eq!(format(sample(), "rfc3339"), "2026-07-27T12:00:00+00:00");
    }

    #[test]
    fn raw_strftime_pattern_passes_through() {
        assert_eq!(format(sample(), "%Y/%m/%d"), "2026/07/27");
    }

    #[test]
    fn unknown_keyword_is_treated_as_a_literal_pattern() {
        // No directives in it, so chrono echoes it back unchanged.
        assert_eq!(format(sample(), "plain-text"), "plain-text");
    }
}
