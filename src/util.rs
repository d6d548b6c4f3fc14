//! URL and date helpers shared by the context resolver, the identity assigner
//! and the built-in catalog.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use regex::Regex;
use url::Url;

static PROTOCOL_RE: OnceLock<Regex> = OnceLock::new();

fn protocol_re() -> &'static Regex {
    PROTOCOL_RE.get_or_init(|| {
        Regex::new(r"^(?:[a-zA-Z][a-zA-Z\d+\-.]*:|//)").expect("static protocol regex")
    })
}

/// Returns true if `input` carries a scheme (`https:`, `mailto:`) or is
/// protocol-relative (`//host`).
#[must_use]
pub fn has_protocol(input: &str) -> bool {
    protocol_re().is_match(input)
}

/// Returns `input` with exactly one trailing slash.
#[must_use]
pub fn with_trailing_slash(input: &str) -> String {
    format!("{}/", input.trim_end_matches('/'))
}

/// Returns `input` without trailing slashes. `/` is kept as is.
#[must_use]
pub fn without_trailing_slash(input: &str) -> String {
    let trimmed = input.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Joins a base URL and a path segment with a single `/` between them.
///
/// ```
/// use schemaorg_graph::util::join_url;
///
/// assert_eq!(join_url("https://example.com/", "/"), "https://example.com/");
/// assert_eq!(join_url("https://example.com", "/blog"), "https://example.com/blog");
/// assert_eq!(
///     join_url("https://example.com/blog", "#article"),
///     "https://example.com/blog/#article"
/// );
/// ```
#[must_use]
pub fn join_url(base: &str, path: &str) -> String {
    if base.is_empty() {
        return path.to_string();
    }
    let segment = path.trim_start_matches('/');
    let mut out = with_trailing_slash(base);
    out.push_str(segment);
    out
}

/// Joins `input` onto `base` unless it is already absolute or already under `base`.
#[must_use]
pub fn with_base(input: &str, base: &str) -> String {
    if base.is_empty() || base == "/" || has_protocol(input) {
        return input.to_string();
    }
    let base_trimmed = base.trim_end_matches('/');
    if input.starts_with(base_trimmed) {
        return input.to_string();
    }
    join_url(base, input)
}

/// Resolves a root-relative (`/…`) or fragment (`#…`) reference against `base`.
///
/// Absolute URLs and document-relative references are returned unchanged.
#[must_use]
pub fn resolve_with_base(base: &str, input: &str) -> String {
    let relative = input.starts_with('/') || input.starts_with('#');
    if input.is_empty() || has_protocol(input) || !relative {
        return input.to_string();
    }
    match Url::parse(base).and_then(|b| b.join(input)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => with_base(input, base),
    }
}

/// Prefixes an identity segment with a base URL.
///
/// Segments without a `#` are turned into fragments first, so `/about` becomes
/// `#/about` and the result stays addressable by graph key.
#[must_use]
pub fn prefix_id(base: &str, id: &str) -> String {
    if has_protocol(id) {
        return id.to_string();
    }
    let id = if id.contains('#') {
        id.to_string()
    } else {
        format!("#{id}")
    };
    with_base(&id, base)
}

/// Normalizes a date or date-time string to RFC 3339 in UTC.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS` (taken as UTC) and `YYYY-MM-DD`.
/// Anything else is returned verbatim.
///
/// ```
/// use schemaorg_graph::util::to_iso_date;
///
/// assert_eq!(to_iso_date("2021-10-10"), "2021-10-10T00:00:00Z");
/// assert_eq!(to_iso_date("2021-10-10T12:00:00+02:00"), "2021-10-10T10:00:00Z");
/// assert_eq!(to_iso_date("last tuesday"), "last tuesday");
/// ```
#[must_use]
pub fn to_iso_date(input: &str) -> String {
    let trimmed = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return dt.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Secs, true);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return naive.and_utc().to_rfc3339_opts(SecondsFormat::Secs, true);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return naive.and_utc().to_rfc3339_opts(SecondsFormat::Secs, true);
        }
    }
    input.to_string()
}
