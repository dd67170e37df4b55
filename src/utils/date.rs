//! Timestamp handling in the site's canonical timezone.
//!
//! All `lastmod` values are serialized as RFC 3339 with an explicit UTC
//! offset and whole-second precision. Carried-forward timestamps from a
//! previous sitemap are re-parsed (validating them) and re-serialized, which
//! round-trips byte-identically for values this tool produced.

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use std::time::SystemTime;

/// Parse a canonical-timezone offset string like `-05:00` or `+09:00`.
pub fn parse_offset(s: &str) -> Result<FixedOffset> {
    s.parse::<FixedOffset>()
        .with_context(|| format!("Invalid timezone offset: `{s}` (expected e.g. \"-05:00\")"))
}

/// Convert a filesystem modification time into the canonical timezone.
pub fn from_system_time(time: SystemTime, tz: FixedOffset) -> DateTime<FixedOffset> {
    DateTime::<Utc>::from(time).with_timezone(&tz)
}

/// Current wall-clock time in the canonical timezone.
pub fn now(tz: FixedOffset) -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&tz)
}

/// Serialize a timestamp as an RFC 3339 `lastmod` value.
///
/// Truncated to whole seconds for stability across runs.
pub fn format_lastmod(time: &DateTime<FixedOffset>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Parse a `lastmod` value from a previously published sitemap.
pub fn parse_lastmod(s: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s)
        .with_context(|| format!("Invalid lastmod timestamp: `{s}`"))
}

/// Parse an HTTP `Last-Modified` header (RFC 2822 date) into the canonical
/// timezone. Returns `None` for unparseable values.
pub fn parse_http_date(s: &str, tz: FixedOffset) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc2822(s)
        .ok()
        .map(|t| t.with_timezone(&tz))
}

// ============================================================================
// Tests
// ============================================================================
