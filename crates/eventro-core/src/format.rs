//! Display-formatting utilities for dates, times, prices, and message
//! timestamps.
//!
//! These are the pure presentation helpers the API returns alongside raw
//! values so clients render consistently. All functions are total: malformed
//! timestamps are returned unchanged rather than panicking.

use chrono::{DateTime, Datelike, Duration, FixedOffset, Utc};

/// Parse an RFC 3339 timestamp, preserving its offset.
fn parse(ts: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(ts).ok()
}

/// Format an event date for card display, e.g. `"Tue, Aug 25, 2026"`.
///
/// Returns the input unchanged if it is not valid RFC 3339.
pub fn format_event_date(ts: &str) -> String {
    parse(ts).map_or_else(|| ts.to_string(), |dt| dt.format("%a, %b %-d, %Y").to_string())
}

/// Format an event start time for card display, e.g. `"7:30 PM"`.
///
/// Returns the input unchanged if it is not valid RFC 3339.
pub fn format_event_time(ts: &str) -> String {
    parse(ts).map_or_else(|| ts.to_string(), |dt| dt.format("%-I:%M %p").to_string())
}

/// Format a price in cents for display: `0` → `"Free"`, `1250` → `"$12.50"`.
pub fn format_price_cents(cents: i64) -> String {
    if cents == 0 {
        return "Free".to_string();
    }
    let sign = if cents < 0 { "-" } else { "" };
    // unsigned_abs: i64::MIN has no i64 negation.
    let cents = cents.unsigned_abs();
    format!("{sign}${}.{:02}", cents / 100, cents % 100)
}

/// Format a message timestamp relative to `now`:
///
/// - under a minute: `"Just now"`
/// - under an hour: `"5m ago"`
/// - same calendar day: clock time, e.g. `"3:07 PM"`
/// - previous calendar day: `"Yesterday"`
/// - otherwise: short date, e.g. `"Aug 25"`
///
/// Returns the input unchanged if it is not valid RFC 3339.
pub fn format_message_timestamp(ts: &str, now: DateTime<Utc>) -> String {
    let Some(dt) = parse(ts) else {
        return ts.to_string();
    };
    let dt_utc = dt.with_timezone(&Utc);
    let age = now.signed_duration_since(dt_utc);

    if age < Duration::minutes(1) {
        return "Just now".to_string();
    }
    if age < Duration::hours(1) {
        return format!("{}m ago", age.num_minutes());
    }
    if dt_utc.date_naive() == now.date_naive() {
        return dt_utc.format("%-I:%M %p").to_string();
    }
    if dt_utc.date_naive().succ_opt() == Some(now.date_naive()) {
        return "Yesterday".to_string();
    }
    if dt_utc.year() == now.year() {
        dt_utc.format("%b %-d").to_string()
    } else {
        dt_utc.format("%b %-d, %Y").to_string()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
