//! Date and unit helpers shared by the client and its callers.

use chrono::NaiveDate;

/// Parse a calendar date.
///
/// Accepts:
/// - YYYY-MM-DD
/// - RFC3339 datetime (date part)
/// - Naive datetime YYYY-MM-DDTHH:MM:SS (date part)
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(ndt.date());
    }
    None
}

/// Format a date the way the API expects it in paths.
pub fn api_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Milliseconds to whole minutes, exact halves rounded to even.
pub fn millis_to_minutes(ms: u64) -> u64 {
    let (q, r) = (ms / 60_000, ms % 60_000);
    // Exact half minutes round to the even neighbour.
    q + u64::from(r > 30_000 || (r == 30_000 && q % 2 == 1))
}

/// Current time as fractional unix seconds.
pub fn unix_now() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}
