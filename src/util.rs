use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

pub(crate) fn host_url(base_url: &str, version: &str) -> String {
    format!("{}{}/", base_url, version)
}

/// Resolves a request target against the host URL.
///
/// Links handed out by the API are absolute; everything else is taken as a
/// path relative to the versioned host.
pub(crate) fn resolve(host_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    let base = host_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{}/{}", base, path)
}

/// Parses a date-only string (`2021-02-12`) as midnight of that day.
pub(crate) fn parse_date(s: &str) -> Result<NaiveDateTime> {
    let d = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| anyhow!("invalid date {:?}: {}", s, e))?;
    d.and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow!("invalid date {:?}", s))
}

pub(crate) fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    // Digit-only text is a calendar date (`2021`, `20210101`), never epoch millis.
    let date = match s.len() {
        4 if s.bytes().all(|b| b.is_ascii_digit()) => {
            NaiveDate::parse_from_str(&format!("{}-01-01", s), "%Y-%m-%d").ok()
        }
        8 if s.bytes().all(|b| b.is_ascii_digit()) => {
            NaiveDate::parse_from_str(s, "%Y%m%d").ok()
        }
        _ => NaiveDate::parse_from_str(s, "%Y-%m-%d").ok(),
    };
    date.and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| anyhow!("invalid timestamp {:?}", s))
}

pub(crate) fn timestamp_from_millis(ms: i64) -> Result<NaiveDateTime> {
    DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| anyhow!("timestamp {} ms is out of range", ms))
}

pub(crate) fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}
