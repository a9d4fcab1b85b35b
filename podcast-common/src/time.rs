//! Timestamp utilities

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Hour (UTC) assigned to episodes created from a bare calendar date
const EPISODE_PUBLISH_HOUR: u32 = 6;

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Parse a publish date as written in front matter
///
/// Accepts RFC 3339 (`2019-05-02T06:00:00.000Z`), a space separated
/// date-time (`2019-05-02 06:00:00`, taken as UTC) and a bare date
/// (`2019-05-02`, midnight UTC).
pub fn parse_publish_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}

/// Timestamp for a new episode published on `date`
pub fn episode_publish_time(date: NaiveDate) -> DateTime<Utc> {
    let time = NaiveTime::from_hms_opt(EPISODE_PUBLISH_HOUR, 0, 0).unwrap_or(NaiveTime::MIN);
    Utc.from_utc_datetime(&date.and_time(time))
}

/// Format an offset in seconds as `HH:MM:SS`
pub fn format_timestamp(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// Directory name for a publish date (`YYYY-MM-DD`)
pub fn format_date_for_dir(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // Should be a reasonable timestamp (after year 2000)
        assert!(timestamp.timestamp() > 946_684_800);
    }

    #[test]
    fn test_parse_rfc3339_with_millis() {
        let parsed = parse_publish_date("2019-05-02T06:00:00.000Z").unwrap();
        assert_eq!(parsed.year(), 2019);
        assert_eq!(parsed.hour(), 6);
    }

    #[test]
    fn test_parse_rfc3339_with_offset_normalizes_to_utc() {
        let parsed = parse_publish_date("2019-05-02T01:00:00-05:00").unwrap();
        assert_eq!(parsed.hour(), 6);
    }

    #[test]
    fn test_parse_space_separated() {
        let parsed = parse_publish_date("2020-01-15 10:30:00").unwrap();
        assert_eq!(parsed.minute(), 30);
    }

    #[test]
    fn test_parse_bare_date_is_midnight() {
        let parsed = parse_publish_date(" 2021-07-04 ").unwrap();
        assert_eq!(parsed.day(), 4);
        assert_eq!(parsed.hour(), 0);
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_publish_date("").is_none());
        assert!(parse_publish_date("last tuesday").is_none());
    }

    #[test]
    fn test_episode_publish_time() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 11).unwrap();
        let published = episode_publish_time(date);
        assert_eq!(published.to_rfc3339(), "2025-12-11T06:00:00+00:00");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "00:00:00");
        assert_eq!(format_timestamp(59.9), "00:00:59");
        assert_eq!(format_timestamp(3725.4), "01:02:05");
        assert_eq!(format_timestamp(-3.0), "00:00:00");
    }

    #[test]
    fn test_format_date_for_dir() {
        let date = parse_publish_date("2019-05-02T06:00:00Z").unwrap();
        assert_eq!(format_date_for_dir(&date), "2019-05-02");
    }
}
