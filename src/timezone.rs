//! Fixed UTC+8 (HKT) display conversion.
//!
//! Every timestamp shown to an operator, every hourly bucket label and every
//! day bucket key is derived here. The offset is applied arithmetically to
//! the UTC components, so the output never depends on the host timezone
//! or a timezone database.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Timelike};

// ---

pub const HKT_OFFSET_HOURS: i64 = 8;

const DAY_FORMAT: &str = "%Y-%m-%d";
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Naive layouts accepted when the upstream omits the offset; treated as UTC.
const NAIVE_LAYOUTS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Parse an ISO-8601 timestamp into its UTC wall-clock components.
///
/// Accepts RFC 3339 (`Z` or numeric offset) and offset-less forms, which
/// are taken to already be UTC.
pub fn parse_utc(timestamp: &str) -> Option<NaiveDateTime> {
    // ---
    let trimmed = timestamp.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }
    NAIVE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(trimmed, layout).ok())
}

/// UTC timestamp string to HKT wall-clock time.
///
/// `None` for unparseable input and for instants at the edge of the
/// representable calendar where the offset would overflow.
pub fn to_hkt(timestamp: &str) -> Option<NaiveDateTime> {
    parse_utc(timestamp)?.checked_add_signed(Duration::hours(HKT_OFFSET_HOURS))
}

/// First instant of an HKT calendar day, in UTC.
pub fn hkt_day_start_utc(day: NaiveDate) -> Option<NaiveDateTime> {
    day.and_hms_opt(0, 0, 0)?
        .checked_sub_signed(Duration::hours(HKT_OFFSET_HOURS))
}

/// Last microsecond of an HKT calendar day, in UTC.
pub fn hkt_day_end_utc(day: NaiveDate) -> Option<NaiveDateTime> {
    day.and_hms_micro_opt(23, 59, 59, 999_999)?
        .checked_sub_signed(Duration::hours(HKT_OFFSET_HOURS))
}

/// Calendar day (`YYYY-MM-DD`) of the reading in HKT.
pub fn hkt_day_key(timestamp: &str) -> Option<String> {
    to_hkt(timestamp).map(|t| t.format(DAY_FORMAT).to_string())
}

/// Hour of day (0-23) of the reading in HKT.
pub fn hkt_hour(timestamp: &str) -> Option<u32> {
    to_hkt(timestamp).map(|t| t.hour())
}

/// `YYYY-MM-DD HH:MM:SS` in HKT, used for tooltips and table cells.
pub fn hkt_display(timestamp: &str) -> Option<String> {
    to_hkt(timestamp).map(|t| t.format(DISPLAY_FORMAT).to_string())
}

/// Label for an hourly bucket, e.g. `08:00`.
pub fn hour_label(hour: u32) -> String {
    format!("{:02}:00", hour)
}

/// Current HKT calendar day; the anchor for "today" views.
pub fn hkt_today() -> NaiveDate {
    let now = chrono::Utc::now().naive_utc();
    now.checked_add_signed(Duration::hours(HKT_OFFSET_HOURS))
        .unwrap_or(now)
        .date()
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_rfc3339_to_hkt() {
        // ---
        assert_eq!(
            hkt_display("2024-01-01T04:30:15Z").as_deref(),
            Some("2024-01-01 12:30:15")
        );
        assert_eq!(hkt_hour("2024-01-01T04:30:15Z"), Some(12));
    }

    #[test]
    fn test_day_rollover() {
        // ---
        // 16:00 UTC is midnight HKT the following day
        assert_eq!(
            hkt_day_key("2024-02-28T16:00:00Z").as_deref(),
            Some("2024-02-29")
        );
        assert_eq!(
            hkt_day_key("2023-12-31T20:00:00.123456Z").as_deref(),
            Some("2024-01-01")
        );
        assert_eq!(hkt_hour("2023-12-31T20:00:00Z"), Some(4));
    }

    #[test]
    fn test_offset_and_naive_inputs() {
        // ---
        // Non-UTC offsets are normalised to UTC first
        assert_eq!(
            hkt_display("2024-01-01T12:00:00+08:00").as_deref(),
            Some("2024-01-01 12:00:00")
        );
        // Offset-less input is taken as UTC
        assert_eq!(
            hkt_display("2024-01-01T00:00:00").as_deref(),
            Some("2024-01-01 08:00:00")
        );
        assert_eq!(
            hkt_display("2024-01-01 00:00:00.5").as_deref(),
            Some("2024-01-01 08:00:00")
        );
    }

    #[test]
    fn test_garbage_rejected() {
        // ---
        assert_eq!(parse_utc("not a timestamp"), None);
        assert_eq!(hkt_day_key(""), None);
    }

    #[test]
    fn test_calendar_edge_is_rejected_not_panicking() {
        // ---
        assert!(parse_utc("+262142-12-31T23:00:00").is_some());
        assert_eq!(to_hkt("+262142-12-31T23:00:00"), None);
        assert_eq!(hkt_day_key("+262142-12-31T23:00:00"), None);
        assert_eq!(hkt_day_start_utc(NaiveDate::MIN), None);
    }

    #[test]
    fn test_hkt_day_bounds_in_utc() {
        // ---
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let start = hkt_day_start_utc(day).unwrap();
        let end = hkt_day_end_utc(day).unwrap();
        assert_eq!(start.to_string(), "2024-01-01 16:00:00");
        assert_eq!(end.to_string(), "2024-01-02 15:59:59.999999");
        assert_eq!(hkt_day_key("2024-01-01T16:00:00Z").as_deref(), Some("2024-01-02"));
        assert_eq!(hkt_day_key("2024-01-02T15:59:59.999999Z").as_deref(), Some("2024-01-02"));
    }

    #[test]
    fn test_hour_label() {
        // ---
        assert_eq!(hour_label(0), "00:00");
        assert_eq!(hour_label(23), "23:00");
    }
}
