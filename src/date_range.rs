//! Report-type selector to calendar-day range.

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::error::{DashboardError, DashboardResult};
use crate::models::{DateRange, ReportType};

// ---

pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Longest custom range accepted, in days (inclusive).
pub const MAX_RANGE_DAYS: i64 = 366;

pub fn parse_day(s: &str) -> DashboardResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DAY_FORMAT)
        .map_err(|_| DashboardError::InvalidDate(s.to_string()))
}

pub fn format_day(date: NaiveDate) -> String {
    date.format(DAY_FORMAT).to_string()
}

/// Resolve the inclusive range for a report.
///
/// `custom` is only consulted for [`ReportType::Custom`] and is passed
/// through as-is; an inverted pair is not swapped. A custom range longer
/// than [`MAX_RANGE_DAYS`] is rejected.
pub fn resolve(
    report_type: ReportType,
    anchor: NaiveDate,
    custom: Option<(NaiveDate, NaiveDate)>,
) -> DashboardResult<DateRange> {
    // ---
    let (start, end) = match report_type {
        ReportType::Daily => (anchor, anchor),
        ReportType::Weekly => week_bounds(anchor).ok_or_else(|| out_of_calendar(anchor))?,
        ReportType::Monthly => month_bounds(anchor).ok_or_else(|| out_of_calendar(anchor))?,
        ReportType::Custom => {
            let (start, end) = custom.ok_or(DashboardError::MissingCustomRange)?;
            let days = end.signed_duration_since(start).num_days() + 1;
            if days > MAX_RANGE_DAYS {
                return Err(DashboardError::RangeTooLong(days));
            }
            (start, end)
        }
    };

    Ok(DateRange {
        start_date: format_day(start),
        end_date: format_day(end),
    })
}

fn out_of_calendar(anchor: NaiveDate) -> DashboardError {
    DashboardError::InvalidDate(format_day(anchor))
}

/// Sunday through Saturday of the week containing `anchor`.
fn week_bounds(anchor: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    // ---
    let back = anchor.weekday().num_days_from_sunday() as u64;
    let sunday = anchor.checked_sub_days(Days::new(back))?;
    Some((sunday, sunday.checked_add_days(Days::new(6))?))
}

fn month_bounds(anchor: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    // ---
    let first = anchor.with_day(1)?;
    let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
    Some((first, last))
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn day(s: &str) -> NaiveDate {
        parse_day(s).unwrap()
    }

    fn range(start: &str, end: &str) -> DateRange {
        DateRange {
            start_date: start.into(),
            end_date: end.into(),
        }
    }

    #[test]
    fn test_daily() {
        // ---
        let r = resolve(ReportType::Daily, day("2024-03-15"), None).unwrap();
        assert_eq!(r, range("2024-03-15", "2024-03-15"));
    }

    #[test]
    fn test_weekly_sunday_to_saturday() {
        // ---
        // 2024-03-13 is a Wednesday
        let r = resolve(ReportType::Weekly, day("2024-03-13"), None).unwrap();
        assert_eq!(r, range("2024-03-10", "2024-03-16"));

        // A Sunday anchors its own week
        let r = resolve(ReportType::Weekly, day("2024-03-10"), None).unwrap();
        assert_eq!(r, range("2024-03-10", "2024-03-16"));

        // A Saturday is the last day
        let r = resolve(ReportType::Weekly, day("2024-03-16"), None).unwrap();
        assert_eq!(r, range("2024-03-10", "2024-03-16"));
    }

    #[test]
    fn test_weekly_crosses_year_boundary() {
        // ---
        // 2025-01-01 is a Wednesday
        let r = resolve(ReportType::Weekly, day("2025-01-01"), None).unwrap();
        assert_eq!(r, range("2024-12-29", "2025-01-04"));
    }

    #[test]
    fn test_monthly_leap_years() {
        // ---
        let r = resolve(ReportType::Monthly, day("2024-02-10"), None).unwrap();
        assert_eq!(r, range("2024-02-01", "2024-02-29"));

        let r = resolve(ReportType::Monthly, day("2023-02-10"), None).unwrap();
        assert_eq!(r, range("2023-02-01", "2023-02-28"));

        let r = resolve(ReportType::Monthly, day("2023-12-31"), None).unwrap();
        assert_eq!(r, range("2023-12-01", "2023-12-31"));
    }

    #[test]
    fn test_custom_passthrough_no_swap() {
        // ---
        let anchor = day("2024-01-01");
        let r = resolve(
            ReportType::Custom,
            anchor,
            Some((day("2024-05-10"), day("2024-05-01"))),
        )
        .unwrap();
        assert_eq!(r, range("2024-05-10", "2024-05-01"));

        assert!(matches!(
            resolve(ReportType::Custom, anchor, None),
            Err(DashboardError::MissingCustomRange)
        ));
    }

    #[test]
    fn test_custom_range_is_capped() {
        // ---
        let anchor = day("2024-01-01");
        let r = resolve(
            ReportType::Custom,
            anchor,
            Some((day("2024-01-01"), day("2024-12-31"))),
        );
        assert!(r.is_ok());

        let r = resolve(
            ReportType::Custom,
            anchor,
            Some((day("0001-01-01"), day("9999-12-31"))),
        );
        assert!(matches!(r, Err(DashboardError::RangeTooLong(_))));
    }

    #[test]
    fn test_calendar_edge_is_invalid_date() {
        // ---
        for report_type in [ReportType::Weekly, ReportType::Monthly] {
            assert!(matches!(
                resolve(report_type, NaiveDate::MAX, None),
                Err(DashboardError::InvalidDate(_))
            ));
        }
        assert!(resolve(ReportType::Daily, NaiveDate::MAX, None).is_ok());
    }

    #[test]
    fn test_parse_day_rejects_bad_input() {
        // ---
        assert!(parse_day("2024-13-01").is_err());
        assert!(parse_day("01/02/2024").is_err());
    }
}
