//! Gapless day (and hour) bucket maps with zeroed per-floor accumulators.

use std::collections::BTreeMap;

use crate::date_range::{format_day, parse_day};
use crate::error::DashboardResult;
use crate::models::{DateRange, FloorKey};
use crate::timezone::hour_label;

// ---

/// Running totals for one floor in one bucket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloorAccumulator {
    // ---
    pub occupancy_sum: f64,
    pub occupancy_count: u32,
    pub peak_value: f64,
    pub peak_timestamp: Option<String>,
    pub peak_zone: Option<String>,
    /// Set when the values were synthesised rather than metered.
    pub derived: bool,
}

impl FloorAccumulator {
    // ---
    /// Fold in one reading. Peak replacement is strict, so ties keep the
    /// first-seen reading.
    pub fn add(&mut self, percentage: f64, total: f64, timestamp: &str, zone: &str) {
        // ---
        self.occupancy_sum += percentage;
        self.occupancy_count += 1;

        if total > self.peak_value {
            self.peak_value = total;
            self.peak_timestamp = Some(timestamp.to_string());
            self.peak_zone = Some(zone.to_string());
        }
    }

    /// Mean percentage, 0 for an empty bucket.
    pub fn average(&self) -> f64 {
        if self.occupancy_count > 0 {
            self.occupancy_sum / self.occupancy_count as f64
        } else {
            0.0
        }
    }

    /// Accumulator holding a derived average and peak. It reduces to exactly
    /// `average` and `peak` and carries no source reading.
    pub fn derived(average: f64, peak: f64) -> Self {
        Self {
            occupancy_sum: average,
            occupancy_count: 1,
            peak_value: peak,
            peak_timestamp: None,
            peak_zone: None,
            derived: true,
        }
    }
}

pub type FloorBuckets = BTreeMap<FloorKey, FloorAccumulator>;

/// Day key (`YYYY-MM-DD`) to per-floor accumulators, ascending.
pub type DayBuckets = BTreeMap<String, FloorBuckets>;

/// One `seed` per calendar day of `range`, inclusive, ascending.
///
/// Walks day by day so the map size is always `days_between + 1`. An
/// inverted range yields an empty map.
pub fn fill_days_with<T: Clone>(range: &DateRange, seed: T) -> DashboardResult<BTreeMap<String, T>> {
    // ---
    let start = parse_day(&range.start_date)?;
    let end = parse_day(&range.end_date)?;

    let mut days = BTreeMap::new();
    let mut cursor = Some(start);
    while let Some(day) = cursor.filter(|d| *d <= end) {
        days.insert(format_day(day), seed.clone());
        cursor = day.succ_opt();
    }

    if days.is_empty() {
        tracing::debug!(
            "Empty bucket range {} to {}",
            range.start_date,
            range.end_date
        );
    }
    Ok(days)
}

pub fn zeroed_floors(floors: &[FloorKey]) -> FloorBuckets {
    floors
        .iter()
        .map(|f| (*f, FloorAccumulator::default()))
        .collect()
}

/// Zero-initialised day buckets for the tracked floors.
pub fn fill_days(range: &DateRange, floors: &[FloorKey]) -> DashboardResult<DayBuckets> {
    fill_days_with(range, zeroed_floors(floors))
}

/// Twenty-four zeroed hour buckets keyed `00:00`..`23:00`.
pub fn fill_hours(floors: &[FloorKey]) -> BTreeMap<String, FloorBuckets> {
    // ---
    let seed = zeroed_floors(floors);
    (0..24).map(|h| (hour_label(h), seed.clone())).collect()
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn range(start: &str, end: &str) -> DateRange {
        DateRange {
            start_date: start.into(),
            end_date: end.into(),
        }
    }

    #[test]
    fn test_size_is_days_plus_one() {
        // ---
        let days = fill_days(&range("2024-02-01", "2024-02-29"), &FloorKey::TRACKED).unwrap();
        assert_eq!(days.len(), 29);

        let single = fill_days(&range("2024-02-29", "2024-02-29"), &FloorKey::TRACKED).unwrap();
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn test_ascending_and_gapless_across_year_end() {
        // ---
        let days = fill_days(&range("2023-12-30", "2024-01-02"), &FloorKey::TRACKED).unwrap();
        let keys: Vec<_> = days.keys().cloned().collect();
        assert_eq!(
            keys,
            vec!["2023-12-30", "2023-12-31", "2024-01-01", "2024-01-02"]
        );
        for floors in days.values() {
            assert_eq!(floors.len(), FloorKey::TRACKED.len());
            assert!(floors.values().all(|acc| *acc == FloorAccumulator::default()));
        }
    }

    #[test]
    fn test_inverted_range_is_empty() {
        // ---
        let days = fill_days(&range("2024-05-10", "2024-05-01"), &FloorKey::TRACKED).unwrap();
        assert!(days.is_empty());
    }

    #[test]
    fn test_bad_date_is_error() {
        // ---
        assert!(fill_days(&range("2024-05-xx", "2024-05-01"), &FloorKey::TRACKED).is_err());
    }

    #[test]
    fn test_accumulator_peak_ties_keep_first() {
        // ---
        let mut acc = FloorAccumulator::default();
        acc.add(20.0, 8.0, "t1", "A");
        acc.add(40.0, 8.0, "t2", "B");
        acc.add(10.0, 3.0, "t3", "C");
        assert_eq!(acc.average(), 70.0 / 3.0);
        assert_eq!(acc.peak_value, 8.0);
        assert_eq!(acc.peak_zone.as_deref(), Some("A"));
        assert_eq!(acc.peak_timestamp.as_deref(), Some("t1"));
    }

    #[test]
    fn test_empty_accumulator_average_is_zero() {
        // ---
        assert_eq!(FloorAccumulator::default().average(), 0.0);
    }

    #[test]
    fn test_hours() {
        // ---
        let hours = fill_hours(&FloorKey::TRACKED);
        assert_eq!(hours.len(), 24);
        assert_eq!(hours.keys().next().map(String::as_str), Some("00:00"));
        assert_eq!(hours.keys().last().map(String::as_str), Some("23:00"));
    }
}
