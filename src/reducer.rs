//! Accumulators to final per-bucket metrics.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::buckets::{FloorAccumulator, FloorBuckets};
use crate::models::{FloorKey, FloorMetric, PeakSnapshot};
use crate::timezone::hkt_display;

// ---

/// `(bucket key, average, peak)` for one floor, ascending by key.
///
/// Bucket keys are fixed-width (`YYYY-MM-DD` / `HH:00`), so the map's
/// lexicographic order is chronological.
pub fn reduce_floor(
    buckets: &BTreeMap<String, FloorBuckets>,
    floor: FloorKey,
) -> Vec<(String, f64, f64)> {
    // ---
    buckets
        .iter()
        .map(|(key, floors)| {
            let (average, peak) = floors
                .get(&floor)
                .map_or((0.0, 0.0), |acc| (acc.average(), acc.peak_value));
            (key.clone(), average, peak)
        })
        .collect()
}

pub fn floor_series(buckets: &BTreeMap<String, FloorBuckets>, floor: FloorKey) -> Vec<FloorMetric> {
    reduce_floor(buckets, floor)
        .into_iter()
        .map(|(date, average_occupancy, peak_occupancy)| FloorMetric {
            date,
            average_occupancy,
            peak_occupancy,
        })
        .collect()
}

/// Series for every display floor.
pub fn display_series(
    buckets: &BTreeMap<String, FloorBuckets>,
) -> BTreeMap<FloorKey, Vec<FloorMetric>> {
    FloorKey::DISPLAY
        .iter()
        .map(|floor| (*floor, floor_series(buckets, *floor)))
        .collect()
}

/// Whole-building figures for one bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingMetric {
    // ---
    pub date: String,
    pub average_occupancy: f64,
    pub peak_occupancy: f64,
    pub peak_floor: Option<FloorKey>,
    pub peak_zone: Option<String>,
}

/// Pooled average and single highest reading over metered display floors.
///
/// The Main-Entrance pseudo floor and derived accumulators never contribute.
pub fn building_series(buckets: &BTreeMap<String, FloorBuckets>) -> Vec<BuildingMetric> {
    // ---
    buckets
        .iter()
        .map(|(date, floors)| {
            let mut sum = 0.0;
            let mut count = 0u32;
            let mut peak: Option<(FloorKey, &FloorAccumulator)> = None;

            for (floor, acc) in floors {
                if !floor.is_display() || acc.derived {
                    continue;
                }
                sum += acc.occupancy_sum;
                count += acc.occupancy_count;
                if acc.peak_value > peak.map_or(0.0, |(_, p)| p.peak_value) {
                    peak = Some((*floor, acc));
                }
            }

            BuildingMetric {
                date: date.clone(),
                average_occupancy: if count > 0 { sum / count as f64 } else { 0.0 },
                peak_occupancy: peak.map_or(0.0, |(_, p)| p.peak_value),
                peak_floor: peak.map(|(f, _)| f),
                peak_zone: peak.and_then(|(_, p)| p.peak_zone.clone()),
            }
        })
        .collect()
}

/// Busiest bucket in the range for `floor`.
///
/// `peak_date` is the HKT time of the peak reading, or the bucket date when
/// the figure was derived. Ties keep the earliest bucket.
pub fn snapshot(buckets: &BTreeMap<String, FloorBuckets>, floor: FloorKey) -> PeakSnapshot {
    // ---
    let mut best: Option<(&String, &FloorAccumulator)> = None;
    for (date, floors) in buckets {
        let Some(acc) = floors.get(&floor) else {
            continue;
        };
        if acc.peak_value > best.map_or(0.0, |(_, b)| b.peak_value) {
            best = Some((date, acc));
        }
    }

    match best {
        Some((date, acc)) => PeakSnapshot {
            floor,
            peak_occupancy: acc.peak_value,
            peak_date: acc
                .peak_timestamp
                .as_deref()
                .and_then(hkt_display)
                .or_else(|| Some(date.clone())),
            peak_zone: acc.peak_zone.clone(),
        },
        None => PeakSnapshot {
            floor,
            peak_occupancy: 0.0,
            peak_date: None,
            peak_zone: None,
        },
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn buckets() -> BTreeMap<String, FloorBuckets> {
        // ---
        let mut map = BTreeMap::new();
        let mut day1 = FloorBuckets::new();
        let mut acc = FloorAccumulator::default();
        acc.add(20.0, 10.0, "2024-01-01T02:00:00Z", "Pantry");
        acc.add(40.0, 14.0, "2024-01-01T03:00:00Z", "Office");
        day1.insert(FloorKey::Mf, acc);

        let mut acc = FloorAccumulator::default();
        acc.add(10.0, 30.0, "2024-01-01T04:00:00Z", "Lab");
        day1.insert(FloorKey::F2, acc);

        let mut acc = FloorAccumulator::default();
        acc.add(90.0, 99.0, "2024-01-01T04:00:00Z", "Main-Entrance");
        day1.insert(FloorKey::MainEntrance, acc);
        day1.insert(FloorKey::F1, FloorAccumulator::derived(50.0, 55.0));

        map.insert("2024-01-01".to_string(), day1);
        map.insert("2024-01-02".to_string(), FloorBuckets::new());
        map
    }

    #[test]
    fn test_floor_series_zero_fills() {
        // ---
        let series = floor_series(&buckets(), FloorKey::Mf);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].average_occupancy, 30.0);
        assert_eq!(series[0].peak_occupancy, 14.0);
        assert_eq!(series[1].date, "2024-01-02");
        assert_eq!(series[1].average_occupancy, 0.0);
        assert_eq!(series[1].peak_occupancy, 0.0);
    }

    #[test]
    fn test_display_series_hides_entrance() {
        // ---
        let all = display_series(&buckets());
        assert_eq!(all.len(), 4);
        assert!(!all.contains_key(&FloorKey::MainEntrance));
        assert_eq!(all[&FloorKey::F1][0].peak_occupancy, 55.0);
    }

    #[test]
    fn test_building_pools_metered_floors_only() {
        // ---
        let building = building_series(&buckets());
        // (20 + 40 + 10) / 3, entrance and derived 1F excluded
        assert!((building[0].average_occupancy - 70.0 / 3.0).abs() < 1e-9);
        assert_eq!(building[0].peak_occupancy, 30.0);
        assert_eq!(building[0].peak_floor, Some(FloorKey::F2));
        assert_eq!(building[0].peak_zone.as_deref(), Some("Lab"));
        assert_eq!(building[1].peak_floor, None);
        assert_eq!(building[1].average_occupancy, 0.0);
    }

    #[test]
    fn test_snapshot_metered_and_derived() {
        // ---
        let b = buckets();
        let mf = snapshot(&b, FloorKey::Mf);
        assert_eq!(mf.peak_occupancy, 14.0);
        assert_eq!(mf.peak_date.as_deref(), Some("2024-01-01 11:00:00"));
        assert_eq!(mf.peak_zone.as_deref(), Some("Office"));

        let first = snapshot(&b, FloorKey::F1);
        assert_eq!(first.peak_occupancy, 55.0);
        assert_eq!(first.peak_date.as_deref(), Some("2024-01-01"));
        assert_eq!(first.peak_zone, None);

        let empty = snapshot(&b, FloorKey::F3);
        assert_eq!(empty.peak_occupancy, 0.0);
        assert_eq!(empty.peak_date, None);
    }
}
