//! Folding raw occupancy readings into day / hour buckets and zone totals.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::buckets::{FloorAccumulator, FloorBuckets};
use crate::models::{DateRange, FloorKey, RawReading};
use crate::timezone::{hkt_day_key, hkt_display, hkt_hour, hour_label};
use crate::zones::{map_occupancy, MappingPurpose, ZoneMapping};

// ---

/// Counters describing what happened to each input reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupStats {
    pub accepted: usize,
    pub excluded: usize,
    pub unmapped: usize,
    pub out_of_range: usize,
    pub bad_timestamp: usize,
}

/// Fold readings into `buckets` using `bucket_key` to pick the bucket.
///
/// Readings whose key is missing from `buckets` are skipped silently; the
/// bucket map is the range filter.
pub fn group_into<F>(
    readings: &[RawReading],
    buckets: &mut BTreeMap<String, FloorBuckets>,
    bucket_key: F,
) -> GroupStats
where
    F: Fn(&str) -> Option<String>,
{
    // ---
    let mut stats = GroupStats::default();

    for reading in readings {
        let placement = match map_occupancy(reading, MappingPurpose::FloorBuckets) {
            ZoneMapping::Mapped(p) => p,
            ZoneMapping::Excluded => {
                stats.excluded += 1;
                continue;
            }
            ZoneMapping::Unmapped => {
                stats.unmapped += 1;
                continue;
            }
        };

        let Some(key) = bucket_key(&reading.timestamp) else {
            tracing::debug!("Unparseable timestamp '{}'; reading dropped", reading.timestamp);
            stats.bad_timestamp += 1;
            continue;
        };

        let Some(floors) = buckets.get_mut(&key) else {
            stats.out_of_range += 1;
            continue;
        };

        floors.entry(placement.floor).or_default().add(
            reading.occupancy_percentage,
            reading.total_occupancy,
            &reading.timestamp,
            placement.zone,
        );
        stats.accepted += 1;
    }

    tracing::debug!(
        accepted = stats.accepted,
        excluded = stats.excluded,
        unmapped = stats.unmapped,
        out_of_range = stats.out_of_range,
        bad_timestamp = stats.bad_timestamp,
        "Grouped {} readings",
        readings.len()
    );
    stats
}

/// Group by HKT calendar day.
pub fn group_by_day(
    readings: &[RawReading],
    buckets: &mut BTreeMap<String, FloorBuckets>,
) -> GroupStats {
    group_into(readings, buckets, hkt_day_key)
}

/// Group the readings of one HKT day by hour of day.
pub fn group_by_hour(
    readings: &[RawReading],
    day: &str,
    buckets: &mut BTreeMap<String, FloorBuckets>,
) -> GroupStats {
    // ---
    group_into(readings, buckets, |timestamp| {
        let reading_day = hkt_day_key(timestamp)?;
        if reading_day != day {
            // Out-of-day readings map to a key no bucket has
            return Some(reading_day);
        }
        hkt_hour(timestamp).map(hour_label)
    })
}

/// Range-wide totals for one zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneSummary {
    // ---
    pub floor: FloorKey,
    pub zone: String,
    pub average_occupancy: f64,
    pub peak_occupancy: f64,
    pub peak_time: Option<String>,
}

/// Per-zone average and peak across `range`, Main-Entrance excluded.
pub fn zone_summaries(readings: &[RawReading], range: &DateRange) -> Vec<ZoneSummary> {
    // ---
    let mut zones: BTreeMap<(FloorKey, String), FloorAccumulator> = BTreeMap::new();

    for reading in readings {
        let Some(placement) = map_occupancy(reading, MappingPurpose::ZoneSums).placement() else {
            continue;
        };
        let Some(day) = hkt_day_key(&reading.timestamp) else {
            continue;
        };
        if day < range.start_date || day > range.end_date {
            continue;
        }
        zones
            .entry((placement.floor, placement.zone.to_string()))
            .or_default()
            .add(
                reading.occupancy_percentage,
                reading.total_occupancy,
                &reading.timestamp,
                placement.zone,
            );
    }

    zones
        .into_iter()
        .map(|((floor, zone), acc)| ZoneSummary {
            floor,
            zone,
            average_occupancy: acc.average(),
            peak_occupancy: acc.peak_value,
            peak_time: acc.peak_timestamp.as_deref().and_then(hkt_display),
        })
        .collect()
}
