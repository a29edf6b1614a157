//! End-to-end occupancy pipeline: bucket, group, derive, reduce.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::buckets::{fill_days, fill_hours};
use crate::derived::derive_first_floor;
use crate::error::DashboardResult;
use crate::grouping::{group_by_day, group_by_hour, zone_summaries, ZoneSummary};
use crate::models::{DateRange, FloorKey, FloorMetric, PeakSnapshot, RawReading};
use crate::reducer::{building_series, display_series, reduce_floor, snapshot, BuildingMetric};

// ---

/// Everything the occupancy views render for one range.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupancyReport {
    // ---
    pub range: DateRange,
    pub floors: BTreeMap<FloorKey, Vec<FloorMetric>>,
    pub building: Vec<BuildingMetric>,
    pub snapshots: Vec<PeakSnapshot>,
    pub zones: Vec<ZoneSummary>,
}

impl OccupancyReport {
    // ---
    /// Run the daily pipeline over `readings` for `range`.
    ///
    /// An empty or fully out-of-range payload yields zero-filled series.
    pub fn build(readings: &[RawReading], range: &DateRange) -> DashboardResult<Self> {
        // ---
        let mut days = fill_days(range, &FloorKey::TRACKED)?;
        group_by_day(readings, &mut days);

        // Building figures come from metered floors only, before 1F is synthesised
        let building = building_series(&days);
        derive_first_floor(&mut days);

        let snapshots = FloorKey::DISPLAY
            .iter()
            .map(|floor| snapshot(&days, *floor))
            .collect();

        Ok(Self {
            range: range.clone(),
            floors: display_series(&days),
            building,
            snapshots,
            zones: zone_summaries(readings, range),
        })
    }

    /// Series for one display floor; empty for the pseudo floor.
    pub fn floor(&self, floor: FloorKey) -> &[FloorMetric] {
        self.floors.get(&floor).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn snapshot(&self, floor: FloorKey) -> Option<&PeakSnapshot> {
        self.snapshots.iter().find(|s| s.floor == floor)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyMetric {
    pub hour: String,
    pub average_occupancy: f64,
    pub peak_occupancy: f64,
}

/// HKT hour-of-day profile of a single day, per display floor.
pub fn hourly_profile(readings: &[RawReading], day: &str) -> BTreeMap<FloorKey, Vec<HourlyMetric>> {
    // ---
    let mut hours = fill_hours(&FloorKey::TRACKED);
    group_by_hour(readings, day, &mut hours);
    derive_first_floor(&mut hours);

    FloorKey::DISPLAY
        .iter()
        .map(|floor| {
            let series = reduce_floor(&hours, *floor)
                .into_iter()
                .map(|(hour, average_occupancy, peak_occupancy)| HourlyMetric {
                    hour,
                    average_occupancy,
                    peak_occupancy,
                })
                .collect();
            (*floor, series)
        })
        .collect()
}
