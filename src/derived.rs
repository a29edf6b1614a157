//! Synthesised 1F figures.
//!
//! 1F has no sensor of its own. Its figure is the Main-Entrance counter
//! minus the metered floors above it, clamped at zero, applied separately
//! to the peak and to the average of every bucket:
//!
//! ```text
//! 1F = max(0, Main-Entrance - MF - 2F - 3F)
//! ```
//!
//! This is an approximation: it under- or over-counts whenever entrance
//! traffic does not dominate upper-floor traffic. Keep the formula as is.

use std::collections::BTreeMap;

use crate::buckets::{FloorAccumulator, FloorBuckets};
use crate::models::FloorKey;

// ---

/// `max(0, entrance - Σ upper)`.
pub fn clamp_subtract(entrance: f64, upper: impl IntoIterator<Item = f64>) -> f64 {
    (entrance - upper.into_iter().sum::<f64>()).max(0.0)
}

/// Replace the 1F accumulator of one bucket with the derived figures.
///
/// Floors absent from the bucket contribute 0.
pub fn derive_bucket(floors: &mut FloorBuckets) {
    // ---
    let value = |floor: FloorKey, f: fn(&FloorAccumulator) -> f64| {
        floors.get(&floor).map_or(0.0, f)
    };

    let peak = clamp_subtract(
        value(FloorKey::MainEntrance, |a| a.peak_value),
        FloorKey::UPPER.iter().map(|f| value(*f, |a| a.peak_value)),
    );
    let average = clamp_subtract(
        value(FloorKey::MainEntrance, FloorAccumulator::average),
        FloorKey::UPPER.iter().map(|f| value(*f, FloorAccumulator::average)),
    );

    if floors
        .get(&FloorKey::F1)
        .is_some_and(|acc| acc.occupancy_count > 0 && !acc.derived)
    {
        tracing::debug!("Direct 1F readings present; replaced by derived figure");
    }
    floors.insert(FloorKey::F1, FloorAccumulator::derived(average, peak));
}

/// Derive 1F for every bucket of a day or hour map.
pub fn derive_first_floor(buckets: &mut BTreeMap<String, FloorBuckets>) {
    for floors in buckets.values_mut() {
        derive_bucket(floors);
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn bucket(entries: &[(FloorKey, f64, f64)]) -> FloorBuckets {
        // (floor, peak, average)
        entries
            .iter()
            .map(|(floor, peak, avg)| {
                let mut acc = FloorAccumulator::default();
                acc.add(*avg, *peak, "2024-01-01T00:00:00Z", "zone");
                (*floor, acc)
            })
            .collect()
    }

    #[test]
    fn test_subtracts_upper_floors() {
        // ---
        let mut floors = bucket(&[
            (FloorKey::MainEntrance, 100.0, 60.0),
            (FloorKey::Mf, 30.0, 10.0),
            (FloorKey::F2, 20.0, 5.0),
            (FloorKey::F3, 0.0, 0.0),
        ]);
        derive_bucket(&mut floors);

        let first = &floors[&FloorKey::F1];
        assert_eq!(first.peak_value, 50.0);
        assert_eq!(first.average(), 45.0);
        assert!(first.derived);
        assert_eq!(first.peak_zone, None);
    }

    #[test]
    fn test_clamped_at_zero() {
        // ---
        let mut floors = bucket(&[(FloorKey::MainEntrance, 10.0, 5.0), (FloorKey::Mf, 50.0, 20.0)]);
        derive_bucket(&mut floors);

        assert_eq!(floors[&FloorKey::F1].peak_value, 0.0);
        assert_eq!(floors[&FloorKey::F1].average(), 0.0);
    }

    #[test]
    fn test_missing_floors_contribute_zero() {
        // ---
        let mut floors = FloorBuckets::new();
        derive_bucket(&mut floors);
        assert_eq!(floors[&FloorKey::F1].peak_value, 0.0);

        let mut floors = bucket(&[(FloorKey::MainEntrance, 42.0, 21.0)]);
        derive_bucket(&mut floors);
        assert_eq!(floors[&FloorKey::F1].peak_value, 42.0);
        assert_eq!(floors[&FloorKey::F1].average(), 21.0);
    }

    #[test]
    fn test_monotonic_in_entrance_peak() {
        // ---
        let mut last = 0.0;
        for entrance in (0..200).step_by(5) {
            let derived = clamp_subtract(entrance as f64, [30.0, 20.0, 15.0]);
            assert!(derived >= 0.0);
            assert!(derived >= last);
            last = derived;
        }
    }
}
