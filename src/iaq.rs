//! Daily indoor-air-quality aggregation per floor.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::buckets::fill_days_with;
use crate::error::DashboardResult;
use crate::models::{DateRange, FloorKey, IaqReading};
use crate::timezone::hkt_day_key;
use crate::zones::{map_iaq, ZoneMapping};

// ---

/// Running mean of one channel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Mean {
    sum: f64,
    count: u32,
}

impl Mean {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn add_opt(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.add(v);
        }
    }

    fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct IaqAccumulator {
    co2: Mean,
    temp: Mean,
    humidity: Mean,
    pm2_5: Mean,
    pm10: Mean,
    tvoc: Mean,
    peak_co2: f64,
}

impl IaqAccumulator {
    fn add(&mut self, reading: &IaqReading) {
        // ---
        self.co2.add(reading.co2);
        self.temp.add(reading.temp);
        self.humidity.add(reading.humidity);
        self.pm2_5.add_opt(reading.pm2_5);
        self.pm10.add_opt(reading.pm10);
        self.tvoc.add_opt(reading.tvoc);
        if reading.co2 > self.peak_co2 {
            self.peak_co2 = reading.co2;
        }
    }
}

/// One floor-day of IAQ figures.
///
/// Core channels are 0 for a day without readings; optional pollutants are
/// `None` unless at least one reading carried them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IaqDailyMetric {
    // ---
    pub date: String,
    pub readings: u32,
    pub average_co2: f64,
    pub peak_co2: f64,
    pub average_temp: f64,
    pub average_humidity: f64,
    pub average_pm2_5: Option<f64>,
    pub average_pm10: Option<f64>,
    pub average_tvoc: Option<f64>,
}

/// Zero-filled daily IAQ series for every display floor.
pub fn iaq_daily(
    readings: &[IaqReading],
    range: &DateRange,
) -> DashboardResult<BTreeMap<FloorKey, Vec<IaqDailyMetric>>> {
    // ---
    let seed: BTreeMap<FloorKey, IaqAccumulator> = FloorKey::DISPLAY
        .iter()
        .map(|f| (*f, IaqAccumulator::default()))
        .collect();
    let mut days = fill_days_with(range, seed)?;

    let mut dropped = 0usize;
    for reading in readings {
        let ZoneMapping::Mapped(placement) = map_iaq(reading) else {
            dropped += 1;
            continue;
        };
        let Some(day) = hkt_day_key(&reading.timestamp) else {
            dropped += 1;
            continue;
        };
        let Some(floors) = days.get_mut(&day) else {
            dropped += 1;
            continue;
        };
        floors.entry(placement.floor).or_default().add(reading);
    }
    tracing::debug!(
        "IAQ grouped {} readings, {} dropped",
        readings.len() - dropped,
        dropped
    );

    let series = FloorKey::DISPLAY
        .iter()
        .map(|floor| {
            let metrics = days
                .iter()
                .map(|(date, floors)| {
                    let acc = floors.get(floor).cloned().unwrap_or_default();
                    IaqDailyMetric {
                        date: date.clone(),
                        readings: acc.co2.count,
                        average_co2: acc.co2.value().unwrap_or(0.0),
                        peak_co2: acc.peak_co2,
                        average_temp: acc.temp.value().unwrap_or(0.0),
                        average_humidity: acc.humidity.value().unwrap_or(0.0),
                        average_pm2_5: acc.pm2_5.value(),
                        average_pm10: acc.pm10.value(),
                        average_tvoc: acc.tvoc.value(),
                    }
                })
                .collect();
            (*floor, metrics)
        })
        .collect();

    Ok(series)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn reading(device: &str, ts: &str, co2: f64, pm2_5: Option<f64>) -> IaqReading {
        IaqReading {
            device: device.into(),
            timestamp: ts.into(),
            co2,
            temp: 24.0,
            humidity: 60.0,
            pm2_5,
            pm10: None,
            tvoc: None,
        }
    }

    fn range(start: &str, end: &str) -> DateRange {
        DateRange {
            start_date: start.into(),
            end_date: end.into(),
        }
    }

    #[test]
    fn test_device_to_floor_average() {
        // ---
        let readings = vec![
            reading("IAQ-2F-01", "2024-01-01T02:00:00Z", 600.0, Some(10.0)),
            reading("IAQ-2F-02", "2024-01-01T03:00:00Z", 800.0, None),
            reading("IAQ-3F-01", "2024-01-02T03:00:00Z", 500.0, None),
        ];
        let series = iaq_daily(&readings, &range("2024-01-01", "2024-01-02")).unwrap();

        let second = &series[&FloorKey::F2];
        assert_eq!(second.len(), 2);
        assert_eq!(second[0].readings, 2);
        assert_eq!(second[0].average_co2, 700.0);
        assert_eq!(second[0].peak_co2, 800.0);
        assert_eq!(second[0].average_pm2_5, Some(10.0));
        assert_eq!(second[0].average_pm10, None);
        assert_eq!(second[1].average_co2, 0.0);

        assert_eq!(series[&FloorKey::F3][1].average_co2, 500.0);
    }

    #[test]
    fn test_unknown_device_dropped() {
        // ---
        let readings = vec![reading("LEGACY-99", "2024-01-01T02:00:00Z", 2000.0, None)];
        let series = iaq_daily(&readings, &range("2024-01-01", "2024-01-01")).unwrap();

        for metrics in series.values() {
            assert_eq!(metrics[0].readings, 0);
            assert_eq!(metrics[0].peak_co2, 0.0);
        }
    }
}
