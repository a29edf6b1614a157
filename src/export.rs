//! Flattening metric series and snapshots into CSV-ready tables.

use crate::error::{DashboardError, DashboardResult};
use crate::models::{DateRange, FloorMetric, PeakSnapshot, ReportType};

// ---

pub const NOT_AVAILABLE: &str = "N/A";
pub const SUMMARY_LABEL: &str = "Summary";

pub const TREND_HEADERS: [&str; 3] = ["Date", "Average Occupancy (%)", "Peak Occupancy"];
pub const SNAPSHOT_HEADERS: [&str; 4] = ["Floor", "Peak Occupancy", "Peak Time", "Peak Zone"];

/// Ordered rows sharing one header set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ExportTable {
    // ---
    fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.headers.len());
        self.rows.push(row);
    }

    /// Rows as `(header, value)` pairs, in column order.
    pub fn keyed_rows(&self) -> Vec<Vec<(&str, &str)>> {
        self.rows
            .iter()
            .map(|row| {
                self.headers
                    .iter()
                    .map(String::as_str)
                    .zip(row.iter().map(String::as_str))
                    .collect()
            })
            .collect()
    }

    /// Encode as CSV with a header line.
    pub fn to_csv(&self) -> DashboardResult<Vec<u8>> {
        // ---
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer
            .into_inner()
            .map_err(|e| DashboardError::Csv(e.into_error().into()))
    }
}

fn average_cell(value: f64) -> String {
    if value.is_finite() {
        format!("{:.2}", value)
    } else {
        NOT_AVAILABLE.to_string()
    }
}

/// Whole number, half away from zero.
fn peak_cell(value: f64) -> String {
    if value.is_finite() {
        format!("{:.0}", value.round())
    } else {
        NOT_AVAILABLE.to_string()
    }
}

fn text_cell(value: Option<&str>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

/// Trend export: one row per bucket, a blank separator row, then a summary
/// row (mean of the row averages, max of the row peaks).
pub fn trend_table(series: &[FloorMetric]) -> DashboardResult<ExportTable> {
    // ---
    if series.is_empty() {
        return Err(DashboardError::NoData);
    }

    let mut table = ExportTable::new(&TREND_HEADERS);
    for metric in series {
        table.push(vec![
            metric.date.clone(),
            average_cell(metric.average_occupancy),
            peak_cell(metric.peak_occupancy),
        ]);
    }

    let mean = series.iter().map(|m| m.average_occupancy).sum::<f64>() / series.len() as f64;
    let max = series
        .iter()
        .map(|m| m.peak_occupancy)
        .fold(f64::NEG_INFINITY, f64::max);

    table.push(vec![String::new(); TREND_HEADERS.len()]);
    table.push(vec![
        SUMMARY_LABEL.to_string(),
        average_cell(mean),
        peak_cell(max),
    ]);
    Ok(table)
}

/// Snapshot export: one row per floor card.
pub fn snapshot_table(snapshots: &[PeakSnapshot]) -> DashboardResult<ExportTable> {
    // ---
    if snapshots.is_empty() {
        return Err(DashboardError::NoData);
    }

    let mut table = ExportTable::new(&SNAPSHOT_HEADERS);
    for snap in snapshots {
        table.push(vec![
            snap.floor.to_string(),
            peak_cell(snap.peak_occupancy),
            text_cell(snap.peak_date.as_deref()),
            text_cell(snap.peak_zone.as_deref()),
        ]);
    }
    Ok(table)
}

/// `<Entity>_<Floor>_Occupancy_<reportType>_<start>_to_<end>.csv`
pub fn export_filename(entity: &str, floor: &str, report_type: ReportType, range: &DateRange) -> String {
    // ---
    let clean = |s: &str| s.trim().replace(char::is_whitespace, "_");
    format!(
        "{}_{}_Occupancy_{}_{}_to_{}.csv",
        clean(entity),
        clean(floor),
        report_type,
        range.start_date,
        range.end_date
    )
}
