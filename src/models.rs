//! Data models for the occupancy and IAQ pipelines.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

// ---

/// Canonical building level.
///
/// `MainEntrance` is an ingestion-only pseudo floor: it feeds the 1F
/// derivation and is never shown as a display floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FloorKey {
    // ---
    #[serde(rename = "1F")]
    F1,
    #[serde(rename = "MF")]
    Mf,
    #[serde(rename = "2F")]
    F2,
    #[serde(rename = "3F")]
    F3,
    #[serde(rename = "Main-Entrance")]
    MainEntrance,
}

impl FloorKey {
    // ---
    /// Floors shown on the dashboard, in display order.
    pub const DISPLAY: [FloorKey; 4] = [FloorKey::F1, FloorKey::Mf, FloorKey::F2, FloorKey::F3];

    /// Every floor tracked during grouping, including the pseudo floor.
    pub const TRACKED: [FloorKey; 5] = [
        FloorKey::F1,
        FloorKey::Mf,
        FloorKey::F2,
        FloorKey::F3,
        FloorKey::MainEntrance,
    ];

    /// Floors with their own sensors that are subtracted from Main-Entrance.
    pub const UPPER: [FloorKey; 3] = [FloorKey::Mf, FloorKey::F2, FloorKey::F3];

    pub fn as_str(&self) -> &'static str {
        match self {
            FloorKey::F1 => "1F",
            FloorKey::Mf => "MF",
            FloorKey::F2 => "2F",
            FloorKey::F3 => "3F",
            FloorKey::MainEntrance => "Main-Entrance",
        }
    }

    pub fn is_display(&self) -> bool {
        !matches!(self, FloorKey::MainEntrance)
    }
}

impl fmt::Display for FloorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FloorKey {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // ---
        match s.trim() {
            "1F" => Ok(FloorKey::F1),
            "MF" => Ok(FloorKey::Mf),
            "2F" => Ok(FloorKey::F2),
            "3F" => Ok(FloorKey::F3),
            "Main-Entrance" => Ok(FloorKey::MainEntrance),
            other => Err(DashboardError::InvalidFloor(other.to_string())),
        }
    }
}

/// Report granularity selected on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Daily,
    Weekly,
    Monthly,
    Custom,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Daily => "daily",
            ReportType::Weekly => "weekly",
            ReportType::Monthly => "monthly",
            ReportType::Custom => "custom",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportType {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(ReportType::Daily),
            "weekly" => Ok(ReportType::Weekly),
            "monthly" => Ok(ReportType::Monthly),
            "custom" => Ok(ReportType::Custom),
            other => Err(DashboardError::InvalidReportType(other.to_string())),
        }
    }
}

/// One people-counting sample from the occupancy endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReading {
    // ---
    #[serde(alias = "floor_id", alias = "floor")]
    pub floor_id: String,
    #[serde(alias = "zone_name", alias = "zone", default)]
    pub zone_name: String,
    pub timestamp: String,
    #[serde(alias = "total_occupancy", default)]
    pub total_occupancy: f64,
    #[serde(alias = "occupancy_percentage", default)]
    pub occupancy_percentage: f64,
    #[serde(alias = "max_capacity", default)]
    pub max_capacity: f64,
}

/// One indoor-air-quality sample; identified by device only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IaqReading {
    // ---
    #[serde(alias = "deviceId", alias = "device_id")]
    pub device: String,
    pub timestamp: String,
    pub co2: f64,
    #[serde(alias = "temperature")]
    pub temp: f64,
    pub humidity: f64,
    #[serde(default, alias = "pm25")]
    pub pm2_5: Option<f64>,
    #[serde(default)]
    pub pm10: Option<f64>,
    #[serde(default)]
    pub tvoc: Option<f64>,
}

/// Per-bucket output consumed by charts and exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorMetric {
    pub date: String,
    pub average_occupancy: f64,
    pub peak_occupancy: f64,
}

/// Single-card summary of the busiest moment in a range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeakSnapshot {
    // ---
    pub floor: FloorKey,
    pub peak_occupancy: f64,
    pub peak_date: Option<String>,
    pub peak_zone: Option<String>,
}

/// Resolved inclusive calendar-day range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
}
