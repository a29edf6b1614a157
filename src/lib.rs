//! Occupancy and IAQ dashboard backend.
//!
//! Raw per-zone readings are fetched for a resolved report range, grouped
//! into gapless HKT day buckets per floor, post-processed into the derived
//! 1F figure, reduced to average/peak series and served as JSON or CSV.
//!
//! Module boundaries follow EMBP: `routes` is the only HTTP-aware module,
//! `fetch` the only upstream-aware one, and everything between them is
//! pure data transformation.

pub mod buckets;
pub mod config;
pub mod dashboard;
pub mod date_range;
pub mod derived;
pub mod error;
pub mod export;
pub mod fetch;
pub mod grouping;
pub mod iaq;
pub mod models;
pub mod reducer;
pub mod report;
pub mod routes;
pub mod timezone;
pub mod zones;

pub use config::Config;
pub use dashboard::{Dashboard, DashboardState, RefreshTask, ViewSelection};
pub use error::{DashboardError, DashboardResult};
pub use models::{DateRange, FloorKey, FloorMetric, IaqReading, PeakSnapshot, RawReading, ReportType};
pub use report::OccupancyReport;
