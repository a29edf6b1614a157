//! Dashboard view state and its refresh lifecycle.
//!
//! Every trigger (view change or silent timer tick) runs the full pipeline.
//! Requests are tagged with a generation number and a response is applied
//! only if no newer request was issued meanwhile, so a slow stale response
//! can never overwrite a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::date_range::resolve;
use crate::error::DashboardResult;
use crate::fetch::ReadingSource;
use crate::models::{DateRange, FloorKey, FloorMetric, ReportType};
use crate::report::OccupancyReport;

// ---

/// Monotonic request counter.
#[derive(Debug, Default)]
pub struct GenerationCounter(AtomicU64);

impl GenerationCounter {
    // ---
    /// Issue a new token; it becomes the latest.
    pub fn issue(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn latest(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    pub fn is_latest(&self, token: u64) -> bool {
        token == self.latest()
    }
}

/// What the operator is looking at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSelection {
    // ---
    pub report_type: ReportType,
    pub anchor: NaiveDate,
    pub custom: Option<(NaiveDate, NaiveDate)>,
    pub floor: FloorKey,
}

impl ViewSelection {
    pub fn range(&self) -> DashboardResult<DateRange> {
        resolve(self.report_type, self.anchor, self.custom)
    }
}

#[derive(Debug)]
struct Inner {
    view: ViewSelection,
    loading: bool,
    error: Option<String>,
    /// Range the current `report` was built for.
    loaded_range: Option<DateRange>,
    report: Option<OccupancyReport>,
}

/// Serializable view of the dashboard for the UI layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardState {
    // ---
    pub view: ViewSelection,
    pub loading: bool,
    pub error: Option<String>,
    pub generation: u64,
    pub report: Option<OccupancyReport>,
}

impl DashboardState {
    /// Series of the selected floor, if a report is loaded.
    pub fn selected_series(&self) -> Option<&[FloorMetric]> {
        self.report.as_ref().map(|r| r.floor(self.view.floor))
    }
}

pub struct Dashboard {
    source: Arc<dyn ReadingSource>,
    generations: GenerationCounter,
    inner: RwLock<Inner>,
}

impl Dashboard {
    // ---
    pub fn new(source: Arc<dyn ReadingSource>, view: ViewSelection) -> Self {
        Self {
            source,
            generations: GenerationCounter::default(),
            inner: RwLock::new(Inner {
                view,
                loading: false,
                error: None,
                loaded_range: None,
                report: None,
            }),
        }
    }

    pub async fn state(&self) -> DashboardState {
        // ---
        let inner = self.inner.read().await;
        DashboardState {
            view: inner.view.clone(),
            loading: inner.loading,
            error: inner.error.clone(),
            generation: self.generations.latest(),
            report: inner.report.clone(),
        }
    }

    /// Change the view and fetch for it.
    pub async fn set_view(&self, view: ViewSelection) -> bool {
        // ---
        self.inner.write().await.view = view;
        self.refresh(false).await
    }

    /// Switch floor tabs. The loaded report already carries every floor, so
    /// this only refetches when nothing is loaded for the current range.
    pub async fn select_floor(&self, floor: FloorKey) -> bool {
        // ---
        let mut inner = self.inner.write().await;
        inner.view.floor = floor;

        let covered = match inner.view.range() {
            Ok(range) => inner.report.is_some() && inner.loaded_range.as_ref() == Some(&range),
            Err(_) => false,
        };
        if covered {
            tracing::debug!("Floor {} served from loaded report", floor);
            return true;
        }

        drop(inner);
        self.refresh(false).await
    }

    /// Run the pipeline once. Returns `true` if the outcome was applied,
    /// `false` if it was superseded by a newer request or failed.
    ///
    /// A silent refresh leaves the loading flag untouched.
    pub async fn refresh(&self, silent: bool) -> bool {
        // ---
        let token = self.generations.issue();

        let range = {
            let mut inner = self.inner.write().await;
            match inner.view.range() {
                Ok(range) => {
                    if !silent {
                        inner.loading = true;
                    }
                    range
                }
                Err(e) => {
                    inner.error = Some(e.user_message());
                    inner.report = None;
                    return false;
                }
            }
        };

        tracing::debug!(
            generation = token,
            silent,
            "Refreshing {} to {}",
            range.start_date,
            range.end_date
        );
        let fetched = self.source.occupancy(&range).await;

        let mut inner = self.inner.write().await;
        if !self.generations.is_latest(token) {
            tracing::debug!(
                "Discarding stale response (generation {}, latest {})",
                token,
                self.generations.latest()
            );
            return false;
        }
        inner.loading = false;

        let outcome = fetched.and_then(|readings| {
            let report = OccupancyReport::build(&readings, &range)?;
            Ok((readings, report))
        });

        match outcome {
            Ok((readings, report)) => {
                tracing::info!(
                    "Dashboard updated: {} readings, {} to {}",
                    readings.len(),
                    range.start_date,
                    range.end_date
                );
                inner.loaded_range = Some(range);
                inner.report = Some(report);
                inner.error = None;
                true
            }
            Err(e) => {
                tracing::error!("Dashboard refresh failed: {}", e);
                inner.loaded_range = None;
                inner.report = None;
                inner.error = Some(e.user_message());
                false
            }
        }
    }
}

/// Owned handle for the periodic silent refresh.
///
/// At most one timer runs per handle: `start` replaces a running timer and
/// dropping the handle stops it.
#[derive(Debug, Default)]
pub struct RefreshTask {
    handle: Option<JoinHandle<()>>,
}

impl RefreshTask {
    // ---
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, dashboard: Arc<Dashboard>, period: Duration) {
        // ---
        self.stop();
        tracing::info!("Silent refresh every {:?}", period);

        self.handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; the initial load is the caller's
            ticker.tick().await;
            loop {
                ticker.tick().await;
                dashboard.refresh(true).await;
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!("Silent refresh stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for RefreshTask {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_generation_counter() {
        // ---
        let counter = GenerationCounter::default();
        let first = counter.issue();
        let second = counter.issue();
        assert!(second > first);
        assert!(!counter.is_latest(first));
        assert!(counter.is_latest(second));
    }

    #[test]
    fn test_view_range() {
        // ---
        let view = ViewSelection {
            report_type: ReportType::Weekly,
            anchor: NaiveDate::from_ymd_opt(2024, 3, 13).unwrap(),
            custom: None,
            floor: FloorKey::F2,
        };
        let range = view.range().unwrap();
        assert_eq!(range.start_date, "2024-03-10");
        assert_eq!(range.end_date, "2024-03-16");
    }
}
