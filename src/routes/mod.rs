use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dashboard::Dashboard;
use crate::date_range::parse_day;
use crate::error::{DashboardError, DashboardResult};
use crate::fetch::ReadingSource;
use crate::models::{FloorKey, ReportType};
use crate::timezone::hkt_today;
use crate::Config;

mod dashboard;
mod health;
mod iaq;
mod occupancy;

// ---

/// Shared state handed to every route.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub source: Arc<dyn ReadingSource>,
    pub dashboard: Arc<Dashboard>,
}

pub fn router(state: AppState) -> Router {
    // ---
    Router::new()
        .merge(occupancy::router())
        .merge(iaq::router())
        .merge(dashboard::router())
        .merge(health::router())
        .with_state(state)
}

/// Report selector accepted by the query-string endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    // ---
    report_type: Option<String>,
    /// Anchor day; defaults to today in HKT.
    date: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    floor: Option<String>,
}

/// Parsed report selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub report_type: ReportType,
    pub anchor: NaiveDate,
    pub custom: Option<(NaiveDate, NaiveDate)>,
}

pub fn parse_selection(
    report_type: Option<&str>,
    date: Option<&str>,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> DashboardResult<Selection> {
    // ---
    let report_type = report_type
        .map(str::parse::<ReportType>)
        .transpose()?
        .unwrap_or(ReportType::Daily);
    let anchor = date.map(parse_day).transpose()?.unwrap_or_else(hkt_today);

    let custom = match (report_type, start_date, end_date) {
        (ReportType::Custom, Some(start), Some(end)) => Some((parse_day(start)?, parse_day(end)?)),
        (ReportType::Custom, _, _) => return Err(DashboardError::MissingCustomRange),
        _ => None,
    };

    Ok(Selection {
        report_type,
        anchor,
        custom,
    })
}

impl ReportQuery {
    // ---
    pub fn selection(&self) -> DashboardResult<Selection> {
        parse_selection(
            self.report_type.as_deref(),
            self.date.as_deref(),
            self.start_date.as_deref(),
            self.end_date.as_deref(),
        )
    }

    /// Requested floor; 1F when omitted.
    pub fn floor(&self) -> DashboardResult<FloorKey> {
        // ---
        let floor = self
            .floor
            .as_deref()
            .map(str::parse::<FloorKey>)
            .transpose()?
            .unwrap_or(FloorKey::F1);
        if !floor.is_display() {
            return Err(DashboardError::InvalidFloor(floor.to_string()));
        }
        Ok(floor)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        // ---
        let status = match &self {
            DashboardError::Transport(_) | DashboardError::UpstreamStatus(_) => {
                StatusCode::BAD_GATEWAY
            }
            DashboardError::NoData => StatusCode::NOT_FOUND,
            DashboardError::Csv(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DashboardError::InvalidDate(_)
            | DashboardError::InvalidReportType(_)
            | DashboardError::MissingCustomRange
            | DashboardError::RangeTooLong(_)
            | DashboardError::InvalidFloor(_) => StatusCode::BAD_REQUEST,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (
            status,
            Json(ErrorBody {
                error: self.user_message(),
            }),
        )
            .into_response()
    }
}
