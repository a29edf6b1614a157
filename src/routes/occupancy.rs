//! Occupancy report, hourly profile, peak card and export endpoints.

use axum::{
    extract::Query, extract::State, http::header, http::StatusCode, response::IntoResponse,
    response::Response, routing::get, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use super::{AppState, ReportQuery};
use crate::date_range::{format_day, parse_day, resolve};
use crate::error::{DashboardError, DashboardResult};
use crate::export::{export_filename, snapshot_table, trend_table};
use crate::models::DateRange;
use crate::report::{hourly_profile, OccupancyReport};
use crate::timezone::hkt_today;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/occupancy", get(report))
        .route("/api/occupancy/hourly", get(hourly))
        .route("/api/occupancy/snapshot", get(snapshot))
        .route("/api/occupancy/export", get(export))
}

async fn report(
    Query(params): Query<ReportQuery>,
    State(state): State<AppState>,
) -> DashboardResult<impl IntoResponse> {
    // ---
    let sel = params.selection()?;
    let range = resolve(sel.report_type, sel.anchor, sel.custom)?;
    info!(
        "GET /api/occupancy - {} {} to {}",
        sel.report_type, range.start_date, range.end_date
    );

    let readings = state.source.occupancy(&range).await?;
    let report = OccupancyReport::build(&readings, &range)?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
struct HourlyQuery {
    date: Option<String>,
}

async fn hourly(
    Query(params): Query<HourlyQuery>,
    State(state): State<AppState>,
) -> DashboardResult<impl IntoResponse> {
    // ---
    let day = params
        .date
        .as_deref()
        .map(parse_day)
        .transpose()?
        .unwrap_or_else(hkt_today);
    let day = format_day(day);
    debug!("GET /api/occupancy/hourly - {}", day);

    let range = DateRange {
        start_date: day.clone(),
        end_date: day.clone(),
    };
    let readings = state.source.occupancy(&range).await?;
    let floors = hourly_profile(&readings, &day);
    Ok(Json(json!({ "date": day, "floors": floors })))
}

/// Peak card for one floor over the resolved range.
async fn snapshot(
    Query(params): Query<ReportQuery>,
    State(state): State<AppState>,
) -> DashboardResult<impl IntoResponse> {
    // ---
    let sel = params.selection()?;
    let range = resolve(sel.report_type, sel.anchor, sel.custom)?;
    let floor = params.floor()?;
    debug!(
        "GET /api/occupancy/snapshot - {} {} to {}",
        floor, range.start_date, range.end_date
    );

    let readings = state.source.occupancy(&range).await?;
    let report = OccupancyReport::build(&readings, &range)?;
    let card = report.snapshot(floor).cloned().ok_or(DashboardError::NoData)?;
    Ok(Json(card))
}

#[derive(Debug, Deserialize)]
struct ExportQuery {
    #[serde(flatten)]
    report: ReportQuery,
    /// `trend` (default) or `snapshot`.
    kind: Option<String>,
    /// `csv` (default) or `json`.
    format: Option<String>,
}

/// CSV download, or the same rows as JSON objects with `format=json`.
async fn export(
    Query(params): Query<ExportQuery>,
    State(state): State<AppState>,
) -> DashboardResult<Response> {
    // ---
    let sel = params.report.selection()?;
    let range = resolve(sel.report_type, sel.anchor, sel.custom)?;
    let floor = params.report.floor()?;

    let readings = state.source.occupancy(&range).await?;
    let report = OccupancyReport::build(&readings, &range)?;

    let (table, floor_label) = match params.kind.as_deref() {
        Some("snapshot") => (snapshot_table(&report.snapshots)?, "All".to_string()),
        _ => (trend_table(report.floor(floor))?, floor.to_string()),
    };

    if params.format.as_deref() == Some("json") {
        let rows: Vec<serde_json::Map<String, serde_json::Value>> = table
            .keyed_rows()
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|(key, value)| (key.to_string(), serde_json::Value::from(value)))
                    .collect()
            })
            .collect();
        return Ok(Json(rows).into_response());
    }

    let filename = export_filename(&state.config.building_name, &floor_label, sel.report_type, &range);
    info!("GET /api/occupancy/export - {} ({} rows)", filename, table.rows.len());

    let body = table.to_csv()?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response())
}
