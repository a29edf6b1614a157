//! Live dashboard state: read it, change the view, switch floor tabs.

use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::get, routing::post, Json,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::{parse_selection, AppState};
use crate::dashboard::ViewSelection;
use crate::error::{DashboardError, DashboardResult};
use crate::models::FloorKey;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/dashboard", get(current))
        .route("/api/dashboard/view", post(set_view))
        .route("/api/dashboard/floor", post(select_floor))
        .route("/api/dashboard/series", get(series))
}

async fn current(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard.state().await)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViewRequest {
    report_type: Option<String>,
    date: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    floor: Option<FloorKey>,
}

async fn set_view(
    State(state): State<AppState>,
    Json(body): Json<ViewRequest>,
) -> DashboardResult<impl IntoResponse> {
    // ---
    let sel = parse_selection(
        body.report_type.as_deref(),
        body.date.as_deref(),
        body.start_date.as_deref(),
        body.end_date.as_deref(),
    )?;
    let floor = match body.floor {
        Some(floor) => floor,
        None => state.dashboard.state().await.view.floor,
    };
    if !floor.is_display() {
        return Err(DashboardError::InvalidFloor(floor.to_string()));
    }
    info!("POST /api/dashboard/view - {} anchored {}", sel.report_type, sel.anchor);

    state
        .dashboard
        .set_view(ViewSelection {
            report_type: sel.report_type,
            anchor: sel.anchor,
            custom: sel.custom,
            floor,
        })
        .await;

    let snapshot = state.dashboard.state().await;
    let status = if snapshot.error.is_some() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::OK
    };
    Ok((status, Json(snapshot)))
}

#[derive(Debug, Deserialize)]
struct FloorRequest {
    floor: FloorKey,
}

async fn select_floor(
    State(state): State<AppState>,
    Json(body): Json<FloorRequest>,
) -> DashboardResult<impl IntoResponse> {
    // ---
    if !body.floor.is_display() {
        return Err(DashboardError::InvalidFloor(body.floor.to_string()));
    }
    state.dashboard.select_floor(body.floor).await;
    Ok(Json(state.dashboard.state().await))
}

/// Chart data for the selected floor of the loaded report.
async fn series(State(state): State<AppState>) -> DashboardResult<impl IntoResponse> {
    // ---
    let snapshot = state.dashboard.state().await;
    let series = snapshot.selected_series().ok_or(DashboardError::NoData)?;
    Ok(Json(json!({ "floor": snapshot.view.floor, "series": series })))
}
