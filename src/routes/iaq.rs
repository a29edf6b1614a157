use axum::{extract::Query, extract::State, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use tracing::info;

use super::{AppState, ReportQuery};
use crate::date_range::resolve;
use crate::error::DashboardResult;
use crate::iaq::iaq_daily;

// ---

pub fn router() -> Router<AppState> {
    Router::new().route("/api/iaq", get(handler))
}

async fn handler(
    Query(params): Query<ReportQuery>,
    State(state): State<AppState>,
) -> DashboardResult<impl IntoResponse> {
    // ---
    let sel = params.selection()?;
    let range = resolve(sel.report_type, sel.anchor, sel.custom)?;
    info!("GET /api/iaq - {} to {}", range.start_date, range.end_date);

    let readings = state.source.iaq(&range).await?;
    let floors = iaq_daily(&readings, &range)?;
    Ok(Json(json!({ "range": range, "floors": floors })))
}
