// src/routes/health.rs
//! API health check endpoint for the occupancy backend.
//!
//! This module defines the `/health` route used by container orchestrators
//! and CI pipelines to verify that the service is up. It follows the
//! Explicit Module Boundary Pattern (EMBP): the handler stays private and
//! only a subrouter is exported to the gateway (`mod.rs`).

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::zones::MAPPING_VERSION;

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    mapping_version: u32,
}

/// Handle `GET /health`.
///
/// Reports liveness and the zone mapping table version in use. Does not
/// touch the upstream sensor APIs.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        mapping_version: MAPPING_VERSION,
    })
}

/// Create a subrouter containing the `/health` route.
///
/// Generic over the application state so it merges cleanly with the
/// gateway router.
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/health", get(health))
}
