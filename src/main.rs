//! Application entry point for the `codemetal-occupancy` backend service.
//!
//! This binary orchestrates the full startup sequence for the occupancy
//! dashboard API, including:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Building the upstream sensor API client
//! - Loading the initial dashboard view and starting the silent refresh
//! - Mounting all API routes via the `routes` gateway (EMBP pattern)
//! - Binding the Axum HTTP server and serving requests until Ctrl-C
//!
//! # Environment Variables
//! - `OCCUPANCY_API_URL`, `IAQ_API_URL` (**required**) – upstream endpoints
//! - `REFRESH_INTERVAL_SECS` (optional) – silent refresh period (default: 300)
//! - `AXUM_LOG_LEVEL` (optional) – log verbosity (default: `debug`)
//! - `AXUM_SPAN_EVENTS` (optional) – span event mode for tracing
//!
//! See `config.rs` for the full list.
use std::{env, net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use dotenvy::dotenv;
use is_terminal::IsTerminal;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use anyhow::Result;

use codemetal_occupancy::fetch::{HttpSource, ReadingSource};
use codemetal_occupancy::routes::{self, AppState};
use codemetal_occupancy::timezone::hkt_today;
use codemetal_occupancy::{config, Dashboard, FloorKey, RefreshTask, ReportType, ViewSelection};

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    init_tracing();
    dotenv().ok();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    let source: Arc<dyn ReadingSource> = Arc::new(
        HttpSource::new(&cfg)
            .map_err(|e| anyhow::anyhow!("Failed to build upstream client: {}", e))?,
    );

    let dashboard = Arc::new(Dashboard::new(
        Arc::clone(&source),
        ViewSelection {
            report_type: ReportType::Daily,
            anchor: hkt_today(),
            custom: None,
            floor: FloorKey::F1,
        },
    ));

    // Initial load; a failure is recorded in the dashboard state, not fatal
    if !dashboard.refresh(false).await {
        tracing::warn!("Initial dashboard load failed; waiting for next refresh");
    }

    let mut refresh = RefreshTask::new();
    refresh.start(
        Arc::clone(&dashboard),
        Duration::from_secs(cfg.refresh_interval_secs.into()),
    );

    // Build app from routes gateway (EMBP)
    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.bind_port));
    let app: Router = routes::router(AppState {
        config: cfg,
        source,
        dashboard,
    });

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    refresh.stop();
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    // ---
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

// ---

/// Initialize the global tracing subscriber for structured logging.
///
/// This function configures the [`tracing_subscriber`] with:
/// - Log target, file, and line number output enabled
/// - Color output controlled by TTY detection and `FORCE_COLOR` env var:
///   - `FORCE_COLOR=1|true|yes`: force colors on
///   - `FORCE_COLOR=0|false|no`: force colors off
///   - unset or other values: auto-detect TTY
/// - Span event emission mode controlled by the `AXUM_SPAN_EVENTS` env var:
///   - `"full"`       : emit ENTER, EXIT, and CLOSE events with timing
///   - `"enter_exit"` : emit ENTER and EXIT only
///   - unset or other values: emit CLOSE events only (default)
/// - Log level controlled by the `AXUM_LOG_LEVEL` env var
///
/// Called once at startup before any logging macros are invoked.
fn init_tracing() {
    // ---
    let span_events = match env::var("AXUM_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    // Determine if we should use colors
    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    // Use RUST_LOG if available, otherwise fall back to AXUM_LOG_LEVEL
    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("AXUM_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "debug",
        };
        EnvFilter::new(format!("{level},hyper=info,reqwest=info"))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}
