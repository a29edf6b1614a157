//! Configuration loader for the `codemetal-occupancy` backend service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). Nothing else in the crate reads `env::var`.
//!
use std::env;

use anyhow::{anyhow, Result};

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u32 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u32>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Read an optional string environment variable with a default value.
macro_rules! env_or {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| $default.to_string())
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Occupancy readings endpoint (GET, `start_date`/`end_date` query).
    pub occupancy_api_url: String,

    /// IAQ readings endpoint (POST, `{startDate, endDate}` body).
    pub iaq_api_url: String,

    /// Entity name used as the export filename prefix.
    pub building_name: String,

    /// Seconds between silent dashboard refreshes.
    pub refresh_interval_secs: u32,

    /// Upstream request timeout in seconds.
    pub http_timeout_secs: u32,

    /// Port the HTTP server binds to.
    pub bind_port: u16,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `OCCUPANCY_API_URL` – occupancy readings endpoint
/// - `IAQ_API_URL` – IAQ readings endpoint
///
/// Optional:
/// - `BUILDING_NAME` – export filename entity (default: `Building`)
/// - `REFRESH_INTERVAL_SECS` – silent refresh period (default: 300)
/// - `HTTP_TIMEOUT_SECS` – upstream timeout (default: 30)
/// - `BIND_PORT` – HTTP listen port (default: 8080)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let occupancy_api_url = require_env!("OCCUPANCY_API_URL");
    let iaq_api_url = require_env!("IAQ_API_URL");
    let building_name = env_or!("BUILDING_NAME", "Building");
    let refresh_interval_secs = parse_env_u32!("REFRESH_INTERVAL_SECS", 300);
    let http_timeout_secs = parse_env_u32!("HTTP_TIMEOUT_SECS", 30);
    let bind_port = parse_env_u32!("BIND_PORT", 8080);

    if refresh_interval_secs == 0 {
        return Err(anyhow!("REFRESH_INTERVAL_SECS must be greater than zero"));
    }
    let bind_port =
        u16::try_from(bind_port).map_err(|_| anyhow!("Invalid BIND_PORT: {}", bind_port))?;

    Ok(Config {
        occupancy_api_url,
        iaq_api_url,
        building_name,
        refresh_interval_secs,
        http_timeout_secs,
        bind_port,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  OCCUPANCY_API_URL     : {}", self.occupancy_api_url);
        tracing::info!("  IAQ_API_URL           : {}", self.iaq_api_url);
        tracing::info!("  BUILDING_NAME         : {}", self.building_name);
        tracing::info!("  REFRESH_INTERVAL_SECS : {}", self.refresh_interval_secs);
        tracing::info!("  HTTP_TIMEOUT_SECS     : {}", self.http_timeout_secs);
        tracing::info!("  BIND_PORT             : {}", self.bind_port);
    }
}
