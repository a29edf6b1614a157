//! Error types shared by the aggregation pipeline, the upstream fetchers
//! and the export path.

use thiserror::Error;

// ---

/// Message surfaced to the dashboard when an upstream fetch fails.
///
/// Deliberately generic: transport details go to the log, not the operator.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to load sensor data. Please try again later.";

/// Message surfaced when an export has no rows to write.
pub const NO_DATA_MESSAGE: &str = "No data available for the selected period";

#[derive(Debug, Error)]
pub enum DashboardError {
    // ---
    #[error("Upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Upstream returned HTTP {0}")]
    UpstreamStatus(u16),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Unknown report type '{0}'")]
    InvalidReportType(String),

    #[error("Custom report requires both start_date and end_date")]
    MissingCustomRange,

    #[error("Range of {0} days exceeds the 366-day limit")]
    RangeTooLong(i64),

    #[error("Unknown floor '{0}'")]
    InvalidFloor(String),

    #[error("{}", NO_DATA_MESSAGE)]
    NoData,

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),
}

impl DashboardError {
    // ---
    /// Human-readable message for the UI layer's nullable error string.
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::Transport(_) | DashboardError::UpstreamStatus(_) => {
                FETCH_FAILED_MESSAGE.to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type DashboardResult<T> = Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn transport_errors_hide_details() {
        // ---
        let err = DashboardError::UpstreamStatus(502);
        assert_eq!(err.user_message(), FETCH_FAILED_MESSAGE);
        assert_eq!(err.to_string(), "Upstream returned HTTP 502");
    }

    #[test]
    fn no_data_message_is_user_facing() {
        // ---
        assert_eq!(DashboardError::NoData.user_message(), NO_DATA_MESSAGE);
    }
}
