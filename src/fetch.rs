//! Upstream sensor API clients.
//!
//! Both endpoints return a JSON array. Anything else (an object, `null`,
//! an empty body) is treated as a valid empty dataset; individual array
//! items that do not parse are logged and skipped.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::date_range::parse_day;
use crate::error::{DashboardError, DashboardResult};
use crate::models::{DateRange, IaqReading, RawReading};
use crate::timezone::{hkt_day_end_utc, hkt_day_start_utc};
use crate::Config;

// ---

/// Source of raw readings for a resolved range.
#[async_trait]
pub trait ReadingSource: Send + Sync {
    async fn occupancy(&self, range: &DateRange) -> DashboardResult<Vec<RawReading>>;
    async fn iaq(&self, range: &DateRange) -> DashboardResult<Vec<IaqReading>>;
}

/// POST body for the IAQ endpoint.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IaqRequest {
    pub start_date: String,
    pub end_date: String,
}

const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

impl IaqRequest {
    /// UTC window covering the HKT calendar days of `range`, with
    /// microsecond precision and a `Z` suffix.
    pub fn for_range(range: &DateRange) -> DashboardResult<Self> {
        // ---
        let start = hkt_day_start_utc(parse_day(&range.start_date)?)
            .ok_or_else(|| DashboardError::InvalidDate(range.start_date.clone()))?;
        let end = hkt_day_end_utc(parse_day(&range.end_date)?)
            .ok_or_else(|| DashboardError::InvalidDate(range.end_date.clone()))?;
        Ok(Self {
            start_date: start.format(WIRE_FORMAT).to_string(),
            end_date: end.format(WIRE_FORMAT).to_string(),
        })
    }
}

/// Interpret an upstream response.
///
/// A non-2xx status is a fetch failure. An empty or non-JSON body on
/// success is an empty dataset.
pub fn decode_body(status: reqwest::StatusCode, body: &[u8]) -> DashboardResult<serde_json::Value> {
    // ---
    if !status.is_success() {
        return Err(DashboardError::UpstreamStatus(status.as_u16()));
    }
    if body.is_empty() {
        return Ok(serde_json::Value::Null);
    }
    Ok(serde_json::from_slice(body).unwrap_or_else(|e| {
        tracing::warn!("Upstream body is not JSON: {}", e);
        serde_json::Value::Null
    }))
}

/// Decode an upstream payload into typed readings.
pub fn parse_array<T: DeserializeOwned>(payload: serde_json::Value, what: &str) -> Vec<T> {
    // ---
    let Some(items) = payload.as_array() else {
        tracing::warn!("{} payload is not an array; treating as empty", what);
        return Vec::new();
    };

    let mut parsed = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match serde_json::from_value::<T>(item.clone()) {
            Ok(reading) => parsed.push(reading),
            Err(e) => {
                tracing::debug!("Failed to parse {} item {}: {} - Raw item: {}", what, i, e, item);
            }
        }
    }

    tracing::debug!("Parsed {}/{} {} items", parsed.len(), items.len(), what);
    parsed
}

/// `reqwest`-backed source talking to the configured endpoints.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    occupancy_url: String,
    iaq_url: String,
}

impl HttpSource {
    // ---
    pub fn new(config: &Config) -> DashboardResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs.into()))
            .build()?;
        Ok(Self {
            client,
            occupancy_url: config.occupancy_api_url.clone(),
            iaq_url: config.iaq_api_url.clone(),
        })
    }

    async fn read_json(response: reqwest::Response) -> DashboardResult<serde_json::Value> {
        // ---
        let status = response.status();
        if !status.is_success() {
            return decode_body(status, &[]);
        }
        let body = response.bytes().await?;
        decode_body(status, &body)
    }
}

#[async_trait]
impl ReadingSource for HttpSource {
    // ---
    async fn occupancy(&self, range: &DateRange) -> DashboardResult<Vec<RawReading>> {
        // ---
        tracing::debug!(
            "Fetching occupancy {} to {} from {}",
            range.start_date,
            range.end_date,
            self.occupancy_url
        );
        let response = self
            .client
            .get(&self.occupancy_url)
            .query(&[
                ("start_date", range.start_date.as_str()),
                ("end_date", range.end_date.as_str()),
            ])
            .send()
            .await?;
        let payload = Self::read_json(response).await?;
        Ok(parse_array(payload, "occupancy"))
    }

    async fn iaq(&self, range: &DateRange) -> DashboardResult<Vec<IaqReading>> {
        // ---
        let body = IaqRequest::for_range(range)?;
        tracing::debug!("Fetching IAQ {:?} from {}", body, self.iaq_url);
        let response = self.client.post(&self.iaq_url).json(&body).send().await?;
        let payload = Self::read_json(response).await?;
        Ok(parse_array(payload, "iaq"))
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::timezone::hkt_day_key;
    use serde_json::json;

    #[test]
    fn test_iaq_request_bounds() {
        // ---
        let range = DateRange {
            start_date: "2024-01-01".into(),
            end_date: "2024-01-07".into(),
        };
        let body = serde_json::to_value(IaqRequest::for_range(&range).unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "startDate": "2023-12-31T16:00:00.000000Z",
                "endDate": "2024-01-07T15:59:59.999999Z"
            })
        );
    }

    #[test]
    fn test_iaq_request_covers_hkt_day() {
        // ---
        let range = DateRange {
            start_date: "2024-01-02".into(),
            end_date: "2024-01-02".into(),
        };
        let body = IaqRequest::for_range(&range).unwrap();
        assert_eq!(body.start_date, "2024-01-01T16:00:00.000000Z");
        assert_eq!(body.end_date, "2024-01-02T15:59:59.999999Z");

        // 04:00 HKT on the 2nd lies inside the window
        let early = "2024-01-01T20:00:00.000000Z";
        assert_eq!(hkt_day_key(early).as_deref(), Some("2024-01-02"));
        assert!(body.start_date.as_str() <= early && early <= body.end_date.as_str());
    }

    #[test]
    fn test_iaq_request_rejects_bad_range() {
        // ---
        let range = DateRange {
            start_date: "yesterday".into(),
            end_date: "2024-01-02".into(),
        };
        assert!(matches!(
            IaqRequest::for_range(&range),
            Err(DashboardError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_error_status_fails_fetch() {
        // ---
        let err = decode_body(reqwest::StatusCode::SERVICE_UNAVAILABLE, b"[]").unwrap_err();
        assert!(matches!(err, DashboardError::UpstreamStatus(503)));
        assert_eq!(err.user_message(), crate::error::FETCH_FAILED_MESSAGE);

        let err = decode_body(reqwest::StatusCode::NOT_FOUND, b"").unwrap_err();
        assert!(matches!(err, DashboardError::UpstreamStatus(404)));
    }

    #[test]
    fn test_empty_or_garbled_body_is_empty_dataset() {
        // ---
        for body in [&b""[..], &b"<html>oops</html>"[..], &b"{\"truncated\": "[..]] {
            let value = decode_body(reqwest::StatusCode::OK, body).unwrap();
            assert_eq!(value, serde_json::Value::Null);
            let parsed: Vec<RawReading> = parse_array(value, "occupancy");
            assert!(parsed.is_empty());
        }

        let value = decode_body(reqwest::StatusCode::OK, b"[]").unwrap();
        assert_eq!(value, json!([]));
    }

    #[test]
    fn test_non_array_is_empty() {
        // ---
        let parsed: Vec<RawReading> = parse_array(json!({"error": "nope"}), "occupancy");
        assert!(parsed.is_empty());
        let parsed: Vec<RawReading> = parse_array(serde_json::Value::Null, "occupancy");
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_bad_items_skipped() {
        // ---
        let payload = json!([
            {"floorId": "MF", "zoneName": "Pantry", "timestamp": "2024-01-01T00:00:00Z",
             "totalOccupancy": 3, "occupancyPercentage": 10, "maxCapacity": 30},
            {"zoneName": "no floor"},
            42
        ]);
        let parsed: Vec<RawReading> = parse_array(payload, "occupancy");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].floor_id, "MF");
    }
}
