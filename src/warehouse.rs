//! Warehouse data provider integration
//!
//! Fetches dated ad-performance rows from the analytics warehouse HTTP
//! endpoint. The rest of the pipeline depends only on the row shape
//! ([`Record`]), not on how rows are retrieved.

use crate::models::Record;
use anyhow::{Context, Result};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    window_weeks: u32,
    networks: &'a [String],
}

/// HTTP client for the ad-performance warehouse.
///
/// Constructed once by the caller and passed into the pipeline; holds no
/// process-global state.
pub struct WarehouseClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl WarehouseClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build warehouse HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// Fetch the trailing window of daily rows for the given networks.
    ///
    /// The endpoint filters to a trailing window of whole weeks ending at
    /// the last completed day and to the named network identifiers.
    pub async fn fetch_records(
        &self,
        window_weeks: u32,
        networks: &[String],
    ) -> Result<Vec<Record>> {
        info!(window_weeks, "Fetching ad-performance records from warehouse");

        let url = format!("{}/query", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&QueryRequest {
                window_weeks,
                networks,
            })
            .send()
            .await
            .context("Failed to reach warehouse endpoint")?
            .error_for_status()
            .context("Warehouse query returned an error status")?;

        let records: Vec<Record> = response
            .json()
            .await
            .context("Failed to decode warehouse rows")?;

        debug!(rows = records.len(), "Warehouse query complete");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = WarehouseClient::new("https://warehouse.example.com/", "token").unwrap();
        assert_eq!(client.base_url, "https://warehouse.example.com");
    }

    #[test]
    fn test_query_request_shape() {
        let networks = vec!["Google Ads".to_string(), "Meta Ads".to_string()];
        let request = QueryRequest {
            window_weeks: 6,
            networks: &networks,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["window_weeks"], 6);
        assert_eq!(json["networks"][1], "Meta Ads");
    }

    #[test]
    fn test_provider_rows_deserialize() {
        let body = r#"[
            {"date": "2026-07-01", "ad_network": "Google Ads", "spend": 10.0, "trials_d3": 2.0, "revenue_d7": 25.0},
            {"date": "2026-07-01", "ad_network": "Meta Ads", "spend": null, "trials_d3": null, "revenue_d7": null}
        ]"#;
        let records: Vec<Record> = serde_json::from_str(body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].network, "Google Ads");
        assert_eq!(records[1].spend, None);
    }
}
