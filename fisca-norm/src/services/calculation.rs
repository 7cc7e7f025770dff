//! Calculation service client
//!
//! Thin collaborator: posts a normalized payload to the calculation
//! service and returns the result object untouched. No assumption is made
//! about the shape of the response beyond it being JSON.

use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

const HTTP_TIMEOUT_SECS: u64 = 30;

/// Calculation service client errors
#[derive(Debug, Error)]
pub enum CalculationError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Calculation API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Calculation service client
pub struct CalculationClient {
    http_client: reqwest::Client,
    url: String,
}

impl CalculationClient {
    pub fn new(url: impl Into<String>) -> Result<Self, CalculationError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| CalculationError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            url: url.into(),
        })
    }

    /// Submit a payload and return the opaque calculation result
    pub async fn calculate(&self, payload: &Value) -> Result<Value, CalculationError> {
        tracing::debug!(url = %self.url, "Submitting payload to calculation service");

        let response = self
            .http_client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| CalculationError::Network(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CalculationError::Api(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| CalculationError::Parse(e.to_string()))
    }
}
