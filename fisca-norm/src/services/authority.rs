//! Variable metadata authority client
//!
//! Queries the remote metadata authority for variable → entity-type
//! metadata, either one variable at a time or through the bulk variable
//! index. "Not found" is a distinct outcome from other transport failures
//! so the cache layer can apply its index-fallback policy.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

const HTTP_TIMEOUT_SECS: u64 = 30;

/// Metadata authority client errors
#[derive(Debug, Error)]
pub enum AuthorityError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Variable not found: {0}")]
    NotFound(String),

    #[error("Metadata API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl AuthorityError {
    /// True for the "no metadata for this variable" outcome, which the
    /// cache treats as a fallthrough rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AuthorityError::NotFound(_))
    }
}

/// Metadata describing one variable, as published by the authority
///
/// Unknown fields in the authority's response are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableMetadata {
    /// Entity type that owns the variable (e.g. "individu", "menage")
    #[serde(default)]
    pub entity: Option<String>,
    /// Human-readable description from the authority
    #[serde(default)]
    pub description: Option<String>,
}

/// Remote metadata authority contract
///
/// Implemented over HTTP in production; tests substitute an in-memory
/// authority.
#[async_trait]
pub trait MetadataAuthority: Send + Sync {
    /// Fetch metadata for one variable. Returns `NotFound` when the
    /// authority has no such variable.
    async fn fetch_variable(&self, variable: &str) -> Result<VariableMetadata, AuthorityError>;

    /// Fetch the full variable index
    async fn fetch_index(&self) -> Result<HashMap<String, VariableMetadata>, AuthorityError>;
}

/// HTTP client for the metadata authority
pub struct HttpMetadataAuthority {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpMetadataAuthority {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AuthorityError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| AuthorityError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        variable: Option<&str>,
    ) -> Result<T, AuthorityError> {
        let response = self
            .http_client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| AuthorityError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            if let Some(variable) = variable {
                return Err(AuthorityError::NotFound(variable.to_string()));
            }
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AuthorityError::Api(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| AuthorityError::Parse(e.to_string()))
    }
}

#[async_trait]
impl MetadataAuthority for HttpMetadataAuthority {
    async fn fetch_variable(&self, variable: &str) -> Result<VariableMetadata, AuthorityError> {
        let url = format!("{}/{}", self.base_url, variable);
        tracing::debug!(variable = %variable, url = %url, "Querying variable metadata");
        self.get_json(&url, Some(variable)).await
    }

    async fn fetch_index(&self) -> Result<HashMap<String, VariableMetadata>, AuthorityError> {
        tracing::debug!(url = %self.base_url, "Fetching full variable index");
        self.get_json(&self.base_url, None).await
    }
}
