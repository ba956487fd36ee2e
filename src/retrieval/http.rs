//! HTTP search sidecar retriever
//!
//! POSTs `{"query", "top_k"}` to a search endpoint that fronts the vector
//! index and expects `{"passages": [{"text", "score"}]}` back.

use crate::error::{HelpdeskError, Result};
use crate::retrieval::{rank_passages, ContextRetriever, Passage};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retriever backed by an HTTP search endpoint
pub struct HttpRetriever {
    client: Client,
    endpoint: String,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    top_k: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    passages: Vec<Passage>,
}

impl HttpRetriever {
    /// Create a retriever for the given endpoint URL
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("helpdesk/0.1.0")
            .build()
            .map_err(|e| HelpdeskError::Retrieval(format!("Failed to create HTTP client: {}", e)))?;
        let endpoint = endpoint.into();
        tracing::info!("Initialized HTTP retriever: endpoint={}", endpoint);
        Ok(Self { client, endpoint })
    }

    /// The configured search endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ContextRetriever for HttpRetriever {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Passage>> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&SearchRequest { query, top_k })
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Search request failed: {}", e);
                HelpdeskError::Retrieval(format!("Search request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Search endpoint returned error {}: {}", status, error_text);
            return Err(HelpdeskError::Retrieval(format!(
                "Search endpoint returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let body: SearchResponse = response.json().await.map_err(|e| {
            HelpdeskError::Retrieval(format!("Failed to parse search response: {}", e))
        })?;

        tracing::debug!("Retrieved {} passages", body.passages.len());
        Ok(rank_passages(body.passages, top_k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let json = serde_json::to_value(SearchRequest {
            query: "vpn drops",
            top_k: 2,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"query": "vpn drops", "top_k": 2}));
    }

    #[test]
    fn test_response_missing_passages_is_empty() {
        let body: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(body.passages.is_empty());
    }

    #[test]
    fn test_endpoint_accessor() {
        let retriever = HttpRetriever::new("http://localhost:8088/search").unwrap();
        assert_eq!(retriever.endpoint(), "http://localhost:8088/search");
    }
}
