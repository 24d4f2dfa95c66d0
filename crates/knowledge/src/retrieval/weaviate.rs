//! Weaviate GraphQL backend.

use super::backend::{GenerativeBackend, GraphQlResponse};
use super::query::GenerativeQuery;
use khub_core::{AppError, AppResult};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct GraphQlRequest {
    query: String,
}

/// Executes grouped-generation queries against a Weaviate instance.
///
/// The OpenAI key is forwarded so Weaviate's generative module can call the
/// model on our behalf.
pub struct WeaviateBackend {
    base_url: String,
    openai_api_key: Option<String>,
    client: reqwest::Client,
}

impl WeaviateBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            openai_api_key: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_openai_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.openai_api_key = Some(api_key.into());
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait::async_trait]
impl GenerativeBackend for WeaviateBackend {
    async fn execute(&self, query: &GenerativeQuery) -> AppResult<GraphQlResponse> {
        let url = format!("{}/v1/graphql", self.base_url);
        tracing::debug!(collection = %query.collection, "Sending GraphQL query to Weaviate");

        let mut request = self.client.post(&url).json(&GraphQlRequest {
            query: query.to_graphql(),
        });
        if let Some(key) = &self.openai_api_key {
            request = request.header("X-OpenAI-Api-Key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Knowledge(format!("Could not reach Weaviate: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Knowledge(format!(
                "Weaviate sent back status code {}: {}",
                status, body
            )));
        }

        response.json::<GraphQlResponse>().await.map_err(|e| {
            AppError::Knowledge(format!("Could not parse response from Weaviate: {}", e))
        })
    }
}
