//! Generative-search backend abstraction.

use super::query::GenerativeQuery;
use khub_core::AppResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single GraphQL error entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

/// Raw GraphQL response envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Option<Vec<GraphQlError>>,
}

impl GraphQlResponse {
    pub fn with_data(data: Value) -> Self {
        Self {
            data: Some(data),
            errors: None,
        }
    }

    /// Messages of all reported errors, in order.
    pub fn error_messages(&self) -> Vec<&str> {
        self.errors
            .iter()
            .flatten()
            .map(|e| e.message.as_str())
            .collect()
    }
}

/// Trait for backends that execute grouped-generation queries.
#[async_trait::async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Execute a query. Only transport-level failures are errors; GraphQL
    /// errors are returned inside the response.
    async fn execute(&self, query: &GenerativeQuery) -> AppResult<GraphQlResponse>;
}
