//! Answer retrieval against a generative-search backend.

pub mod backend;
pub mod decode;
pub mod query;
pub mod weaviate;

pub use backend::{GenerativeBackend, GraphQlError, GraphQlResponse};
pub use decode::{decode_answer, DecodeStage};
pub use query::GenerativeQuery;
pub use weaviate::WeaviateBackend;

use crate::types::{Answer, Query};
use khub_core::config::RetrievalSettings;
use khub_core::AppError;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use thiserror::Error;

/// Default number of matches handed to grouped generation.
pub const DEFAULT_RESULT_LIMIT: usize = 5;

/// Default property holding a match's source reference.
pub const DEFAULT_SOURCE_FIELD: &str = "source";

static GRAPHQL_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("GraphQL name pattern is valid")
});

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("query has no concepts")]
    NoConcepts,

    #[error("'{0}' is not a valid GraphQL name")]
    InvalidName(String),

    #[error("backend request failed")]
    Transport(#[source] AppError),

    #[error("backend reported errors: {0}")]
    Backend(String),

    #[error("malformed backend response: {0}")]
    Malformed(DecodeStage),
}

/// Builds the augmented query, runs it and decodes the answer.
pub struct AnswerRetriever {
    backend: Arc<dyn GenerativeBackend>,
    result_limit: usize,
    source_field: String,
}

impl AnswerRetriever {
    pub fn new(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self {
            backend,
            result_limit: DEFAULT_RESULT_LIMIT,
            source_field: DEFAULT_SOURCE_FIELD.to_string(),
        }
    }

    pub fn from_settings(
        backend: Arc<dyn GenerativeBackend>,
        settings: &RetrievalSettings,
    ) -> Self {
        Self::new(backend)
            .with_result_limit(settings.result_limit as usize)
            .with_source_field(&settings.source_field)
    }

    pub fn with_result_limit(mut self, result_limit: usize) -> Self {
        self.result_limit = result_limit.max(1);
        self
    }

    pub fn with_source_field(mut self, source_field: impl Into<String>) -> Self {
        self.source_field = source_field.into();
        self
    }

    /// Build the backend query, refusing a query without concepts and names
    /// that cannot be embedded in GraphQL.
    pub fn build_query(&self, query: &Query) -> Result<GenerativeQuery, RetrievalError> {
        if query.concepts.is_empty() {
            return Err(RetrievalError::NoConcepts);
        }
        for name in [query.domain_id.as_str(), self.source_field.as_str()] {
            if !GRAPHQL_NAME.is_match(name) {
                return Err(RetrievalError::InvalidName(name.to_string()));
            }
        }

        Ok(GenerativeQuery::for_query(
            query,
            self.result_limit,
            &self.source_field,
        ))
    }

    pub async fn retrieve(&self, query: &Query) -> Result<Answer, RetrievalError> {
        let generative = self.build_query(query)?;

        let response = self
            .backend
            .execute(&generative)
            .await
            .map_err(RetrievalError::Transport)?;

        decode_answer(query, &response, &self.source_field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Concept;
    use khub_core::AppResult;
    use serde_json::json;
    use std::sync::Mutex;

    struct RecordingBackend {
        response: GraphQlResponse,
        seen: Mutex<Vec<GenerativeQuery>>,
    }

    #[async_trait::async_trait]
    impl GenerativeBackend for RecordingBackend {
        async fn execute(&self, query: &GenerativeQuery) -> AppResult<GraphQlResponse> {
            self.seen.lock().unwrap().push(query.clone());
            Ok(self.response.clone())
        }
    }

    fn backend(data: serde_json::Value) -> Arc<RecordingBackend> {
        Arc::new(RecordingBackend {
            response: GraphQlResponse::with_data(data),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn tax_query() -> Query {
        let mut query = Query::new("Tax_Agent", "What is section 54?");
        query.concepts = vec![Concept::from("section 54")];
        query
    }

    #[tokio::test]
    async fn test_retrieve_uses_settings() {
        let backend = backend(json!({ "Get": { "Tax_Agent": [
            { "url": "doc-17", "_additional": { "generate": { "groupedResult": "answer" } } }
        ] } }));
        let settings = RetrievalSettings {
            result_limit: 3,
            source_field: "url".to_string(),
        };
        let retriever = AnswerRetriever::from_settings(backend.clone(), &settings);

        let answer = retriever.retrieve(&tax_query()).await.unwrap();
        assert_eq!(answer.sources, vec!["doc-17"]);

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen[0].result_limit, 3);
        assert_eq!(seen[0].fields, vec!["url"]);
    }

    #[tokio::test]
    async fn test_retrieve_without_concepts_skips_backend() {
        let backend = backend(json!({}));
        let retriever = AnswerRetriever::new(backend.clone());

        let result = retriever
            .retrieve(&Query::new("Tax_Agent", "What is section 54?"))
            .await;

        assert!(matches!(result, Err(RetrievalError::NoConcepts)));
        assert!(backend.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_build_query_rejects_unsafe_names() {
        let retriever = AnswerRetriever::new(backend(json!({})));
        let mut query = tax_query();
        query.domain_id = "Tax_Agent) { __schema".to_string();

        assert!(matches!(
            retriever.build_query(&query),
            Err(RetrievalError::InvalidName(_))
        ));

        let retriever = AnswerRetriever::new(backend(json!({}))).with_source_field("source url");
        assert!(matches!(
            retriever.build_query(&tax_query()),
            Err(RetrievalError::InvalidName(name)) if name == "source url"
        ));
    }

    #[test]
    fn test_result_limit_is_at_least_one() {
        let retriever = AnswerRetriever::new(backend(json!({}))).with_result_limit(0);
        assert_eq!(retriever.build_query(&tax_query()).unwrap().result_limit, 1);
    }
}
