//! Concept extraction.
//!
//! Turns a free-text question into the terms used to scope the similarity
//! search. The LLM-backed extractor asks a chat model for a JSON array.

use crate::types::Concept;
use khub_core::AppError;
use khub_llm::{LlmClient, LlmRequest};
use std::sync::Arc;
use thiserror::Error;

/// Instruction sent ahead of the user's question.
const SYSTEM_PROMPT: &str = "Extract the concepts from the user's question and return the results \
     in the form of an array. Escape the strings in the response.";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("concept provider request failed")]
    Provider(#[source] AppError),

    #[error("could not parse concepts from {content:?}: {reason}")]
    Parse { content: String, reason: String },

    #[error("no concepts were extracted")]
    Empty,
}

/// Capability that maps a question to an ordered list of concepts.
#[async_trait::async_trait]
pub trait ConceptExtractor: Send + Sync {
    async fn extract(&self, question: &str) -> Result<Vec<Concept>, ExtractionError>;
}

/// Extracts concepts with a chat-completion model.
pub struct LlmConceptExtractor {
    client: Arc<dyn LlmClient>,
    model: String,
}

impl LlmConceptExtractor {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait::async_trait]
impl ConceptExtractor for LlmConceptExtractor {
    async fn extract(&self, question: &str) -> Result<Vec<Concept>, ExtractionError> {
        let request = LlmRequest::new(question, &self.model)
            .with_system(SYSTEM_PROMPT)
            .with_temperature(0.0);

        let response = self
            .client
            .complete(&request)
            .await
            .map_err(ExtractionError::Provider)?;

        let concepts = parse_concepts(&response.content)?;
        tracing::debug!(
            provider = self.client.provider_name(),
            count = concepts.len(),
            "Extracted concepts"
        );

        Ok(concepts)
    }
}

/// Parse a model reply into concepts.
///
/// Accepts a bare JSON array of strings or one wrapped in a Markdown code
/// fence. Blank entries are dropped and empty content yields no concepts.
pub fn parse_concepts(content: &str) -> Result<Vec<Concept>, ExtractionError> {
    let body = strip_code_fence(content.trim());
    if body.is_empty() {
        return Ok(Vec::new());
    }

    let terms: Vec<String> =
        serde_json::from_str(body).map_err(|e| ExtractionError::Parse {
            content: content.to_string(),
            reason: e.to_string(),
        })?;

    Ok(terms
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .map(Concept::from)
        .collect())
}

fn strip_code_fence(content: &str) -> &str {
    let Some(rest) = content.strip_prefix("```") else {
        return content;
    };

    // Drop an optional language tag on the opening fence.
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };

    rest.trim_end().trim_end_matches("```").trim()
}
