//! Staged decoding of a grouped-generation response.
//!
//! Each stage either yields the next nested value or fails with the stage
//! that was missing, so no level is ever skipped silently.

use super::backend::GraphQlResponse;
use super::RetrievalError;
use crate::types::{Answer, Query};
use serde_json::Value;
use std::fmt;

/// Point in the response at which decoding stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStage {
    Root,
    DomainResults,
    Matches,
    GeneratedAnswer,
    Source,
}

impl DecodeStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Root => "missing root",
            Self::DomainResults => "missing domain results",
            Self::Matches => "no matches",
            Self::GeneratedAnswer => "missing generated answer",
            Self::Source => "missing source",
        }
    }
}

impl fmt::Display for DecodeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decode a backend response into an answer for `query`.
///
/// Backend-reported errors win over any data in the body. Only the first
/// match is attributed as a source.
pub fn decode_answer(
    query: &Query,
    response: &GraphQlResponse,
    source_field: &str,
) -> Result<Answer, RetrievalError> {
    let messages = response.error_messages();
    if !messages.is_empty() {
        return Err(RetrievalError::Backend(messages.join("\n")));
    }

    let root = response
        .data
        .as_ref()
        .and_then(|d| d.get("Get"))
        .and_then(Value::as_object)
        .ok_or(RetrievalError::Malformed(DecodeStage::Root))?;

    let results = root
        .get(&query.domain_id)
        .and_then(Value::as_array)
        .ok_or(RetrievalError::Malformed(DecodeStage::DomainResults))?;

    let first = results
        .first()
        .ok_or(RetrievalError::Malformed(DecodeStage::Matches))?;

    let generate = first
        .get("_additional")
        .and_then(|a| a.get("generate"))
        .ok_or(RetrievalError::Malformed(DecodeStage::GeneratedAnswer))?;

    if let Some(error) = generate.get("error").and_then(Value::as_str) {
        tracing::warn!(error, "Backend reported a generation error");
    }

    let response_text = generate
        .get("groupedResult")
        .and_then(Value::as_str)
        .ok_or(RetrievalError::Malformed(DecodeStage::GeneratedAnswer))?;

    let source = first
        .get(source_field)
        .and_then(Value::as_str)
        .ok_or(RetrievalError::Malformed(DecodeStage::Source))?;

    Ok(Answer {
        query: query.clone(),
        response: response_text.to_string(),
        sources: vec![source.to_string()],
    })
}
