//! Search orchestration.
//!
//! Runs one question through the readiness gate, concept extraction and
//! answer retrieval, in that order, and maps failures onto [`SearchError`].

use crate::concepts::{ConceptExtractor, ExtractionError};
use crate::readiness::{NotReady, ReadinessError, ReadinessGate};
use crate::retrieval::{AnswerRetriever, RetrievalError};
use crate::types::{Answer, Query};
use khub_core::AppError;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Failure of a search request.
///
/// Only [`SearchError::Validation`] carries a message meant for the caller;
/// the other variants keep their cause as `source()` for logs and tests.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Validation(#[from] NotReady),

    #[error("could not check domain readiness")]
    Readiness(#[source] AppError),

    #[error("could not fetch contexts")]
    Extraction(#[source] ExtractionError),

    #[error("could not generate answer")]
    Retrieval(#[source] RetrievalError),

    #[error("search was cancelled")]
    Cancelled,
}

impl SearchError {
    /// Whether the caller caused this failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<ReadinessError> for SearchError {
    fn from(err: ReadinessError) -> Self {
        match err {
            ReadinessError::NotReady(reason) => Self::Validation(reason),
            ReadinessError::Store(source) => Self::Readiness(source),
        }
    }
}

/// Answers questions against a domain.
pub struct SearchService {
    gate: ReadinessGate,
    extractor: Arc<dyn ConceptExtractor>,
    retriever: AnswerRetriever,
}

impl SearchService {
    pub fn new(
        gate: ReadinessGate,
        extractor: Arc<dyn ConceptExtractor>,
        retriever: AnswerRetriever,
    ) -> Self {
        Self {
            gate,
            extractor,
            retriever,
        }
    }

    /// Answer `query`, aborting at the next step boundary once `cancel` fires.
    pub async fn search(
        &self,
        query: Query,
        cancel: &CancellationToken,
    ) -> Result<Answer, SearchError> {
        let span = tracing::info_span!("search", domain_id = %query.domain_id);
        self.run(query, cancel).instrument(span).await
    }

    async fn run(
        &self,
        mut query: Query,
        cancel: &CancellationToken,
    ) -> Result<Answer, SearchError> {
        let readiness = until_cancelled(cancel, self.gate.check_ready(&query.domain_id)).await?;
        if let Err(err) = readiness {
            match &err {
                ReadinessError::NotReady(reason) => tracing::info!(%reason, "Domain is not ready"),
                ReadinessError::Store(source) => {
                    tracing::error!(error = %source, "Could not check domain readiness")
                }
            }
            return Err(err.into());
        }

        let extracted = until_cancelled(cancel, self.extractor.extract(&query.question)).await?;
        let concepts = match extracted {
            Ok(concepts) if concepts.is_empty() => {
                tracing::error!("Concept extraction returned no concepts");
                return Err(SearchError::Extraction(ExtractionError::Empty));
            }
            Ok(concepts) => concepts,
            Err(err) => {
                tracing::error!(error = ?err, "Could not fetch contexts");
                return Err(SearchError::Extraction(err));
            }
        };

        tracing::debug!(concepts = ?concepts, "Concepts extracted");
        query.concepts = concepts;

        match until_cancelled(cancel, self.retriever.retrieve(&query)).await? {
            Ok(answer) => {
                tracing::info!(sources = answer.sources.len(), "Answer generated");
                Ok(answer)
            }
            Err(err) => {
                tracing::error!(error = ?err, "Could not generate answer");
                Err(SearchError::Retrieval(err))
            }
        }
    }
}

async fn until_cancelled<F: Future>(
    cancel: &CancellationToken,
    step: F,
) -> Result<F::Output, SearchError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::warn!("Search cancelled");
            Err(SearchError::Cancelled)
        }
        output = step => Ok(output),
    }
}
