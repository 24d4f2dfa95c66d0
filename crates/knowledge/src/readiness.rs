//! Domain readiness gate.
//!
//! A domain is queryable once at least one of its resources has been
//! ingested into the generative backend.

use crate::store::ResourceStore;
use crate::types::ResourceStatus;
use khub_core::AppError;
use std::sync::Arc;
use thiserror::Error;

/// Why a domain cannot be queried yet. Safe to show to callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotReady {
    #[error("domain '{domain_id}' is unknown or has no resources")]
    NoResources { domain_id: String },

    #[error("domain '{domain_id}' has no ingested resources yet")]
    NoneIngested { domain_id: String },
}

#[derive(Debug, Error)]
pub enum ReadinessError {
    #[error(transparent)]
    NotReady(#[from] NotReady),

    #[error("could not list resources")]
    Store(#[source] AppError),
}

/// Checks that a domain has ingested content before it is searched.
pub struct ReadinessGate {
    resources: Arc<dyn ResourceStore>,
}

impl ReadinessGate {
    pub fn new(resources: Arc<dyn ResourceStore>) -> Self {
        Self { resources }
    }

    pub async fn check_ready(&self, domain_id: &str) -> Result<(), ReadinessError> {
        let resources = self
            .resources
            .list_resources(domain_id)
            .await
            .map_err(ReadinessError::Store)?;

        if resources.is_empty() {
            return Err(NotReady::NoResources {
                domain_id: domain_id.to_string(),
            }
            .into());
        }

        if !resources
            .iter()
            .any(|r| r.status == ResourceStatus::Ingested)
        {
            return Err(NotReady::NoneIngested {
                domain_id: domain_id.to_string(),
            }
            .into());
        }

        tracing::debug!(domain_id, resources = resources.len(), "Domain is ready");
        Ok(())
    }
}
