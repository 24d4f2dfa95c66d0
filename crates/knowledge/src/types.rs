//! Knowledge hub entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A semantic term extracted from a question, used to scope similarity search.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Concept(String);

impl Concept {
    pub fn new(term: impl Into<String>) -> Self {
        Self(term.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Concept {
    fn from(term: &str) -> Self {
        Self::new(term)
    }
}

impl From<String> for Concept {
    fn from(term: String) -> Self {
        Self(term)
    }
}

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A question scoped to a domain.
///
/// `concepts` is filled in by the search pipeline; callers leave it empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    pub domain_id: String,
    pub question: String,
    #[serde(default)]
    pub concepts: Vec<Concept>,
}

impl Query {
    pub fn new(domain_id: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            domain_id: domain_id.into(),
            question: question.into(),
            concepts: Vec::new(),
        }
    }
}

/// A grounded answer with the sources it was attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub query: Query,
    pub response: String,
    pub sources: Vec<String>,
}

/// A named collection of content a question can be scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    /// Slug that doubles as the backend collection name
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Request body for creating a domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDomain {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Ingestion lifecycle of a resource.
///
/// Variants are ordered; a resource only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceStatus {
    New,
    Ingesting,
    Ingested,
}

impl ResourceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Ingesting => "INGESTING",
            Self::Ingested => "INGESTED",
        }
    }

    /// Whether moving from `self` to `next` keeps the lifecycle monotonic.
    pub fn can_advance_to(self, next: ResourceStatus) -> bool {
        next > self
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NEW" => Ok(Self::New),
            "INGESTING" => Ok(Self::Ingesting),
            "INGESTED" => Ok(Self::Ingested),
            other => Err(format!("unknown resource status: {}", other)),
        }
    }
}

/// One ingestible content unit belonging to a domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: i64,
    pub domain_id: String,
    pub name: String,
    pub description: String,
    pub status: ResourceStatus,
    pub url: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingestion_started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingestion_completed_at: Option<DateTime<Utc>>,
}

impl Resource {
    /// Apply a status change and stamp the matching lifecycle timestamps.
    pub fn apply_status(&mut self, status: ResourceStatus, at: DateTime<Utc>) {
        self.status = status;
        self.updated_at = Some(at);
        if status >= ResourceStatus::Ingesting && self.ingestion_started_at.is_none() {
            self.ingestion_started_at = Some(at);
        }
        if status == ResourceStatus::Ingested {
            self.ingestion_completed_at = Some(at);
        }
    }
}

/// Request body for registering a resource under a domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewResource {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
}
