//! Knowledge hub domain logic.
//!
//! Domains and their resources, the readiness gate, concept extraction,
//! generative retrieval and the search pipeline that ties them together.

pub mod catalog;
pub mod concepts;
pub mod memory;
pub mod postgres;
pub mod readiness;
pub mod retrieval;
pub mod search;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use catalog::Catalog;
pub use concepts::{ConceptExtractor, ExtractionError, LlmConceptExtractor};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use readiness::{NotReady, ReadinessError, ReadinessGate};
pub use retrieval::{
    AnswerRetriever, DecodeStage, GenerativeBackend, GenerativeQuery, GraphQlResponse,
    RetrievalError, WeaviateBackend,
};
pub use search::{SearchError, SearchService};
pub use store::{DomainStore, ResourceStore, StatusUpdate};
pub use types::{
    Answer, Concept, Domain, NewDomain, NewResource, Query, Resource, ResourceStatus,
};
