//! Persistence abstractions for domains and resources.
//!
//! The search pipeline only reads resources; the catalog uses the rest.

use crate::types::{Domain, NewResource, Resource, ResourceStatus};
use chrono::{DateTime, Utc};
use khub_core::AppResult;

/// Outcome of [`ResourceStore::update_status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    Advanced(Resource),
    /// The resource is already at or past the requested status.
    Refused { current: ResourceStatus },
    Missing,
}

/// Trait for domain storage backends.
#[async_trait::async_trait]
pub trait DomainStore: Send + Sync {
    async fn list_domains(&self) -> AppResult<Vec<Domain>>;

    /// Returns `None` when no domain has this id.
    async fn get_domain(&self, id: &str) -> AppResult<Option<Domain>>;

    async fn create_domain(&self, domain: &Domain) -> AppResult<Domain>;

    /// Delete a domain and its resources. Returns whether anything was deleted.
    async fn delete_domain(&self, id: &str) -> AppResult<bool>;
}

/// Trait for resource storage backends.
#[async_trait::async_trait]
pub trait ResourceStore: Send + Sync {
    /// All resources declared under a domain, in creation order.
    async fn list_resources(&self, domain_id: &str) -> AppResult<Vec<Resource>>;

    async fn get_resource(&self, id: i64) -> AppResult<Option<Resource>>;

    /// Insert a resource with status `NEW` and return it with its assigned id.
    async fn create_resource(
        &self,
        domain_id: &str,
        resource: &NewResource,
        created_at: DateTime<Utc>,
    ) -> AppResult<Resource>;

    /// Move a resource forward to `status`, stamping lifecycle timestamps
    /// with `at`.
    ///
    /// The check and the write are one atomic step; a transition that is not
    /// strictly forward is refused and leaves the row untouched.
    async fn update_status(
        &self,
        id: i64,
        status: ResourceStatus,
        at: DateTime<Utc>,
    ) -> AppResult<StatusUpdate>;

    /// Returns whether a resource with this id existed under the domain.
    async fn delete_resource(&self, domain_id: &str, id: i64) -> AppResult<bool>;
}
