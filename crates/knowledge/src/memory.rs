//! In-memory domain and resource store.
//!
//! Backs tests and the `--in-memory` server mode. Data lives as long as the
//! store does.

use crate::store::{DomainStore, ResourceStore, StatusUpdate};
use crate::types::{Domain, NewResource, Resource, ResourceStatus};
use chrono::{DateTime, Utc};
use khub_core::{AppError, AppResult};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct MemoryState {
    domains: BTreeMap<String, Domain>,
    resources: BTreeMap<i64, Resource>,
    last_resource_id: i64,
}

/// Store keeping domains and resources in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a resource as-is, keeping its id and status. Test seeding helper.
    pub async fn insert_resource(&self, resource: Resource) {
        let mut state = self.state.write().await;
        state.last_resource_id = state.last_resource_id.max(resource.id);
        state.resources.insert(resource.id, resource);
    }
}

#[async_trait::async_trait]
impl DomainStore for MemoryStore {
    async fn list_domains(&self) -> AppResult<Vec<Domain>> {
        let state = self.state.read().await;
        Ok(state.domains.values().cloned().collect())
    }

    async fn get_domain(&self, id: &str) -> AppResult<Option<Domain>> {
        let state = self.state.read().await;
        Ok(state.domains.get(id).cloned())
    }

    async fn create_domain(&self, domain: &Domain) -> AppResult<Domain> {
        let mut state = self.state.write().await;
        if state.domains.contains_key(&domain.id) {
            return Err(AppError::Database(format!(
                "duplicate key: domain {} already exists",
                domain.id
            )));
        }
        state.domains.insert(domain.id.clone(), domain.clone());
        Ok(domain.clone())
    }

    async fn delete_domain(&self, id: &str) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let removed = state.domains.remove(id).is_some();
        if removed {
            state.resources.retain(|_, r| r.domain_id != id);
        }
        Ok(removed)
    }
}

#[async_trait::async_trait]
impl ResourceStore for MemoryStore {
    async fn list_resources(&self, domain_id: &str) -> AppResult<Vec<Resource>> {
        let state = self.state.read().await;
        Ok(state
            .resources
            .values()
            .filter(|r| r.domain_id == domain_id)
            .cloned()
            .collect())
    }

    async fn get_resource(&self, id: i64) -> AppResult<Option<Resource>> {
        let state = self.state.read().await;
        Ok(state.resources.get(&id).cloned())
    }

    async fn create_resource(
        &self,
        domain_id: &str,
        resource: &NewResource,
        created_at: DateTime<Utc>,
    ) -> AppResult<Resource> {
        let mut state = self.state.write().await;
        state.last_resource_id += 1;

        let record = Resource {
            id: state.last_resource_id,
            domain_id: domain_id.to_string(),
            name: resource.name.clone(),
            description: resource.description.clone(),
            status: ResourceStatus::New,
            url: resource.url.clone(),
            created_at,
            updated_at: None,
            ingestion_started_at: None,
            ingestion_completed_at: None,
        };

        state.resources.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_status(
        &self,
        id: i64,
        status: ResourceStatus,
        at: DateTime<Utc>,
    ) -> AppResult<StatusUpdate> {
        let mut state = self.state.write().await;
        let Some(resource) = state.resources.get_mut(&id) else {
            return Ok(StatusUpdate::Missing);
        };

        if !resource.status.can_advance_to(status) {
            return Ok(StatusUpdate::Refused {
                current: resource.status,
            });
        }

        resource.apply_status(status, at);
        Ok(StatusUpdate::Advanced(resource.clone()))
    }

    async fn delete_resource(&self, domain_id: &str, id: i64) -> AppResult<bool> {
        let mut state = self.state.write().await;
        match state.resources.get(&id) {
            Some(resource) if resource.domain_id == domain_id => {
                state.resources.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
