//! Domain and resource catalog.
//!
//! Validates operator input before it reaches the stores. Validation
//! failures are returned as [`AppError::Validation`] with a message meant
//! for the caller; store failures are logged and replaced by a generic
//! message.

use crate::store::{DomainStore, ResourceStore, StatusUpdate};
use crate::types::{Domain, NewDomain, NewResource, Resource, ResourceStatus};
use chrono::Utc;
use khub_core::{AppError, AppResult};
use regex::Regex;
use std::sync::{Arc, LazyLock};
use url::Url;

const DOMAIN_ID_MIN_LEN: usize = 2;
const DOMAIN_ID_MAX_LEN: usize = 15;
const NAME_MAX_LEN: usize = 50;
const DESCRIPTION_MAX_LEN: usize = 140;

static DOMAIN_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Za-z0-9_]*$").expect("domain id pattern is valid"));

/// Use cases over domains and their resources.
pub struct Catalog {
    domains: Arc<dyn DomainStore>,
    resources: Arc<dyn ResourceStore>,
}

impl Catalog {
    pub fn new(domains: Arc<dyn DomainStore>, resources: Arc<dyn ResourceStore>) -> Self {
        Self { domains, resources }
    }

    pub async fn list_domains(&self) -> AppResult<Vec<Domain>> {
        self.domains
            .list_domains()
            .await
            .map_err(|e| store_failure(e, "could not fetch domain list"))
    }

    pub async fn add_domain(&self, domain: NewDomain) -> AppResult<Domain> {
        validate_domain(&domain)?;

        let existing = self
            .domains
            .get_domain(&domain.id)
            .await
            .map_err(|e| store_failure(e, "could not create domain"))?;
        if existing.is_some() {
            return Err(AppError::Validation("domain id already exists".to_string()));
        }

        let record = Domain {
            id: domain.id,
            name: domain.name,
            description: domain.description,
            created_at: Utc::now(),
            updated_at: None,
        };

        let created = self
            .domains
            .create_domain(&record)
            .await
            .map_err(|e| store_failure(e, "could not create domain"))?;

        tracing::info!(domain_id = %created.id, "Domain created");
        Ok(created)
    }

    /// Delete a domain and everything declared under it.
    ///
    /// Returns `false` when no such domain exists.
    pub async fn delete_domain(&self, domain_id: &str) -> AppResult<bool> {
        let deleted = self
            .domains
            .delete_domain(domain_id)
            .await
            .map_err(|e| store_failure(e, "could not delete domain"))?;

        if deleted {
            tracing::info!(domain_id, "Domain deleted");
        }
        Ok(deleted)
    }

    pub async fn list_resources(&self, domain_id: &str) -> AppResult<Vec<Resource>> {
        self.resources
            .list_resources(domain_id)
            .await
            .map_err(|e| store_failure(e, "could not fetch resources list"))
    }

    pub async fn add_resource(
        &self,
        domain_id: &str,
        resource: NewResource,
    ) -> AppResult<Resource> {
        validate_resource(&resource)?;

        let domain = self
            .domains
            .get_domain(domain_id)
            .await
            .map_err(|e| store_failure(e, "could not create resource"))?;
        if domain.is_none() {
            return Err(AppError::Validation("invalid domain id".to_string()));
        }

        let created = self
            .resources
            .create_resource(domain_id, &resource, Utc::now())
            .await
            .map_err(|e| store_failure(e, "could not create resource"))?;

        tracing::info!(domain_id, resource_id = created.id, "Resource created");
        Ok(created)
    }

    /// Returns `false` when the resource does not exist under this domain.
    pub async fn delete_resource(&self, domain_id: &str, resource_id: i64) -> AppResult<bool> {
        let deleted = self
            .resources
            .delete_resource(domain_id, resource_id)
            .await
            .map_err(|e| store_failure(e, "could not delete resource"))?;

        if deleted {
            tracing::info!(domain_id, resource_id, "Resource deleted");
        }
        Ok(deleted)
    }

    /// Move a resource forward in its ingestion lifecycle.
    ///
    /// The store applies the transition atomically, so concurrent advances
    /// cannot move a resource backwards.
    pub async fn advance_resource(
        &self,
        resource_id: i64,
        status: ResourceStatus,
    ) -> AppResult<Resource> {
        let outcome = self
            .resources
            .update_status(resource_id, status, Utc::now())
            .await
            .map_err(|e| store_failure(e, "could not update resource"))?;

        match outcome {
            StatusUpdate::Advanced(updated) => {
                tracing::info!(resource_id, to = %updated.status, "Resource status advanced");
                Ok(updated)
            }
            StatusUpdate::Refused { current } => Err(AppError::Validation(format!(
                "resource {} cannot move from {} to {}",
                resource_id, current, status
            ))),
            StatusUpdate::Missing => Err(AppError::Validation(format!(
                "resource {} does not exist",
                resource_id
            ))),
        }
    }
}

fn store_failure(err: AppError, message: &str) -> AppError {
    tracing::error!(error = %err, "{}", message);
    AppError::Database(message.to_string())
}

fn validate_domain(domain: &NewDomain) -> AppResult<()> {
    let id_len = domain.id.chars().count();
    if !(DOMAIN_ID_MIN_LEN..=DOMAIN_ID_MAX_LEN).contains(&id_len) || !DOMAIN_ID.is_match(&domain.id)
    {
        return Err(AppError::Validation(format!(
            "the id must be between {} and {} characters long, start with an upper case character \
             and contain only letters, digits and underscores",
            DOMAIN_ID_MIN_LEN, DOMAIN_ID_MAX_LEN
        )));
    }

    if domain.name.trim().is_empty() {
        return Err(AppError::Validation("the name must not be empty".to_string()));
    }
    if domain.name.chars().count() > NAME_MAX_LEN {
        return Err(AppError::Validation(format!(
            "the name can be at most {} characters long",
            NAME_MAX_LEN
        )));
    }

    check_description(&domain.description)
}

fn validate_resource(resource: &NewResource) -> AppResult<()> {
    if resource.name.trim().is_empty() {
        return Err(AppError::Validation("the name must not be empty".to_string()));
    }
    if resource.name.chars().count() > NAME_MAX_LEN {
        return Err(AppError::Validation(format!(
            "the name can be at most {} characters long",
            NAME_MAX_LEN
        )));
    }

    check_description(&resource.description)?;

    match Url::parse(&resource.url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(()),
        _ => Err(AppError::Validation(
            "the url must be an absolute http or https url".to_string(),
        )),
    }
}

fn check_description(description: &str) -> AppResult<()> {
    if description.chars().count() > DESCRIPTION_MAX_LEN {
        return Err(AppError::Validation(format!(
            "the description can be at most {} characters long",
            DESCRIPTION_MAX_LEN
        )));
    }
    Ok(())
}
