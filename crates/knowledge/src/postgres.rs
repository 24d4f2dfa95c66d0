//! PostgreSQL-backed domain and resource store.

use crate::store::{DomainStore, ResourceStore, StatusUpdate};
use crate::types::{Domain, NewResource, Resource, ResourceStatus};
use chrono::{DateTime, Utc};
use khub_core::{AppError, AppResult};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

const RESOURCE_COLUMNS: &str = "id, domain_id, name, description, status, url, created_at, \
     updated_at, ingestion_started_at, ingestion_completed_at";

/// Lifecycle position of the stored `status` column, matching [`status_rank`].
const STORED_STATUS_RANK: &str =
    "CASE status WHEN 'NEW' THEN 0 WHEN 'INGESTING' THEN 1 ELSE 2 END";

fn status_rank(status: ResourceStatus) -> i32 {
    match status {
        ResourceStatus::New => 0,
        ResourceStatus::Ingesting => 1,
        ResourceStatus::Ingested => 2,
    }
}

/// Row shape of the `resources` table; `status` is stored as text.
#[derive(Debug, sqlx::FromRow)]
struct ResourceRow {
    id: i64,
    domain_id: String,
    name: String,
    description: String,
    status: String,
    url: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    ingestion_started_at: Option<DateTime<Utc>>,
    ingestion_completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<ResourceRow> for Resource {
    type Error = AppError;

    fn try_from(row: ResourceRow) -> AppResult<Self> {
        let status: ResourceStatus = row.status.parse().map_err(|e| {
            AppError::Database(format!("could not read resource {}: {}", row.id, e))
        })?;

        Ok(Resource {
            id: row.id,
            domain_id: row.domain_id,
            name: row.name,
            description: row.description,
            status,
            url: row.url,
            created_at: row.created_at,
            updated_at: row.updated_at,
            ingestion_started_at: row.ingestion_started_at,
            ingestion_completed_at: row.ingestion_completed_at,
        })
    }
}

/// Store over a shared PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> AppResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| AppError::Database(format!("could not connect to database: {}", e)))?;

        Ok(Self::new(pool))
    }

    /// Apply pending schema migrations.
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("could not run migrations: {}", e)))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl DomainStore for PgStore {
    async fn list_domains(&self) -> AppResult<Vec<Domain>> {
        sqlx::query_as::<_, Domain>(
            "SELECT id, name, description, created_at, updated_at FROM domains ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("could not list domains: {}", e)))
    }

    async fn get_domain(&self, id: &str) -> AppResult<Option<Domain>> {
        sqlx::query_as::<_, Domain>(
            "SELECT id, name, description, created_at, updated_at FROM domains WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("could not fetch domain with id {}: {}", id, e)))
    }

    async fn create_domain(&self, domain: &Domain) -> AppResult<Domain> {
        sqlx::query_as::<_, Domain>(
            "INSERT INTO domains (id, name, description, created_at)
             VALUES ($1, $2, $3, $4)
             RETURNING id, name, description, created_at, updated_at",
        )
        .bind(&domain.id)
        .bind(&domain.name)
        .bind(&domain.description)
        .bind(domain.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("could not create domain {}: {}", domain.id, e)))
    }

    async fn delete_domain(&self, id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM domains WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::Database(format!("could not delete domain with id {}: {}", id, e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl ResourceStore for PgStore {
    async fn list_resources(&self, domain_id: &str) -> AppResult<Vec<Resource>> {
        let rows = sqlx::query_as::<_, ResourceRow>(&format!(
            "SELECT {} FROM resources WHERE domain_id = $1 ORDER BY id",
            RESOURCE_COLUMNS
        ))
        .bind(domain_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::Database(format!(
                "could not list resources for domain {}: {}",
                domain_id, e
            ))
        })?;

        rows.into_iter().map(Resource::try_from).collect()
    }

    async fn get_resource(&self, id: i64) -> AppResult<Option<Resource>> {
        let row = sqlx::query_as::<_, ResourceRow>(&format!(
            "SELECT {} FROM resources WHERE id = $1",
            RESOURCE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::Database(format!("could not fetch resource with id {}: {}", id, e))
        })?;

        row.map(Resource::try_from).transpose()
    }

    async fn create_resource(
        &self,
        domain_id: &str,
        resource: &NewResource,
        created_at: DateTime<Utc>,
    ) -> AppResult<Resource> {
        let row = sqlx::query_as::<_, ResourceRow>(&format!(
            "INSERT INTO resources (domain_id, name, description, status, url, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            RESOURCE_COLUMNS
        ))
        .bind(domain_id)
        .bind(&resource.name)
        .bind(&resource.description)
        .bind(ResourceStatus::New.as_str())
        .bind(&resource.url)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::Database(format!(
                "could not create resource {} in domain {}: {}",
                resource.name, domain_id, e
            ))
        })?;

        Resource::try_from(row)
    }

    async fn update_status(
        &self,
        id: i64,
        status: ResourceStatus,
        at: DateTime<Utc>,
    ) -> AppResult<StatusUpdate> {
        let row = sqlx::query_as::<_, ResourceRow>(&format!(
            "UPDATE resources SET
                status = $2,
                updated_at = $3,
                ingestion_started_at = CASE
                    WHEN $2 <> 'NEW' THEN COALESCE(ingestion_started_at, $3)
                    ELSE ingestion_started_at END,
                ingestion_completed_at = CASE
                    WHEN $2 = 'INGESTED' THEN $3
                    ELSE ingestion_completed_at END
             WHERE id = $1 AND {} < $4
             RETURNING {}",
            STORED_STATUS_RANK, RESOURCE_COLUMNS
        ))
        .bind(id)
        .bind(status.as_str())
        .bind(at)
        .bind(status_rank(status))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::Database(format!("could not update resource with id {}: {}", id, e))
        })?;

        if let Some(row) = row {
            return Resource::try_from(row).map(StatusUpdate::Advanced);
        }

        // Nothing matched: either the id is unknown or the move is not forward.
        let current: Option<(String,)> =
            sqlx::query_as("SELECT status FROM resources WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    AppError::Database(format!("could not read resource with id {}: {}", id, e))
                })?;

        match current {
            None => Ok(StatusUpdate::Missing),
            Some((current,)) => {
                let current = current.parse().map_err(|e| {
                    AppError::Database(format!("could not read resource {}: {}", id, e))
                })?;
                Ok(StatusUpdate::Refused { current })
            }
        }
    }

    async fn delete_resource(&self, domain_id: &str, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM resources WHERE id = $1 AND domain_id = $2")
            .bind(id)
            .bind(domain_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::Database(format!("could not delete resource with id {}: {}", id, e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}
