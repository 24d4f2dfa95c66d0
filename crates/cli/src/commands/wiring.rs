//! Service construction from configuration.

use khub_core::{config::AppConfig, AppError, AppResult};
use khub_knowledge::{
    AnswerRetriever, Catalog, DomainStore, LlmConceptExtractor, MemoryStore, PgStore,
    ReadinessGate, ResourceStore, SearchService, WeaviateBackend,
};
use std::sync::Arc;
use std::time::Duration;

const MAX_DB_CONNECTIONS: u32 = 10;

/// Domain and resource stores behind one backend.
pub struct Stores {
    pub domains: Arc<dyn DomainStore>,
    pub resources: Arc<dyn ResourceStore>,
    /// Set when backed by PostgreSQL
    pub postgres: Option<PgStore>,
}

impl Stores {
    /// Process-local stores; nothing survives a restart.
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            domains: store.clone(),
            resources: store,
            postgres: None,
        }
    }

    /// Connect to PostgreSQL, optionally applying migrations.
    pub async fn postgres(config: &AppConfig, migrate: bool) -> AppResult<Self> {
        let store = PgStore::connect(config.require_database_url()?, MAX_DB_CONNECTIONS).await?;
        if migrate {
            store.migrate().await?;
            tracing::info!("Database migrations applied");
        }

        let shared = Arc::new(store.clone());
        Ok(Self {
            domains: shared.clone(),
            resources: shared,
            postgres: Some(store),
        })
    }

    pub fn catalog(&self) -> Catalog {
        Catalog::new(self.domains.clone(), self.resources.clone())
    }
}

/// Wire the search pipeline: readiness over `resources`, LLM concept
/// extraction and Weaviate grouped generation.
pub fn search_service(
    config: &AppConfig,
    resources: Arc<dyn ResourceStore>,
) -> AppResult<SearchService> {
    let api_key = config.require_openai_api_key()?;
    let settings = &config.concepts;

    let client = khub_llm::create_client(
        &settings.provider,
        settings.endpoint.as_deref(),
        Some(api_key),
        settings.timeout_secs.map(Duration::from_secs),
    )
    .map_err(|e| AppError::Config(format!("Failed to create concept client: {}", e)))?;

    let extractor = LlmConceptExtractor::new(client, &settings.model);
    let backend = WeaviateBackend::new(config.require_weaviate_url()?).with_openai_api_key(api_key);
    let retriever = AnswerRetriever::from_settings(Arc::new(backend), &config.retrieval);

    tracing::debug!(
        provider = %settings.provider,
        model = %settings.model,
        result_limit = config.retrieval.result_limit,
        "Search pipeline configured"
    );

    Ok(SearchService::new(
        ReadinessGate::new(resources),
        Arc::new(extractor),
        retriever,
    ))
}
