//! Router construction and the serve loop.

use crate::routes::{
    add_domain, add_resource, delete_domain, delete_resource, health_handler, list_domains,
    list_resources, search_handler,
};
use axum::routing::{delete, get};
use axum::Router;
use khub_core::{AppError, AppResult};
use khub_knowledge::{Catalog, SearchService};
use sqlx::PgPool;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<SearchService>,
    pub catalog: Arc<Catalog>,
    /// Present when backed by PostgreSQL; used by the health check
    pub db_pool: Option<PgPool>,
    /// Cancelled on shutdown; in-flight searches get a child token
    pub shutdown: CancellationToken,
}

/// Build the application router.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/search", get(search_handler))
        .route("/domains", get(list_domains).post(add_domain))
        .route("/domains/:domain_id", delete(delete_domain))
        .route(
            "/domains/:domain_id/resources",
            get(list_resources).post(add_resource),
        )
        .route(
            "/domains/:domain_id/resources/:resource_id",
            delete(delete_resource),
        )
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve `app` on `port` until `shutdown` is cancelled.
pub async fn serve(app: Router, port: u16, shutdown: CancellationToken) -> AppResult<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Other(format!("Server error: {}", e)))?;

    tracing::info!("Server stopped");
    Ok(())
}
