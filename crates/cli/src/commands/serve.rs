//! Serve command handler.

use super::wiring::{search_service, Stores};
use clap::Args;
use khub_core::{config::AppConfig, AppResult};
use khub_server::{build_app, serve, AppState};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Run the HTTP gateway
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Port to listen on (overrides kh_app_port)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Keep domains and resources in memory instead of PostgreSQL
    #[arg(long)]
    pub in_memory: bool,

    /// Skip applying database migrations at startup
    #[arg(long)]
    pub skip_migrations: bool,
}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing serve command");

        let stores = if self.in_memory {
            tracing::warn!("Using in-memory store; data is lost on exit");
            Stores::in_memory()
        } else {
            Stores::postgres(config, !self.skip_migrations).await?
        };

        let search = search_service(config, stores.resources.clone())?;
        let shutdown = CancellationToken::new();

        let state = AppState {
            search: Arc::new(search),
            catalog: Arc::new(stores.catalog()),
            db_pool: stores.postgres.as_ref().map(|pg| pg.pool().clone()),
            shutdown: shutdown.clone(),
        };

        let signal = shutdown.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Shutdown signal received"),
                Err(e) => tracing::error!("Could not listen for shutdown signal: {}", e),
            }
            signal.cancel();
        });

        serve(build_app(state), config.port, shutdown).await
    }
}
