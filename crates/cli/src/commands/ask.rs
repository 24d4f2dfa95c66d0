//! Ask command handler.
//!
//! Runs one question through the same pipeline the gateway uses.

use super::wiring::{search_service, Stores};
use clap::Args;
use khub_core::{config::AppConfig, AppError, AppResult};
use khub_knowledge::{Query, SearchError};
use tokio_util::sync::CancellationToken;

/// Answer a single question against a domain
#[derive(Args, Debug)]
pub struct AskCommand {
    /// Domain id to search in
    pub domain: String,

    /// The question to ask
    pub question: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command for domain '{}'", self.domain);

        let stores = Stores::postgres(config, false).await?;
        let search = search_service(config, stores.resources.clone())?;

        let cancel = CancellationToken::new();
        let answer = search
            .search(Query::new(&self.domain, &self.question), &cancel)
            .await
            .map_err(|e| match e {
                SearchError::Validation(reason) => AppError::Validation(reason.to_string()),
                other => AppError::Knowledge(other.to_string()),
            })?;

        if self.json {
            let output = serde_json::to_string_pretty(&answer)?;
            println!("{}", output);
        } else {
            println!("{}", answer.response);
            if !answer.sources.is_empty() {
                println!();
                println!("Sources:");
                for source in &answer.sources {
                    println!("  - {}", source);
                }
            }
        }

        Ok(())
    }
}
