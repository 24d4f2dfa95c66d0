//! Resources command handler.
//!
//! Lets operators and ingestion jobs inspect resources and record
//! lifecycle progress.

use super::wiring::Stores;
use clap::{Args, Subcommand};
use khub_core::{config::AppConfig, AppResult};
use khub_knowledge::ResourceStatus;

/// Inspect and advance resources
#[derive(Args, Debug)]
pub struct ResourcesCommand {
    #[command(subcommand)]
    pub action: ResourcesAction,
}

#[derive(Subcommand, Debug)]
pub enum ResourcesAction {
    /// List resources of a domain
    List(ResourcesListCommand),
    /// Move a resource forward in its ingestion lifecycle
    Mark(ResourcesMarkCommand),
}

impl ResourcesCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let stores = Stores::postgres(config, false).await?;

        match &self.action {
            ResourcesAction::List(cmd) => cmd.execute(&stores).await,
            ResourcesAction::Mark(cmd) => cmd.execute(&stores).await,
        }
    }
}

/// List resources of a domain
#[derive(Args, Debug)]
pub struct ResourcesListCommand {
    /// Domain id
    pub domain: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ResourcesListCommand {
    async fn execute(&self, stores: &Stores) -> AppResult<()> {
        tracing::info!("Listing resources for domain '{}'", self.domain);

        let resources = stores.catalog().list_resources(&self.domain).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&resources)?);
        } else if resources.is_empty() {
            println!("No resources in domain '{}'", self.domain);
        } else {
            for resource in &resources {
                println!(
                    "{:>6}  {:<10} {}  {}",
                    resource.id,
                    resource.status.as_str(),
                    resource.name,
                    resource.url
                );
            }
        }

        Ok(())
    }
}

/// Move a resource forward in its ingestion lifecycle
#[derive(Args, Debug)]
pub struct ResourcesMarkCommand {
    /// Resource id
    pub id: i64,

    /// New status (INGESTING or INGESTED)
    #[arg(value_parser = parse_status)]
    pub status: ResourceStatus,
}

impl ResourcesMarkCommand {
    async fn execute(&self, stores: &Stores) -> AppResult<()> {
        tracing::info!("Marking resource {} as {}", self.id, self.status);

        let resource = stores.catalog().advance_resource(self.id, self.status).await?;
        println!("Resource {} is now {}", resource.id, resource.status);

        Ok(())
    }
}

fn parse_status(value: &str) -> Result<ResourceStatus, String> {
    value.parse()
}
