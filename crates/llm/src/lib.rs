//! LLM integration crate for the Knowledge Hub.
//!
//! This crate provides a provider-agnostic abstraction for chat-style
//! completions. Concept extraction is its only consumer today, but nothing in
//! the trait is specific to it.
//!
//! # Providers
//! - **OpenAI**: chat completions API (or any compatible endpoint)
//!
//! # Example
//! ```no_run
//! use khub_llm::{LlmClient, LlmRequest, providers::OpenAiClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenAiClient::new("sk-...");
//! let request = LlmRequest::new("Hello, world!", "gpt-3.5-turbo");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::OpenAiClient;
pub use types::ProviderType;
