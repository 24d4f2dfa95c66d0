//! LLM provider factory.
//!
//! Builds an LLM client from configuration values: resolves the provider,
//! checks the secrets it needs and applies the optional endpoint and timeout.

use crate::client::LlmClient;
use crate::providers::OpenAiClient;
use crate::types::ProviderType;
use std::sync::Arc;
use std::time::Duration;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("openai")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key, required by every hosted provider
/// * `timeout` - Optional per-request timeout
///
/// # Errors
/// Returns error if the provider is unknown, a required secret is missing,
/// or the HTTP client cannot be built.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout: Option<Duration>,
) -> Result<Arc<dyn LlmClient>, String> {
    match ProviderType::parse(provider) {
        Some(ProviderType::OpenAI) => {
            let api_key = api_key.ok_or_else(|| "OpenAI provider requires API key".to_string())?;

            let client = match endpoint {
                Some(base_url) => OpenAiClient::with_base_url(base_url, api_key),
                None => OpenAiClient::new(api_key),
            };

            let client = match timeout {
                Some(timeout) => client.with_timeout(timeout).map_err(|e| e.to_string())?,
                None => client,
            };

            Ok(Arc::new(client))
        }
        None => Err(format!("Unknown provider: {}", provider)),
    }
}
