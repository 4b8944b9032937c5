//! LLM provider factory.
//!
//! Resolves a provider name plus optional endpoint and API key into a
//! ready-to-use client.

use crate::client::LlmClient;
use crate::providers::{GeminiClient, OllamaClient};
use crate::types::ProviderType;
use knowqa_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("gemini", "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key, required by Gemini
/// * `timeout` - Per-request timeout
///
/// # Errors
/// Returns `AppError::Llm` if the provider is unknown, a required key is
/// missing, or the HTTP client cannot be built.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout: Duration,
) -> AppResult<Arc<dyn LlmClient>> {
    let provider_type = ProviderType::parse(provider)
        .ok_or_else(|| AppError::Llm(format!("Unknown provider: {}", provider)))?;

    let base_url = endpoint.unwrap_or(provider_type.default_endpoint());
    let api_key = api_key.filter(|key| !key.trim().is_empty());
    if provider_type.requires_api_key() && api_key.is_none() {
        return Err(AppError::Llm(format!(
            "{} provider requires API key",
            provider_type.display_name()
        )));
    }

    match provider_type {
        ProviderType::Ollama => {
            let client = OllamaClient::with_timeout(base_url, timeout)?;
            Ok(Arc::new(client))
        }
        ProviderType::Gemini => {
            let client = GeminiClient::with_timeout(base_url, api_key.unwrap_or_default(), timeout)?;
            Ok(Arc::new(client))
        }
    }
}
