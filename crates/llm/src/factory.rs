//! LLM provider factory.
//!
//! Builds a client from [`ClientOptions`]. A missing credential does not
//! fail here: the client reports it through `check_credentials` so the
//! conversation can show it to the user.

use crate::client::LlmClient;
use crate::providers::{GeminiClient, OpenAiClient};
use crate::types::{ClientOptions, ProviderType};
use docchat_core::{AppError, AppResult};
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or the HTTP client
/// cannot be built.
pub fn create_client(options: &ClientOptions) -> AppResult<Arc<dyn LlmClient>> {
    let provider = ProviderType::parse(&options.provider).ok_or_else(|| {
        AppError::Config(format!(
            "Unknown provider: {}. Supported: gemini, openai",
            options.provider
        ))
    })?;

    let endpoint = options
        .endpoint
        .clone()
        .unwrap_or_else(|| provider.default_endpoint().to_string());

    tracing::debug!(
        "Creating {} client (endpoint: {}, credential present: {})",
        provider.as_str(),
        endpoint,
        options.api_key.is_some()
    );

    match provider {
        ProviderType::Gemini => {
            let client = GeminiClient::new(options.api_key.clone(), &options.api_key_env)
                .with_base_url(endpoint)
                .with_timeout(options.timeout_secs)?;
            Ok(Arc::new(client))
        }
        ProviderType::OpenAI => {
            let client = OpenAiClient::new(options.api_key.clone(), &options.api_key_env)
                .with_base_url(endpoint)
                .with_timeout(options.timeout_secs)?;
            Ok(Arc::new(client))
        }
    }
}
