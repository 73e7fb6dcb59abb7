//! Model-service provider implementations.

pub mod gemini;
pub mod mock;
pub mod openai;

pub use gemini::GeminiClient;
pub use mock::MockClient;
pub use openai::OpenAiClient;

use docchat_core::AppError;

/// Message reported when the credential variable is unset.
pub(crate) fn missing_key_error(api_key_env: &str) -> AppError {
    AppError::Credential(format!("{} environment variable not set.", api_key_env))
}

/// Map a non-2xx provider response to an error.
///
/// Authentication failures become `Credential` so they reach the user
/// verbatim; everything else is an ordinary `Llm` error.
pub(crate) fn classify_api_error(
    provider: &str,
    status: reqwest::StatusCode,
    body: &str,
    api_key_env: &str,
) -> AppError {
    let rejected_key = status == reqwest::StatusCode::UNAUTHORIZED
        || status == reqwest::StatusCode::FORBIDDEN
        || body.contains("API_KEY_INVALID")
        || body.contains("invalid_api_key");

    if rejected_key {
        return AppError::Credential(format!(
            "The credential in {} was rejected by the model service ({}).",
            api_key_env, status
        ));
    }

    AppError::Llm(format!("{} API error ({}): {}", provider, status, body))
}

/// Build the shared HTTP client, honoring an optional timeout.
pub(crate) fn http_client(timeout_secs: Option<u64>) -> Result<reqwest::Client, AppError> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = timeout_secs {
        builder = builder.timeout(std::time::Duration::from_secs(secs));
    }
    builder
        .build()
        .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))
}
