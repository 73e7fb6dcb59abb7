//! Provider selection types.

use serde::{Deserialize, Serialize};

/// Provider type enum for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    Gemini,
    OpenAI,
}

impl ProviderType {
    /// Parse provider type from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Some(Self::Gemini),
            "openai" => Some(Self::OpenAI),
            _ => None,
        }
    }

    /// Get the canonical provider name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAI => "openai",
        }
    }

    /// Default API base URL.
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::Gemini => "https://generativelanguage.googleapis.com",
            Self::OpenAI => "https://api.openai.com/v1",
        }
    }
}

/// Everything the factory needs to build a client.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Provider identifier ("gemini", "openai")
    pub provider: String,

    /// Custom endpoint URL
    pub endpoint: Option<String>,

    /// Credential, if one was found
    pub api_key: Option<String>,

    /// Name of the variable the credential is read from (used in messages)
    pub api_key_env: String,

    /// HTTP timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl ClientOptions {
    /// Options for `provider` with no credential and default endpoint.
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            endpoint: None,
            api_key: None,
            api_key_env: "API_KEY".to_string(),
            timeout_secs: None,
        }
    }

    /// Attach a credential and the variable it came from.
    pub fn with_api_key(mut self, api_key: Option<String>, api_key_env: impl Into<String>) -> Self {
        self.api_key = api_key;
        self.api_key_env = api_key_env.into();
        self
    }

    /// Override the endpoint.
    pub fn with_endpoint(mut self, endpoint: Option<String>) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Set the HTTP timeout.
    pub fn with_timeout(mut self, timeout_secs: Option<u64>) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}
