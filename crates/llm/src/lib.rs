//! Model-service integration for docchat.
//!
//! A provider-agnostic [`LlmClient`] trait with hosted implementations.
//!
//! # Providers
//! - **Gemini**: Google Generative Language API (default)
//! - **OpenAI**: any OpenAI-compatible chat completions endpoint
//! - **Mock**: scripted client for tests
//!
//! # Example
//! ```no_run
//! use docchat_llm::{LlmClient, LlmRequest, providers::GeminiClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GeminiClient::new(std::env::var("API_KEY").ok(), "API_KEY");
//! let request = LlmRequest::new("Hello, world!", "gemini-2.5-flash");
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
pub use providers::{GeminiClient, MockClient, OpenAiClient};
pub use types::{ClientOptions, ProviderType};
