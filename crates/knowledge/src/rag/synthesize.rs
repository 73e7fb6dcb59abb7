//! Grounded answer generation.

use crate::rag::types::{RagSettings, Synthesis};
use crate::types::Chunk;
use docchat_core::{AppError, AppResult};
use docchat_llm::{LlmClient, LlmRequest};
use docchat_prompt::{build_prompt, PromptDefinition};
use serde_json::json;
use std::sync::Arc;

/// Context used when the selector found nothing.
pub const NO_CONTEXT: &str = "No relevant context found in the knowledge base.";

/// The only failure text shown to users, apart from credential errors.
pub const GENERATION_FAILED: &str =
    "Failed to generate an answer. The model may be busy or an error occurred. Please try again.";

const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Join selected chunks into the context block, keeping their order.
pub fn build_context(chunks: &[Chunk]) -> String {
    if chunks.is_empty() {
        return NO_CONTEXT.to_string();
    }

    chunks
        .iter()
        .map(|chunk| {
            let page = chunk
                .page_number
                .map(|p| p.to_string())
                .unwrap_or_else(|| "N/A".to_string());
            format!(
                "Title: {}\nPage: {}\nContent: {}",
                chunk.title, page, chunk.content
            )
        })
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// Writes the answer from the selected chunks only.
#[derive(Clone)]
pub struct AnswerSynthesizer {
    client: Arc<dyn LlmClient>,
    prompt: PromptDefinition,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl AnswerSynthesizer {
    pub fn new(client: Arc<dyn LlmClient>, prompt: PromptDefinition, settings: &RagSettings) -> Self {
        Self {
            client,
            prompt,
            model: settings.model.clone(),
            temperature: settings.answer_temperature,
            max_tokens: settings.max_output_tokens,
        }
    }

    /// Answer `query` from `chunks`.
    ///
    /// # Errors
    /// `AppError::Credential` is returned as is. Every other failure is
    /// logged and replaced by `AppError::Generation` with [`GENERATION_FAILED`].
    pub async fn synthesize(&self, query: &str, chunks: Vec<Chunk>) -> AppResult<Synthesis> {
        match self.generate(query, &chunks).await {
            Ok(answer) => Ok(Synthesis {
                answer,
                sources: chunks,
            }),
            Err(e) if e.is_credential() => Err(e),
            Err(e) => {
                tracing::warn!("Answer generation failed: {}", e);
                Err(AppError::Generation(GENERATION_FAILED.to_string()))
            }
        }
    }

    async fn generate(&self, query: &str, chunks: &[Chunk]) -> AppResult<String> {
        let built = build_prompt(
            &self.prompt,
            &json!({
                "query": query,
                "context": build_context(chunks),
            }),
        )?;

        let mut request = LlmRequest::new(built.user, &self.model).with_temperature(self.temperature);
        if let Some(system) = built.system {
            request = request.with_system(system);
        }
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        tracing::debug!(
            "Generating answer from {} chunks (temperature {})",
            chunks.len(),
            self.temperature
        );

        let response = self.client.complete(&request).await?;
        tracing::debug!(
            "Answer used {} tokens (finish reason: {:?})",
            response.usage.total_tokens,
            response.finish_reason
        );

        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::support::{builtin_prompts, settings};
    use docchat_llm::MockClient;

    fn synthesizer(client: &Arc<MockClient>) -> AnswerSynthesizer {
        let client: Arc<dyn LlmClient> = client.clone();
        AnswerSynthesizer::new(client, builtin_prompts().1, &settings())
    }

    #[test]
    fn test_context_layout() {
        let context = build_context(&[
            Chunk::page("Guide", 3, "third"),
            Chunk::page("Guide", 1, "first"),
        ]);
        assert_eq!(
            context,
            "Title: Guide\nPage: 3\nContent: third\n\n---\n\nTitle: Guide\nPage: 1\nContent: first"
        );
    }

    #[test]
    fn test_empty_context_sentinel() {
        assert_eq!(build_context(&[]), NO_CONTEXT);
    }

    #[tokio::test]
    async fn test_answer_request_shape() {
        let client = Arc::new(MockClient::new());
        client.push_text("The deadline is May 1. (Page 1)");

        let chunks = vec![Chunk::page("Guide", 1, "Admission deadline is May 1.")];
        let synthesis = synthesizer(&client)
            .synthesize("When is the deadline?", chunks.clone())
            .await
            .unwrap();

        assert_eq!(synthesis.answer, "The deadline is May 1. (Page 1)");
        assert_eq!(synthesis.sources, chunks);

        let request = &client.requests()[0];
        assert_eq!(request.temperature, Some(0.3));
        assert!(!request.expects_json());
        assert!(request.system.as_deref().unwrap_or_default().contains("(Page X)"));
        assert!(request.prompt.contains("Content: Admission deadline is May 1."));
        assert!(request.prompt.ends_with("QUESTION:\nWhen is the deadline?"));
    }

    #[tokio::test]
    async fn test_no_context_uses_sentinel() {
        let client = Arc::new(MockClient::new());
        client.push_text("I don't have enough information.");

        let synthesis = synthesizer(&client).synthesize("q", Vec::new()).await.unwrap();
        assert!(synthesis.sources.is_empty());
        assert!(client.requests()[0].prompt.contains(NO_CONTEXT));
    }

    #[tokio::test]
    async fn test_service_failure_is_generic() {
        let client = Arc::new(MockClient::new());
        client.push_failure("HTTP 503: overloaded, request id 1234");

        let err = synthesizer(&client).synthesize("q", Vec::new()).await.unwrap_err();
        assert!(matches!(err, AppError::Generation(_)));
        assert_eq!(err.to_string(), GENERATION_FAILED);
    }

    #[tokio::test]
    async fn test_credential_failure_passes_through() {
        let client = Arc::new(MockClient::new());
        client.push_rejected_key("API key not valid. Please pass a valid API key.");

        let err = synthesizer(&client).synthesize("q", Vec::new()).await.unwrap_err();
        assert!(err.is_credential());
        assert_eq!(err.to_string(), "API key not valid. Please pass a valid API key.");
    }
}
