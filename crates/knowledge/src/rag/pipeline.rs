//! One question, two model calls.

use crate::rag::select::RelevanceSelector;
use crate::rag::synthesize::AnswerSynthesizer;
use crate::rag::types::{RagSettings, Synthesis};
use crate::types::Chunk;
use docchat_core::{AppConfig, AppResult};
use docchat_llm::LlmClient;
use docchat_prompt::{load_prompt, PromptDefinition, ANSWER_PROMPT_ID, SELECT_PROMPT_ID};
use std::sync::Arc;

/// Selection followed by synthesis, sharing one model client.
#[derive(Clone)]
pub struct RagPipeline {
    client: Arc<dyn LlmClient>,
    selector: RelevanceSelector,
    synthesizer: AnswerSynthesizer,
}

impl RagPipeline {
    pub fn new(
        client: Arc<dyn LlmClient>,
        select_prompt: PromptDefinition,
        answer_prompt: PromptDefinition,
        settings: &RagSettings,
    ) -> Self {
        Self {
            selector: RelevanceSelector::new(Arc::clone(&client), select_prompt, settings),
            synthesizer: AnswerSynthesizer::new(Arc::clone(&client), answer_prompt, settings),
            client,
        }
    }

    /// Build the pipeline with the workspace's prompts and configured settings.
    pub fn from_config(config: &AppConfig, client: Arc<dyn LlmClient>) -> AppResult<Self> {
        let select_prompt = load_prompt(&config.workspace, SELECT_PROMPT_ID)?;
        let answer_prompt = load_prompt(&config.workspace, ANSWER_PROMPT_ID)?;
        Ok(Self::new(
            client,
            select_prompt,
            answer_prompt,
            &RagSettings::from_config(config),
        ))
    }

    /// Answer `query` against `chunks`.
    ///
    /// A missing credential fails before any request is sent. Selection
    /// failures degrade to an empty context; synthesis errors follow
    /// [`AnswerSynthesizer::synthesize`].
    pub async fn answer(&self, query: &str, chunks: &[Chunk]) -> AppResult<Synthesis> {
        self.client.check_credentials()?;

        tracing::info!(
            "Answering with {} over {} chunks",
            self.client.provider_name(),
            chunks.len()
        );

        let selected = self.selector.select(query, chunks).await;
        self.synthesizer.synthesize(query, selected).await
    }
}
