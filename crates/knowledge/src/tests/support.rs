//! Shared fixtures: an in-memory extractor and pipeline builders.

use crate::parser::{PageSource, TextExtractor};
use crate::rag::{RagPipeline, RagSettings};
use docchat_core::{AppError, AppResult};
use docchat_llm::{LlmClient, MockClient};
use docchat_prompt::{PromptDefinition, ANSWER_PROMPT_ID, SELECT_PROMPT_ID};
use std::path::Path;
use std::sync::Arc;

/// Extractor that ignores the bytes and serves fixed page fragments.
#[derive(Debug, Clone, Default)]
pub(crate) struct PagedText {
    pages: Vec<Vec<String>>,
    failure: Option<String>,
}

impl PagedText {
    pub(crate) fn new(pages: &[&[&str]]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|page| page.iter().map(|f| f.to_string()).collect())
                .collect(),
            failure: None,
        }
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }
}

impl TextExtractor for PagedText {
    fn open(&self, _bytes: &[u8]) -> AppResult<Box<dyn PageSource>> {
        match self.failure {
            Some(ref message) => Err(AppError::Ingest(message.clone())),
            None => Ok(Box::new(self.clone())),
        }
    }
}

impl PageSource for PagedText {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_fragments(&self, page: u32) -> AppResult<Vec<String>> {
        page.checked_sub(1)
            .and_then(|i| self.pages.get(i as usize))
            .cloned()
            .ok_or_else(|| AppError::Ingest(format!("Page {} is out of range", page)))
    }
}

pub(crate) fn builtin_prompts() -> (PromptDefinition, PromptDefinition) {
    let workspace = Path::new("/nonexistent-docchat-workspace");
    (
        docchat_prompt::load_prompt(workspace, SELECT_PROMPT_ID).unwrap(),
        docchat_prompt::load_prompt(workspace, ANSWER_PROMPT_ID).unwrap(),
    )
}

pub(crate) fn settings() -> RagSettings {
    RagSettings {
        model: "test-model".to_string(),
        max_results: 3,
        selection_temperature: 0.0,
        answer_temperature: 0.3,
        max_output_tokens: None,
    }
}

/// Pipeline over a shared mock, with the built-in prompts.
pub(crate) fn pipeline(client: &Arc<MockClient>) -> RagPipeline {
    let (select, answer) = builtin_prompts();
    let client: Arc<dyn LlmClient> = client.clone();
    RagPipeline::new(client, select, answer, &settings())
}

/// JSON reply of the selection call.
pub(crate) fn selection(ids: &[&str]) -> String {
    serde_json::json!({ "relevant_document_ids": ids }).to_string()
}
