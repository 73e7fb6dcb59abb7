//! Relevance selection delegated to the model.
//!
//! Every chunk is enumerated in the prompt and the model answers with the ids
//! of the most relevant ones. The prompt therefore grows with the whole
//! corpus; this only suits documents of a few dozen pages.

use crate::rag::types::{RagSettings, SelectionReply};
use crate::types::Chunk;
use docchat_core::{AppError, AppResult};
use docchat_llm::{LlmClient, LlmRequest};
use docchat_prompt::{build_prompt, PromptDefinition};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;

/// Corpus size above which each selection prompt is logged as oversized.
pub const SCALING_WARN_CHARS: usize = 100_000;

/// Picks up to `max_results` chunks for a query with one structured model call.
#[derive(Clone)]
pub struct RelevanceSelector {
    client: Arc<dyn LlmClient>,
    prompt: PromptDefinition,
    model: String,
    max_results: usize,
    temperature: f32,
}

impl RelevanceSelector {
    pub fn new(client: Arc<dyn LlmClient>, prompt: PromptDefinition, settings: &RagSettings) -> Self {
        Self {
            client,
            prompt,
            model: settings.model.clone(),
            max_results: settings.max_results,
            temperature: settings.selection_temperature,
        }
    }

    /// Chunks relevant to `query`, most relevant first.
    ///
    /// Never fails: any error is logged and yields an empty selection, so the
    /// turn continues without context.
    pub async fn select(&self, query: &str, chunks: &[Chunk]) -> Vec<Chunk> {
        if chunks.is_empty() {
            return Vec::new();
        }

        match self.try_select(query, chunks).await {
            Ok(selected) => {
                tracing::info!(
                    "Selected {} of {} chunks: {:?}",
                    selected.len(),
                    chunks.len(),
                    selected.iter().map(|c| c.id.as_str()).collect::<Vec<_>>()
                );
                selected
            }
            Err(e) => {
                tracing::warn!("Relevance selection failed, continuing without context: {}", e);
                Vec::new()
            }
        }
    }

    async fn try_select(&self, query: &str, chunks: &[Chunk]) -> AppResult<Vec<Chunk>> {
        let corpus_chars: usize = chunks.iter().map(Chunk::char_count).sum();
        if corpus_chars > SCALING_WARN_CHARS {
            tracing::warn!(
                "Selection prompt enumerates {} chars across {} pages; large documents need an index instead",
                corpus_chars,
                chunks.len()
            );
        }

        let documents: Vec<Value> = chunks
            .iter()
            .map(|c| {
                json!({
                    "id": c.id,
                    "title": c.title,
                    "page": c.page_number,
                    "content": c.content,
                })
            })
            .collect();

        let built = build_prompt(
            &self.prompt,
            &json!({
                "query": query,
                "documents": documents,
                "max_results": self.max_results,
            }),
        )?;

        let mut request = LlmRequest::new(built.user, &self.model)
            .with_temperature(self.temperature)
            .with_json_schema(selection_schema());
        if let Some(system) = built.system {
            request = request.with_system(system);
        }

        let response = self.client.complete(&request).await?;
        let ids = parse_selection(&response.content)?;

        Ok(resolve_ids(&ids, chunks, self.max_results))
    }
}

/// Response schema of the selection call.
pub fn selection_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "relevant_document_ids": {
                "type": "array",
                "description": "An array of up to 3 document IDs that are most relevant to the user's query, ordered by relevance.",
                "items": { "type": "string" }
            }
        },
        "required": ["relevant_document_ids"]
    })
}

/// Parse the id list, tolerating a Markdown code fence around the JSON.
pub(crate) fn parse_selection(raw: &str) -> AppResult<Vec<String>> {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        // drop the info string ("json") on the fence line
        text = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
        text = text.trim_end().trim_end_matches("```").trim();
    }

    let reply: SelectionReply = serde_json::from_str(text)
        .map_err(|e| AppError::Llm(format!("Malformed selection reply: {}", e)))?;
    Ok(reply.relevant_document_ids)
}

/// Map ids back to chunks in returned order, dropping unknown and repeated ids.
pub(crate) fn resolve_ids(ids: &[String], chunks: &[Chunk], max_results: usize) -> Vec<Chunk> {
    let mut seen = HashSet::new();
    let mut selected = Vec::new();

    for id in ids {
        if selected.len() == max_results {
            break;
        }
        if !seen.insert(id.as_str()) {
            continue;
        }
        match chunks.iter().find(|c| &c.id == id) {
            Some(chunk) => selected.push(chunk.clone()),
            None => tracing::debug!("Ignoring unknown chunk id from selection: {}", id),
        }
    }

    selected
}
