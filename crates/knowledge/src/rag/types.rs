//! RAG types.

use crate::types::Chunk;
use docchat_core::AppConfig;
use serde::{Deserialize, Serialize};

/// Model settings shared by the selection and synthesis calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagSettings {
    /// Model identifier used for both calls
    pub model: String,

    /// Maximum chunks the selector returns
    pub max_results: usize,

    pub selection_temperature: f32,

    pub answer_temperature: f32,

    /// Token cap for the answer, provider default when unset
    pub max_output_tokens: Option<u32>,
}

impl RagSettings {
    /// Settings taken from the application configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_results: config.rag.max_sources,
            selection_temperature: config.rag.selection_temperature,
            answer_temperature: config.rag.answer_temperature,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

/// A grounded answer and the chunks it was built from.
///
/// `sources` is exactly the selector output, most relevant first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Synthesis {
    pub answer: String,
    pub sources: Vec<Chunk>,
}

/// Structured reply of the selection call.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SelectionReply {
    #[serde(default)]
    pub relevant_document_ids: Vec<String>,
}
