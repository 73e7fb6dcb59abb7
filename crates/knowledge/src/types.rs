//! Core types for the document store and the conversation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One page of extracted text, the unit of retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    /// Stable id derived from title and page (see [`chunk_id`])
    pub id: String,

    /// Title of the source document
    pub title: String,

    /// Page text, fragments joined with single spaces
    pub content: String,

    /// 1-indexed page number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
}

impl Chunk {
    /// Create a chunk for one page of `title`.
    pub fn page(title: &str, page: u32, content: impl Into<String>) -> Self {
        Self {
            id: chunk_id(title, page),
            title: title.to_string(),
            content: content.into(),
            page_number: Some(page),
        }
    }

    /// Length of the page text in characters.
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    /// Citation label, e.g. `Guide (Page 3)`.
    pub fn label(&self) -> String {
        match self.page_number {
            Some(page) => format!("{} (Page {})", self.title, page),
            None => self.title.clone(),
        }
    }
}

/// Deterministic chunk id for a page: re-ingesting the same file yields the same ids.
pub fn chunk_id(title: &str, page: u32) -> String {
    format!("pdf-{}-page-{}", title, page)
}

/// Statistics from one ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestStats {
    /// Pages reported by the extractor
    pub pages_seen: u32,

    /// Pages kept as chunks (non-blank)
    pub chunks_kept: u32,

    /// Size of the raw document
    pub bytes: u64,

    /// Wall-clock duration of the extraction
    pub duration_secs: f64,
}

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

/// One message in the conversation history. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    pub role: Role,
    pub content: String,

    /// Chunks the answer was grounded on (model turns only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Chunk>>,

    pub created_at: DateTime<Utc>,
}

impl Turn {
    /// A user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            sources: None,
            created_at: Utc::now(),
        }
    }

    /// A model message without sources.
    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            content: content.into(),
            sources: None,
            created_at: Utc::now(),
        }
    }

    /// A model answer together with the chunks it cites.
    pub fn answer(content: impl Into<String>, sources: Vec<Chunk>) -> Self {
        Self {
            sources: Some(sources),
            ..Self::model(content)
        }
    }
}
