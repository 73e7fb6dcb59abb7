//! In-memory document store.

use crate::types::Chunk;
use std::sync::Arc;

/// Immutable snapshot of the ingested chunks, in page order.
///
/// Cloning is cheap. Ingestion replaces the whole store; nothing is updated in
/// place.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    chunks: Arc<[Chunk]>,
}

impl DocumentStore {
    /// Create a store from freshly ingested chunks.
    pub fn new(chunks: Vec<Chunk>) -> Self {
        Self {
            chunks: chunks.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Look up a chunk by id.
    pub fn get(&self, id: &str) -> Option<&Chunk> {
        self.chunks.iter().find(|chunk| chunk.id == id)
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Shared handle to the chunks, usable after the store is replaced.
    pub fn snapshot(&self) -> Arc<[Chunk]> {
        Arc::clone(&self.chunks)
    }

    /// Total characters of page text, the size of one selection prompt.
    pub fn total_chars(&self) -> usize {
        self.chunks.iter().map(Chunk::char_count).sum()
    }
}
