//! Single-document question answering.
//!
//! A PDF is ingested into an in-memory [`DocumentStore`] of page chunks. Each
//! question goes through the [`RagPipeline`]: the model first picks relevant
//! pages, then answers from those pages only. [`Conversation`] sequences the
//! turns and keeps the history.

pub mod conversation;
pub mod ingest;
pub mod parser;
pub mod rag;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use conversation::{Conversation, Phase, Rejection, TurnOutcome, EMPTY_KNOWLEDGE_BASE};
pub use ingest::{Ingested, Ingestor};
pub use parser::{LopdfExtractor, PageSource, TextExtractor};
pub use rag::{AnswerSynthesizer, RagPipeline, RagSettings, RelevanceSelector, Synthesis};
pub use store::DocumentStore;
pub use types::{chunk_id, Chunk, IngestStats, Role, Turn};
