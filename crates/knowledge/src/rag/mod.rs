//! RAG (Retrieval-Augmented Generation) answering.
//!
//! Each turn makes two model calls: the [`RelevanceSelector`] asks the model
//! which pages matter, then the [`AnswerSynthesizer`] asks for an answer
//! grounded in those pages only.

pub mod pipeline;
pub mod select;
pub mod synthesize;
pub mod types;

pub use pipeline::RagPipeline;
pub use select::RelevanceSelector;
pub use synthesize::{build_context, AnswerSynthesizer, GENERATION_FAILED, NO_CONTEXT};
pub use types::{RagSettings, Synthesis};
