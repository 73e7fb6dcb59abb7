//! Conversation orchestration.
//!
//! Holds the session state shown to the user: the document store, the turn
//! history and whether work is in flight. At most one model round-trip runs
//! at a time; a query arriving meanwhile is rejected without touching the
//! history.

use crate::rag::RagPipeline;
use crate::store::DocumentStore;
use crate::types::{Chunk, Turn};
use docchat_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Reply appended when a query arrives with nothing ingested.
pub const EMPTY_KNOWLEDGE_BASE: &str =
    "The knowledge base is not loaded. Please ensure the document is available and restart the session.";

/// Lifecycle of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Uninitialized,
    Ingesting,
    Ready,
    Answering,
    Failed,
}

impl Phase {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Ingesting => "ingesting",
            Self::Ready => "ready",
            Self::Answering => "answering",
            Self::Failed => "failed",
        }
    }
}

/// Why a query was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Blank or whitespace-only input
    EmptyQuery,
    /// Ingestion or another answer is still running
    Busy,
}

/// Result of [`Conversation::send_message`].
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// The query was accepted; this is the model turn appended for it.
    Answered(Turn),
    /// Nothing was appended and nothing was sent.
    Rejected(Rejection),
}

struct State {
    phase: Phase,
    store: DocumentStore,
    messages: Vec<Turn>,
}

struct Inner {
    pipeline: RagPipeline,
    state: Mutex<State>,
}

/// A single-document chat session. Clones share the same session.
#[derive(Clone)]
pub struct Conversation {
    inner: Arc<Inner>,
}

impl Conversation {
    pub fn new(pipeline: RagPipeline) -> Self {
        Self {
            inner: Arc::new(Inner {
                pipeline,
                state: Mutex::new(State {
                    phase: Phase::Uninitialized,
                    store: DocumentStore::default(),
                    messages: Vec::new(),
                }),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Populate the document store from `ingestion`.
    ///
    /// Appends a greeting on success or an explanatory turn on failure; the
    /// ingestion error is also returned to the caller. Only valid once, from
    /// [`Phase::Uninitialized`].
    pub async fn initialize<F>(&self, title: &str, ingestion: F) -> AppResult<usize>
    where
        F: Future<Output = AppResult<Vec<Chunk>>>,
    {
        {
            let mut state = self.state();
            if state.phase != Phase::Uninitialized {
                return Err(AppError::Other(format!(
                    "Conversation is already {}",
                    state.phase.as_str()
                )));
            }
            state.phase = Phase::Ingesting;
        }

        let guard = PhaseGuard {
            conversation: self,
            from: Phase::Ingesting,
            to: Phase::Failed,
        };

        tracing::info!("Loading knowledge base for '{}'", title);
        let result = ingestion.await;

        let mut state = self.state();
        let outcome = match result {
            Ok(chunks) => {
                let count = chunks.len();
                state.store = DocumentStore::new(chunks);
                state.phase = Phase::Ready;
                state.messages.push(Turn::model(format!(
                    "Hello! I have loaded \"{}\". You can now ask me any questions about its content.",
                    title
                )));
                tracing::info!("Knowledge base ready with {} chunks", count);
                Ok(count)
            }
            Err(e) => {
                tracing::error!("Failed to load document '{}': {}", title, e);
                state.phase = Phase::Failed;
                state.messages.push(Turn::model(format!(
                    "Sorry, I encountered an error while loading the document: {}. Please try restarting the session.",
                    e
                )));
                Err(e)
            }
        };
        drop(state);
        drop(guard);

        outcome
    }

    /// Handle one user query.
    ///
    /// An accepted query appends the user turn and then exactly one model
    /// turn, whatever happens in between. Errors become the content of that
    /// model turn.
    pub async fn send_message(&self, query: &str) -> TurnOutcome {
        if query.trim().is_empty() {
            return TurnOutcome::Rejected(Rejection::EmptyQuery);
        }

        let chunks = {
            let mut state = self.state();
            if matches!(state.phase, Phase::Ingesting | Phase::Answering) {
                tracing::debug!("Rejecting query while {}", state.phase.as_str());
                return TurnOutcome::Rejected(Rejection::Busy);
            }

            state.messages.push(Turn::user(query));

            if state.store.is_empty() {
                let turn = Turn::model(EMPTY_KNOWLEDGE_BASE);
                state.messages.push(turn.clone());
                return TurnOutcome::Answered(turn);
            }

            state.phase = Phase::Answering;
            state.store.snapshot()
        };

        let guard = PhaseGuard {
            conversation: self,
            from: Phase::Answering,
            to: Phase::Ready,
        };

        let turn = match self.inner.pipeline.answer(query, &chunks).await {
            Ok(synthesis) => Turn::answer(synthesis.answer, synthesis.sources),
            Err(e) => {
                tracing::error!("Turn failed: {}", e);
                Turn::model(format!("Sorry, I encountered an error: {}", e))
            }
        };

        self.state().messages.push(turn.clone());
        drop(guard);

        TurnOutcome::Answered(turn)
    }

    /// Conversation history in display order.
    pub fn messages(&self) -> Vec<Turn> {
        self.state().messages.clone()
    }

    /// Whether ingestion or an answer is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self.phase(), Phase::Ingesting | Phase::Answering)
    }

    pub fn phase(&self) -> Phase {
        self.state().phase
    }

    /// Number of chunks in the document store.
    pub fn document_count(&self) -> usize {
        self.state().store.len()
    }

    /// Current document store snapshot.
    pub fn store(&self) -> DocumentStore {
        self.state().store.clone()
    }
}

/// Moves the phase on when dropped, including when the owning future is
/// abandoned mid-await.
struct PhaseGuard<'a> {
    conversation: &'a Conversation,
    from: Phase,
    to: Phase,
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.conversation.state();
        if state.phase == self.from {
            state.phase = self.to;
        }
    }
}
