//! Command handlers for the docchat CLI.
//!
//! This module organizes all CLI commands into separate submodules, plus the
//! session setup they share.

pub mod ask;
pub mod chat;
pub mod pages;
pub mod prompts;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use pages::PagesCommand;
pub use prompts::PromptsCommand;

use docchat_core::{config::AppConfig, AppResult};
use docchat_knowledge::{Conversation, Ingestor, LopdfExtractor, RagPipeline, Role, Turn};
use docchat_llm::{create_client, ClientOptions};
use std::sync::Arc;

/// Ingestor with the PDF extractor initialised once for the process.
pub fn ingestor(config: &AppConfig) -> AppResult<Ingestor> {
    Ingestor::new(Arc::new(LopdfExtractor::new())).with_timeout(config.timeout_secs)
}

/// Conversation wired to the configured provider and prompts.
pub fn build_conversation(config: &AppConfig) -> AppResult<Conversation> {
    let options = ClientOptions::new(&config.provider)
        .with_api_key(config.api_key.clone(), &config.api_key_env)
        .with_endpoint(config.endpoint.clone())
        .with_timeout(config.timeout_secs);
    let client = create_client(&options)?;
    let pipeline = RagPipeline::from_config(config, client)?;
    Ok(Conversation::new(pipeline))
}

/// Ingest the configured document into `conversation`.
pub async fn load_document(config: &AppConfig, conversation: &Conversation) -> AppResult<usize> {
    let title = config.document_title();
    let source = config.resolved_source();
    let ingestor = ingestor(config)?;

    conversation
        .initialize(&title, async {
            ingestor.load(&title, &source).await.map(|ingested| ingested.chunks)
        })
        .await
}

/// Print one turn, with its sources as `<title> (Page N)`.
pub fn print_turn(turn: &Turn) {
    let speaker = match turn.role {
        Role::User => "You",
        Role::Model => "docchat",
    };
    println!("{}: {}", speaker, turn.content);

    if let Some(ref sources) = turn.sources {
        if !sources.is_empty() {
            println!("Sources:");
            for source in sources {
                println!("  - {}", source.label());
            }
        }
    }
    println!();
}
