//! Ask command handler.
//!
//! Loads the document, answers one question and exits.

use super::{build_conversation, load_document, print_turn};
use clap::Args;
use docchat_core::{config::AppConfig, AppError, AppResult};
use docchat_knowledge::{Rejection, TurnOutcome};

/// Ask a single question about the document
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let conversation = build_conversation(config)?;
        load_document(config, &conversation).await?;

        let turn = match conversation.send_message(&self.question).await {
            TurnOutcome::Answered(turn) => turn,
            TurnOutcome::Rejected(Rejection::EmptyQuery) => {
                return Err(AppError::Config("No question provided".to_string()))
            }
            TurnOutcome::Rejected(Rejection::Busy) => {
                return Err(AppError::Other("The document is still loading".to_string()))
            }
        };

        if self.json {
            let output = serde_json::json!({
                "question": self.question.trim(),
                "answer": turn.content,
                "sources": turn.sources.unwrap_or_default(),
                "provider": config.provider,
                "model": config.model,
                "documents": conversation.document_count(),
                "messages": conversation.messages(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            print_turn(&turn);
        }

        Ok(())
    }
}
