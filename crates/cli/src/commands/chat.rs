//! Chat command handler.
//!
//! Interactive loop over stdin. Lines starting with `/` are commands; anything
//! else is a question.

use super::{build_conversation, load_document, print_turn};
use clap::Args;
use docchat_core::{config::AppConfig, AppResult};
use docchat_knowledge::{Conversation, Rejection, Role, TurnOutcome};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Chat about the document interactively
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Write the conversation as JSON to this file on exit
    #[arg(long)]
    pub transcript: Option<PathBuf>,
}

/// What one input line asks for.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Quit,
    Sources,
    Help,
    Unknown(&'a str),
    Blank,
    Question(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    let line = line.trim();
    match line {
        "" => Input::Blank,
        "/quit" | "/exit" => Input::Quit,
        "/sources" => Input::Sources,
        "/help" => Input::Help,
        command if command.starts_with('/') => Input::Unknown(command),
        question => Input::Question(question),
    }
}

impl ChatCommand {
    /// Execute the chat command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let conversation = build_conversation(config)?;

        println!("Loading {} ...", config.document_title());
        if let Err(e) = load_document(config, &conversation).await {
            // the failure is already part of the conversation
            tracing::debug!("Continuing without a document: {}", e);
        }
        for turn in conversation.messages() {
            print_turn(&turn);
        }
        println!("Type a question, /sources for the last answer's pages, /quit to leave.");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            match parse_input(&line) {
                Input::Quit => break,
                Input::Blank => continue,
                Input::Help => {
                    println!("/sources  pages cited by the last answer");
                    println!("/quit     leave the chat");
                }
                Input::Sources => print_last_sources(&conversation),
                Input::Unknown(command) => println!("Unknown command: {}", command),
                Input::Question(question) => match conversation.send_message(question).await {
                    TurnOutcome::Answered(turn) => print_turn(&turn),
                    TurnOutcome::Rejected(Rejection::Busy) => {
                        println!("Still working on the previous question.")
                    }
                    TurnOutcome::Rejected(Rejection::EmptyQuery) => {}
                },
            }
        }

        if let Some(ref path) = self.transcript {
            let transcript = serde_json::to_string_pretty(&conversation.messages())?;
            std::fs::write(path, transcript)?;
            tracing::info!("Transcript written to {:?}", path);
        }

        Ok(())
    }
}

fn print_last_sources(conversation: &Conversation) {
    let last = conversation
        .messages()
        .into_iter()
        .rev()
        .find(|turn| turn.role == Role::Model && turn.sources.is_some());

    match last.and_then(|turn| turn.sources) {
        Some(sources) if !sources.is_empty() => {
            for source in sources {
                println!("{}\n  {}", source.label(), source.content);
            }
        }
        _ => println!("The last answer did not cite any pages."),
    }
}
