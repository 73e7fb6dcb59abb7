//! Whole-session behaviour: ingestion, both model calls and the history.

use super::support::{pipeline, selection, PagedText};
use crate::conversation::{Conversation, Phase, Rejection, TurnOutcome, EMPTY_KNOWLEDGE_BASE};
use crate::ingest::Ingestor;
use crate::parser::tests::build_pdf;
use crate::parser::LopdfExtractor;
use crate::rag::{GENERATION_FAILED, NO_CONTEXT};
use crate::types::Role;
use docchat_llm::MockClient;
use std::sync::Arc;

async fn ready_conversation(client: &Arc<MockClient>, pages: &[&[&str]]) -> Conversation {
    let ingestor = Ingestor::new(Arc::new(PagedText::new(pages)));
    let conversation = Conversation::new(pipeline(client));
    conversation
        .initialize("Guide", async move {
            ingestor.ingest("Guide", b"").await.map(|i| i.chunks)
        })
        .await
        .unwrap();
    conversation
}

#[tokio::test]
async fn test_deadline_scenario_with_real_pdf() {
    let pdf = build_pdf(&[&["Admission deadline is May 1."], &[]]);
    let ingestor = Ingestor::new(Arc::new(LopdfExtractor::new()));

    let client = Arc::new(MockClient::new());
    client
        .push_text(selection(&["pdf-Guide-page-1"]))
        .push_text("The admission deadline is May 1. (Page 1)");

    let conversation = Conversation::new(pipeline(&client));
    conversation
        .initialize("Guide", async move {
            ingestor.ingest("Guide", &pdf).await.map(|i| i.chunks)
        })
        .await
        .unwrap();

    let store = conversation.store();
    assert_eq!(store.len(), 1);
    assert_eq!(store.chunks()[0].page_number, Some(1));

    let outcome = conversation.send_message("When is the deadline?").await;
    let TurnOutcome::Answered(turn) = outcome else {
        panic!("query should be accepted");
    };

    assert_eq!(turn.role, Role::Model);
    assert!(turn.content.contains("May 1"));
    assert!(turn.content.contains("(Page 1)"));
    let sources = turn.sources.unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].id, "pdf-Guide-page-1");

    let messages = conversation.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].role, Role::User);
    assert_eq!(messages[1].content, "When is the deadline?");
    assert_eq!(conversation.phase(), Phase::Ready);
}

#[tokio::test]
async fn test_empty_store_short_circuits() {
    let client = Arc::new(MockClient::new());
    let conversation = Conversation::new(pipeline(&client));

    let outcome = conversation.send_message("What is the deadline?").await;

    assert_eq!(client.call_count(), 0);
    let messages = conversation.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[1].role, Role::Model);
    assert_eq!(messages[1].content, EMPTY_KNOWLEDGE_BASE);
    assert_eq!(outcome, TurnOutcome::Answered(messages[1].clone()));
}

#[tokio::test]
async fn test_failed_ingestion_short_circuits() {
    let client = Arc::new(MockClient::new());
    let ingestor = Ingestor::new(Arc::new(PagedText::failing("Failed to parse PDF: bad header")));
    let conversation = Conversation::new(pipeline(&client));
    let loaded = conversation
        .initialize("Guide", async move {
            ingestor.ingest("Guide", b"").await.map(|i| i.chunks)
        })
        .await;
    assert!(loaded.is_err());

    conversation.send_message("Anything?").await;

    assert_eq!(conversation.phase(), Phase::Failed);
    assert_eq!(client.call_count(), 0);
    let contents: Vec<String> = conversation.messages().into_iter().map(|t| t.content).collect();
    assert_eq!(contents.len(), 3);
    assert!(contents[0].contains("Failed to parse PDF: bad header"));
    assert_eq!(contents[2], EMPTY_KNOWLEDGE_BASE);
}

#[tokio::test]
async fn test_selection_failure_still_answers() {
    let client = Arc::new(MockClient::new());
    client
        .push_failure("connection reset by peer")
        .push_text("I don't have enough information in my knowledge base to answer.");

    let conversation = ready_conversation(&client, &[&["Fees are due in June."]]).await;
    let outcome = conversation.send_message("Who is the dean?").await;

    let TurnOutcome::Answered(turn) = outcome else {
        panic!("query should be accepted");
    };
    assert!(turn.content.contains("don't have enough information"));
    assert_eq!(turn.sources, Some(Vec::new()));
    assert!(client.requests()[1].prompt.contains(NO_CONTEXT));
    assert_eq!(conversation.messages().len(), 3);
    assert_eq!(conversation.phase(), Phase::Ready);
}

#[tokio::test]
async fn test_generation_failure_is_generic_turn() {
    let client = Arc::new(MockClient::new());
    client
        .push_text(selection(&["pdf-Guide-page-1"]))
        .push_failure("429 Too Many Requests: quota exceeded for project 42");

    let conversation = ready_conversation(&client, &[&["Fees are due in June."]]).await;
    let TurnOutcome::Answered(turn) = conversation.send_message("When?").await else {
        panic!("query should be accepted");
    };

    assert_eq!(turn.content, format!("Sorry, I encountered an error: {}", GENERATION_FAILED));
    assert!(!turn.content.contains("429"));
    assert!(turn.sources.is_none());
    assert_eq!(conversation.phase(), Phase::Ready);
}

#[tokio::test]
async fn test_missing_credential_is_verbatim() {
    let client = Arc::new(MockClient::without_credentials("API_KEY"));
    let conversation = ready_conversation(&client, &[&["Fees are due in June."]]).await;

    let TurnOutcome::Answered(turn) = conversation.send_message("When?").await else {
        panic!("query should be accepted");
    };

    assert!(turn.content.contains("API_KEY environment variable not set."));
    assert!(!turn.content.contains(GENERATION_FAILED));
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_second_query_rejected_while_in_flight() {
    let client = Arc::new(MockClient::gated());
    client
        .push_text(selection(&["pdf-Guide-page-1"]))
        .push_text("June. (Page 1)");

    let conversation = ready_conversation(&client, &[&["Fees are due in June."]]).await;

    let first = {
        let conversation = conversation.clone();
        tokio::spawn(async move { conversation.send_message("When are fees due?").await })
    };
    while conversation.phase() != Phase::Answering {
        tokio::task::yield_now().await;
    }
    assert!(conversation.is_loading());

    let second = conversation.send_message("And the deadline?").await;
    assert_eq!(second, TurnOutcome::Rejected(Rejection::Busy));
    assert_eq!(conversation.messages().len(), 2);

    client.release(2);
    let first = first.await.unwrap();
    assert!(matches!(first, TurnOutcome::Answered(_)));

    assert_eq!(client.call_count(), 2);
    let roles: Vec<Role> = conversation.messages().iter().map(|t| t.role).collect();
    assert_eq!(roles, vec![Role::Model, Role::User, Role::Model]);
    assert!(!conversation.is_loading());

    // accepted again once the first turn is appended
    client.push_text(selection(&[])).push_text("No idea.");
    client.release(2);
    let third = conversation.send_message("And the deadline?").await;
    assert!(matches!(third, TurnOutcome::Answered(_)));
    assert_eq!(conversation.messages().len(), 5);
}

#[tokio::test]
async fn test_query_rejected_while_ingesting() {
    let client = Arc::new(MockClient::new());
    let conversation = Conversation::new(pipeline(&client));
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let loading = {
        let conversation = conversation.clone();
        tokio::spawn(async move {
            conversation
                .initialize("Guide", async move {
                    let _ = rx.await;
                    Ok(vec![crate::types::Chunk::page("Guide", 1, "x")])
                })
                .await
        })
    };
    while conversation.phase() != Phase::Ingesting {
        tokio::task::yield_now().await;
    }

    assert!(conversation.is_loading());
    assert_eq!(
        conversation.send_message("early").await,
        TurnOutcome::Rejected(Rejection::Busy)
    );
    assert!(conversation.messages().is_empty());

    tx.send(()).unwrap();
    loading.await.unwrap().unwrap();
    assert_eq!(conversation.phase(), Phase::Ready);
    assert_eq!(client.call_count(), 0);
}
