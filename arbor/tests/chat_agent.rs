//! Integration tests for the chat agent over the public crate API.
//!
//! The agent runs against the mock LLM and the in-memory vector store; the
//! interesting behavior is what crosses the memory boundary between turns
//! and between agent sessions sharing one store.

use std::sync::Arc;

use arbor::llm::MockLlm;
use arbor::memory::{Embedder, InMemoryVectorStore, MemoryKind, MemoryStore, StoreError};
use arbor::prompts::default_from_embedded;
use arbor::ChatAgent;
use async_trait::async_trait;

struct MockEmbedder;

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, StoreError> {
        Ok(texts
            .iter()
            .map(|t| {
                let mut v = vec![0f32; 32];
                for (i, b) in t.bytes().enumerate() {
                    v[i % 32] += b as f32 / 256.0;
                }
                v
            })
            .collect())
    }

    fn dimension(&self) -> usize {
        32
    }
}

fn shared_store() -> Arc<dyn MemoryStore> {
    Arc::new(InMemoryVectorStore::new(Arc::new(MockEmbedder)))
}

/// Facts extracted in one session are retrievable by a second agent over
/// the same store — the long-term tier outlives the session.
#[tokio::test]
async fn facts_survive_across_sessions() {
    let store = shared_store();

    let mut first = ChatAgent::new(
        Arc::new(MockLlm::with_reply("nice to meet you")),
        store.clone(),
        default_from_embedded(),
        5,
        3,
    );
    first.chat("my name is Sam and I like climbing").await;

    // New session, fresh buffer, same store.
    let second = ChatAgent::new(
        Arc::new(MockLlm::with_reply("hello again")),
        store.clone(),
        default_from_embedded(),
        5,
        3,
    );
    let stats = second.memory_stats().await;
    assert_eq!(stats.short_term, 0);
    assert!(stats.long_term >= 3, "conversation + two facts expected");

    let facts = store
        .search("name", 10, Some(MemoryKind::Fact))
        .await
        .unwrap();
    assert!(facts
        .iter()
        .any(|f| f.record.text == "User's name is Sam"));
}

/// The short-term window caps buffered turns while the store keeps growing.
#[tokio::test]
async fn window_caps_short_term_only() {
    let mut agent = ChatAgent::new(
        Arc::new(MockLlm::with_reply("ok")),
        shared_store(),
        default_from_embedded(),
        2,
        3,
    );
    for i in 0..4 {
        agent.chat(&format!("message {}", i)).await;
    }

    let stats = agent.memory_stats().await;
    assert_eq!(stats.short_term, 2);
    assert_eq!(stats.long_term, 4);
}

/// Exported memories serialize to JSON and back.
#[tokio::test]
async fn export_roundtrips_through_json() {
    let mut agent = ChatAgent::new(
        Arc::new(MockLlm::with_reply("ok")),
        shared_store(),
        default_from_embedded(),
        5,
        3,
    );
    agent.chat("I live in Oslo").await;

    let records = agent.export_memories().await.unwrap();
    assert!(records.len() >= 2);

    let json = serde_json::to_string_pretty(&records).unwrap();
    let back: Vec<arbor::MemoryRecord> = serde_json::from_str(&json).unwrap();
    assert_eq!(back.len(), records.len());
}
