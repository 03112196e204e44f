//! Memory record types for the long-term store.
//!
//! Two kinds: whole conversation turns and extracted facts. Records are
//! serde round-trippable so the store can persist them as JSON and the CLI
//! can export them.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// What a memory record holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryKind {
    /// One user/assistant exchange.
    Conversation,
    /// A standalone fact extracted from user input.
    Fact,
}

/// One long-term memory: searchable text plus metadata.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MemoryRecord {
    /// Unique id, assigned at creation.
    pub id: Uuid,
    pub kind: MemoryKind,
    /// The text that gets embedded and searched.
    pub text: String,
    /// Fact category (e.g. "extracted", "personal_info"); None for conversations.
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MemoryRecord {
    /// Creates a conversation record from one exchange.
    pub fn conversation(user_message: &str, assistant_response: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: MemoryKind::Conversation,
            text: format!("User: {}\nAssistant: {}", user_message, assistant_response),
            category: None,
            created_at: Utc::now(),
        }
    }

    /// Creates a fact record.
    pub fn fact(fact: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: MemoryKind::Fact,
            text: fact.into(),
            category: Some(category.into()),
            created_at: Utc::now(),
        }
    }
}
