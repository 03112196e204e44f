//! MemoryStore trait and StoreError for the long-term memory tier.
//!
//! The store holds [`MemoryRecord`]s and retrieves them by semantic
//! similarity. Backends: [`InMemoryVectorStore`](crate::memory::InMemoryVectorStore)
//! (dev/tests) and [`SqliteVecStore`](crate::memory::SqliteVecStore)
//! (persistent). Both embed record text through an
//! [`Embedder`](crate::memory::Embedder); the embedding model itself is an
//! external service behind that trait.

use async_trait::async_trait;
use uuid::Uuid;

use crate::memory::record::{MemoryKind, MemoryRecord};

/// Error for store operations.
///
/// Callers do not depend on underlying backend errors (e.g. rusqlite); the
/// message is opaque to avoid leaking backend types.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// JSON serialization/deserialization failed.
    #[error("serialization: {0}")]
    Serialization(String),

    /// Backend storage error (e.g. DB I/O).
    #[error("storage: {0}")]
    Storage(String),

    /// Embedding generation error (e.g. embeddings API error).
    #[error("embedding: {0}")]
    Embedding(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// A record returned from a similarity search, with its score.
#[derive(Debug, Clone)]
pub struct RecalledMemory {
    pub record: MemoryRecord,
    /// Similarity score; `None` when the backend returned the record
    /// without ranking (e.g. recency listing).
    pub score: Option<f64>,
}

/// Long-term memory store: add, semantically search, and manage records.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Stores one record (embedding its text). Returns the record id.
    async fn add(&self, record: MemoryRecord) -> Result<Uuid, StoreError>;

    /// Returns up to `limit` records most similar to `query`, best first.
    /// `kind` filters to one record kind when set.
    async fn search(
        &self,
        query: &str,
        limit: usize,
        kind: Option<MemoryKind>,
    ) -> Result<Vec<RecalledMemory>, StoreError>;

    /// Returns up to `n` most recent records, newest first.
    async fn recent(&self, n: usize) -> Result<Vec<MemoryRecord>, StoreError>;

    /// Deletes a record by id. Returns whether a record was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Removes all records.
    async fn clear(&self) -> Result<(), StoreError>;

    /// Number of stored records.
    async fn count(&self) -> Result<usize, StoreError>;

    /// Returns every record (for JSON export), newest first.
    async fn export(&self) -> Result<Vec<MemoryRecord>, StoreError>;
}
