//! In-memory vector store for semantic search.
//!
//! Uses embeddings for similarity ranking. Not persistent: all data is lost
//! when the store is dropped. This is the dev/test tier and the default
//! when no database path is configured.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::memory::embedder::Embedder;
use crate::memory::record::{MemoryKind, MemoryRecord};
use crate::memory::store::{MemoryStore, RecalledMemory, StoreError};

/// Pure in-memory vector store for semantic search.
///
/// Used as `Arc<dyn MemoryStore>`; safe for cross-task use.
pub struct InMemoryVectorStore {
    data: DashMap<Uuid, Entry>,
    embedder: Arc<dyn Embedder>,
}

struct Entry {
    record: MemoryRecord,
    vector: Vec<f32>,
}

impl InMemoryVectorStore {
    /// Creates a new in-memory vector store over the given embedder.
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            data: DashMap::new(),
            embedder,
        }
    }

    /// Computes cosine similarity between two vectors.
    ///
    /// Returns 0.0 if either vector has zero magnitude.
    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            0.0
        } else {
            dot_product / (norm_a * norm_b)
        }
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, StoreError> {
        let vectors = self.embedder.embed(&[text]).await?;
        vectors
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Embedding("no vector returned".into()))
    }
}

#[async_trait]
impl MemoryStore for InMemoryVectorStore {
    async fn add(&self, record: MemoryRecord) -> Result<Uuid, StoreError> {
        let vector = self.embed_one(&record.text).await?;
        let id = record.id;
        self.data.insert(id, Entry { record, vector });
        Ok(id)
    }

    async fn search(
        &self,
        query: &str,
        limit: usize,
        kind: Option<MemoryKind>,
    ) -> Result<Vec<RecalledMemory>, StoreError> {
        if self.data.is_empty() {
            return Ok(Vec::new());
        }
        let query_vec = self.embed_one(query).await?;

        let mut hits: Vec<RecalledMemory> = self
            .data
            .iter()
            .filter(|e| kind.map_or(true, |k| e.record.kind == k))
            .map(|e| RecalledMemory {
                record: e.record.clone(),
                score: Some(Self::cosine_similarity(&query_vec, &e.vector) as f64),
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .unwrap_or(0.0)
                .total_cmp(&a.score.unwrap_or(0.0))
        });
        hits.truncate(limit);
        Ok(hits)
    }

    async fn recent(&self, n: usize) -> Result<Vec<MemoryRecord>, StoreError> {
        let mut records: Vec<MemoryRecord> =
            self.data.iter().map(|e| e.record.clone()).collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.truncate(n);
        Ok(records)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.data.remove(&id).is_some())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.data.clear();
        Ok(())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.data.len())
    }

    async fn export(&self) -> Result<Vec<MemoryRecord>, StoreError> {
        self.recent(usize::MAX).await
    }
}
