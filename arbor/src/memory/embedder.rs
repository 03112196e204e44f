//! Embedder trait for the vector stores. Produces vectors from text for add
//! and search.
//!
//! Implementations can wrap OpenAI or mock embedders for tests. The
//! embedding model is an external oracle; this crate only consumes it
//! through this boundary.

use async_trait::async_trait;

use crate::memory::store::StoreError;

/// Produces fixed-size float vectors from text. Used by the vector stores
/// for embedding record text on add and query text on search.
///
/// Implementations must be `Send + Sync` for use with async store methods.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embeds each text into a vector of dimension [`Embedder::dimension`].
    /// Returns one vector per input text in the same order.
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, StoreError>;

    /// Vector dimension returned by [`Embedder::embed`].
    fn dimension(&self) -> usize;
}
