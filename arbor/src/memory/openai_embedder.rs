//! OpenAI Embeddings implementation of [`Embedder`].
//!
//! Uses the Embeddings API to generate vectors from text. Supports models
//! like `text-embedding-3-small`, `text-embedding-3-large`, and
//! `text-embedding-ada-002`. Requires `OPENAI_API_KEY` (or custom config).

use async_openai::{
    config::OpenAIConfig,
    types::embeddings::{CreateEmbeddingRequest, EmbeddingInput},
    Client,
};

use crate::memory::store::StoreError;

/// OpenAI Embeddings client implementing [`Embedder`].
///
/// Default model is `text-embedding-3-small` (1536 dimensions).
pub struct OpenAIEmbedder {
    config: OpenAIConfig,
    model: String,
    dimensions: usize,
}

impl OpenAIEmbedder {
    /// Creates an embedder with the given model; API key from `OPENAI_API_KEY`.
    pub fn new(model: impl Into<String>) -> Self {
        let model = model.into();
        let dimensions = Self::model_dimensions(&model);
        Self {
            config: OpenAIConfig::new(),
            model,
            dimensions,
        }
    }

    /// Creates an embedder with custom configuration (key, base URL).
    pub fn with_config(config: OpenAIConfig, model: impl Into<String>) -> Self {
        let model = model.into();
        let dimensions = Self::model_dimensions(&model);
        Self {
            config,
            model,
            dimensions,
        }
    }

    /// Vector dimension for a model name; unknown models assume 1536.
    fn model_dimensions(model: &str) -> usize {
        match model {
            "text-embedding-3-large" => 3072,
            "text-embedding-3-small" | "text-embedding-ada-002" => 1536,
            _ => 1536,
        }
    }
}

#[async_trait::async_trait]
impl crate::memory::Embedder for OpenAIEmbedder {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, StoreError> {
        let inputs: Vec<String> = texts.iter().map(|&s| s.to_string()).collect();
        let input = if inputs.len() == 1 {
            EmbeddingInput::String(inputs.into_iter().next().unwrap_or_default())
        } else {
            EmbeddingInput::StringArray(inputs)
        };

        let request = CreateEmbeddingRequest {
            input,
            model: self.model.clone(),
            ..Default::default()
        };

        let client = Client::with_config(self.config.clone());
        let response = client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| StoreError::Embedding(format!("OpenAI API error: {}", e)))?;

        Ok(response.data.into_iter().map(|e| e.embedding).collect())
    }

    fn dimension(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Embedder;

    #[test]
    fn model_dimensions_known_and_unknown() {
        assert_eq!(OpenAIEmbedder::model_dimensions("text-embedding-3-small"), 1536);
        assert_eq!(OpenAIEmbedder::model_dimensions("text-embedding-3-large"), 3072);
        assert_eq!(OpenAIEmbedder::model_dimensions("text-embedding-ada-002"), 1536);
        assert_eq!(OpenAIEmbedder::model_dimensions("unknown-model"), 1536);
    }

    #[test]
    fn embedder_creation_sets_dimension() {
        let embedder = OpenAIEmbedder::new("text-embedding-3-small");
        assert_eq!(embedder.dimension(), 1536);
        let embedder = OpenAIEmbedder::new("text-embedding-3-large");
        assert_eq!(embedder.dimension(), 3072);
    }

    #[test]
    fn embedder_with_custom_config() {
        let config = OpenAIConfig::new().with_api_key("test-key");
        let embedder = OpenAIEmbedder::with_config(config, "text-embedding-3-small");
        assert_eq!(embedder.dimension(), 1536);
    }

    #[tokio::test]
    #[ignore = "Requires OPENAI_API_KEY"]
    async fn embed_against_real_api() {
        std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY must be set for this test");

        let embedder = OpenAIEmbedder::new("text-embedding-3-small");
        let vectors = embedder.embed(&["Hello, world!"]).await.unwrap();
        assert_eq!(vectors.len(), 1);
        assert_eq!(vectors[0].len(), 1536);
    }

    #[tokio::test]
    async fn embed_returns_error_on_unreachable_base() {
        let config = OpenAIConfig::new()
            .with_api_key("test-key")
            .with_api_base("https://127.0.0.1:1");
        let embedder = OpenAIEmbedder::with_config(config, "text-embedding-3-small");
        let err = embedder.embed(&["hello"]).await.unwrap_err();
        assert!(matches!(err, StoreError::Embedding(_)));
    }
}
