//! Embeddings generation module
//!
//! Generates text embeddings through an external provider:
//! - OpenAI (text-embedding-3-small, text-embedding-ada-002, ...)
//! - Ollama (local models)
//!
//! The embedding model itself is an opaque collaborator; this module only
//! turns text into vectors for the index and for query-time search.

pub mod client;

pub use client::EmbeddingClient;
pub use client::EmbeddingProvider;

use std::str::FromStr;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::errors::WeiboRagError;

/// Maximum batch size for embedding generation
pub const MAX_BATCH_SIZE: usize = 100;

/// Embedding service with dimension validation
pub struct EmbeddingService {
    client: EmbeddingClient,
    dimension: usize,
}

impl EmbeddingService {
    /// Create a service from application config
    pub fn new(config: &AppConfig) -> Result<Self> {
        let provider = EmbeddingProvider::from_str(&config.embeddings.provider)?;
        let client = EmbeddingClient::new(
            provider,
            config.embeddings.model.clone(),
            config.embeddings.endpoint.clone(),
            config.embeddings.api_key.clone(),
        )?;
        Ok(Self {
            client,
            dimension: config.embeddings.dimension,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }

    /// Generate an embedding for a single text
    pub async fn generate(&self, text: &str) -> Result<Vec<f32>> {
        let embedding = self.client.generate(text).await?;
        self.check_dimension(embedding.len())?;
        Ok(embedding)
    }

    /// Generate embeddings for multiple texts
    pub async fn generate_batch(&self, texts: Vec<&str>) -> Result<Vec<Vec<f32>>> {
        let embeddings = self.client.generate_batch(texts).await?;
        for embedding in &embeddings {
            self.check_dimension(embedding.len())?;
        }
        Ok(embeddings)
    }

    fn check_dimension(&self, got: usize) -> Result<()> {
        if got != self.dimension {
            return Err(WeiboRagError::Embedding(format!(
                "provider returned {got}-dimensional embedding, expected {}",
                self.dimension
            )));
        }
        Ok(())
    }
}
