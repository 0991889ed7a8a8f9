//! Retrieval against the vector index

use std::sync::Arc;

use tracing::debug;

use crate::embeddings::EmbeddingService;
use crate::errors::Result;
use crate::index::VectorIndex;
use crate::rag::MatchType;
use crate::rag::SearchResult;

/// Retriever over the read-only corpus index
pub struct Retriever {
    index: Arc<VectorIndex>,
    embedding_service: Arc<EmbeddingService>,
}

impl Retriever {
    /// Create a new retriever
    pub fn new(index: Arc<VectorIndex>, embedding_service: Arc<EmbeddingService>) -> Self {
        Self {
            index,
            embedding_service,
        }
    }

    /// Number of posts in the corpus
    pub fn corpus_size(&self) -> usize {
        self.index.len()
    }

    /// Semantic search for the `limit` nearest posts to the query
    pub async fn semantic_search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        debug!("Performing semantic search: {}", query);

        if limit == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedding_service.generate(query).await?;
        let matches = self.index.search(&query_embedding, limit)?;

        let results = matches
            .into_iter()
            .map(|(post, score)| SearchResult {
                post,
                score,
                match_type: MatchType::Semantic,
            })
            .collect();

        Ok(results)
    }

    /// The `n` most recent posts, identity-deduped during the fetch
    pub fn most_recent(&self, n: usize) -> Vec<SearchResult> {
        self.index
            .most_recent(n)
            .into_iter()
            .map(|post| SearchResult {
                post,
                score: 0.0,
                match_type: MatchType::Recent,
            })
            .collect()
    }
}
