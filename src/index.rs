//! Flat vector index with a post docstore
//!
//! The corpus index is a brute-force cosine-similarity index over the
//! embedded posts, persisted as a single JSON artifact and loaded read-only
//! at process start. Nearest-neighbor search is deterministic: score ties
//! break by insertion order.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::io::BufWriter;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use tracing::info;

use crate::errors::Result;
use crate::errors::WeiboRagError;
use crate::models::Post;
use crate::timestamps::parse_created_at;

/// In-memory flat vector index over the post corpus
#[derive(Debug, Serialize, Deserialize)]
pub struct VectorIndex {
    /// Embedding model the vectors were produced with
    model: String,
    /// Embedding dimension
    dimension: usize,
    posts: Vec<Post>,
    vectors: Vec<Vec<f32>>,
}

impl VectorIndex {
    /// Create an empty index for the given embedding model
    pub fn new(model: impl Into<String>, dimension: usize) -> Self {
        Self {
            model: model.into(),
            dimension,
            posts: Vec::new(),
            vectors: Vec::new(),
        }
    }

    /// Embedding model name recorded at build time
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Embedding dimension recorded at build time
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Add a post with its embedding vector
    pub fn insert(&mut self, post: Post, vector: Vec<f32>) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(WeiboRagError::Index(format!(
                "embedding dimension mismatch: expected {}, got {}",
                self.dimension,
                vector.len()
            )));
        }
        self.posts.push(post);
        self.vectors.push(vector);
        Ok(())
    }

    /// Nearest neighbors to `query` by cosine similarity.
    ///
    /// Returns up to `top_k` (post, similarity) pairs, best first.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<(Post, f32)>> {
        if query.len() != self.dimension {
            return Err(WeiboRagError::Index(format!(
                "query dimension mismatch: expected {}, got {}",
                self.dimension,
                query.len()
            )));
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(idx, v)| (idx, cosine_similarity(query, v)))
            .collect();

        // Ties break by insertion order so results are deterministic
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(idx, score)| (self.posts[idx].clone(), score))
            .collect())
    }

    /// The `n` most recent posts by `created_at`, identity-deduped.
    ///
    /// Posts sharing an identity across near-duplicate timestamp buckets
    /// collapse to their first (most recent) occurrence.
    pub fn most_recent(&self, n: usize) -> Vec<Post> {
        let mut by_time: Vec<&Post> = self.posts.iter().collect();
        by_time.sort_by(|a, b| parse_created_at(b).cmp(&parse_created_at(a)));

        let mut seen = HashSet::new();
        let mut recent = Vec::new();
        for post in by_time {
            if !seen.insert(post.identity()) {
                continue;
            }
            recent.push(post.clone());
            if recent.len() >= n {
                break;
            }
        }
        recent
    }

    /// Persist the index to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        serde_json::to_writer(BufWriter::new(file), self)?;
        info!(
            "Saved vector index with {} posts to {}",
            self.posts.len(),
            path.as_ref().display()
        );
        Ok(())
    }

    /// Load a persisted index
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let index: Self = serde_json::from_reader(BufReader::new(file))?;
        if index.posts.len() != index.vectors.len() {
            return Err(WeiboRagError::Index(format!(
                "corrupt index: {} posts but {} vectors",
                index.posts.len(),
                index.vectors.len()
            )));
        }
        info!(
            "Loaded vector index with {} posts from {}",
            index.posts.len(),
            path.as_ref().display()
        );
        Ok(index)
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
