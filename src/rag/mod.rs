//! RAG (Retrieval-Augmented Generation) module
//!
//! End-to-end question answering over the post corpus:
//! - Recency-intent detection over the question text
//! - Semantic retrieval with an intent-adjusted candidate floor
//! - Identity-based deduplication and recency-descending ranking
//! - Context assembly from the ranked posts
//! - LLM-based answer generation
//!
//! # Examples
//!
//! ```rust,no_run
//! use weiborag::config::AppConfig;
//! use weiborag::rag::RagService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = RagService::new(&config)?;
//!
//!     let response = service.query("他最近在拍什么电视剧？").await?;
//!     println!("Answer: {}", response.answer);
//!     println!("Sources: {} posts", response.sources.len());
//!
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod pipeline;
pub mod ranking;
pub mod retriever;

pub use context::ContextAssembler;
pub use pipeline::RagResponse;
pub use pipeline::RagService;
pub use pipeline::RankedContext;
pub use ranking::RecencyDetector;
pub use retriever::Retriever;

use crate::models::Post;

/// Retrieved post with a relevance score
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub post: Post,
    pub score: f32,
    pub match_type: MatchType,
}

/// How the post entered the candidate pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchType {
    /// Vector similarity match
    Semantic,
    /// Pulled in by the most-recent fetch for a recency question
    Recent,
}
