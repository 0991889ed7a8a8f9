//! WeiboRAG: bilingual retrieval-augmented question answering over Weibo posts
//!
//! The core is a retrieval-and-ranking pipeline: recency-intent detection
//! over the question, semantic search with an intent-adjusted candidate
//! floor, identity-based deduplication, a recency-descending sort, and
//! truncation to a context budget, followed by context formatting and LLM
//! answer generation.

pub mod config;
pub mod embeddings;
pub mod errors;
pub mod index;
pub mod ingest;
pub mod llm;
pub mod logging;
pub mod models;
pub mod rag;
pub mod timestamps;

#[cfg(test)]
pub mod tests;

pub use config::AppConfig;
pub use errors::*;
pub use models::Post;
