//! LLM completion module
//!
//! Client for an OpenAI-compatible chat completions endpoint. Used twice by
//! the pipeline: best-effort query rewriting before retrieval, and final
//! answer generation from the assembled context. No retries are attempted
//! beyond the request timeout; the caller decides what a failure means.

pub mod client;
pub mod prompts;

pub use client::LlmService;
