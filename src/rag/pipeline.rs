//! Complete RAG pipeline: Classify -> Retrieve -> Rank -> Generate

use std::sync::Arc;

use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::config::AppConfig;
use crate::config::RetrievalConfig;
use crate::embeddings::EmbeddingService;
use crate::errors::Result;
use crate::errors::WeiboRagError;
use crate::index::VectorIndex;
use crate::llm::prompts;
use crate::llm::LlmService;
use crate::models::Post;
use crate::rag::ranking;
use crate::rag::ContextAssembler;
use crate::rag::RecencyDetector;
use crate::rag::Retriever;

/// Fixed bilingual reply used when no relevant posts exist
pub const NO_CONTENT_MESSAGE: &str =
    "我没有找到和这个问题相关的微博内容，所以暂时无法回答。(I couldn't find any relevant posts.)";

/// Ranked retrieval outcome.
///
/// A tagged type rather than a sentinel string, so callers cannot mistake
/// the apology text for real content.
#[derive(Debug, Clone, PartialEq)]
pub enum RankedContext {
    /// Ranked posts, newest first, at most `k` of them
    Found(Vec<Post>),
    /// Nothing relevant; the caller should answer with the apology and
    /// skip the completion call
    Empty,
}

/// Complete RAG service
pub struct RagService {
    retriever: Retriever,
    context_assembler: ContextAssembler,
    llm_service: LlmService,
    recency_detector: RecencyDetector,
    retrieval: RetrievalConfig,
    enable_query_rewrite: bool,
}

impl RagService {
    /// Create a new RAG service from config, loading the persisted index.
    ///
    /// # Errors
    /// - Index load errors (missing or corrupt index file)
    /// - Embedding service configuration errors (unknown provider, missing key)
    /// - LLM service configuration errors (missing credential)
    /// - Index / embedding model mismatch
    pub fn new(config: &AppConfig) -> Result<Self> {
        let index = Arc::new(VectorIndex::load(config.index_path())?);
        let embedding_service = Arc::new(EmbeddingService::new(config)?);
        let llm_service = LlmService::new(config)?;
        Self::from_services(config, index, embedding_service, llm_service)
    }

    /// Create from existing services.
    ///
    /// Service capabilities are injected here; the pipeline holds no
    /// ambient singletons.
    pub fn from_services(
        config: &AppConfig,
        index: Arc<VectorIndex>,
        embedding_service: Arc<EmbeddingService>,
        llm_service: LlmService,
    ) -> Result<Self> {
        if index.model() != embedding_service.model() {
            return Err(WeiboRagError::Config(format!(
                "index was built with embedding model '{}' but config uses '{}'",
                index.model(),
                embedding_service.model()
            )));
        }

        let retriever = Retriever::new(index, embedding_service);
        let context_assembler = ContextAssembler::new(config.retrieval.max_context_length);
        let recency_detector = RecencyDetector::new(&config.retrieval.recency_markers)?;

        Ok(Self {
            retriever,
            context_assembler,
            llm_service,
            recency_detector,
            retrieval: config.retrieval.clone(),
            enable_query_rewrite: config.llm.enable_query_rewrite,
        })
    }

    /// Retrieve and rank the context posts for a question.
    ///
    /// Recency intent is classified on the original question text, even
    /// when a rewritten query is used for the similarity search: intent
    /// must reflect what the user asked, not a paraphrase.
    ///
    /// # Errors
    /// - Embedding generation errors
    /// - Index search errors
    ///
    /// Query-rewrite failures never surface; the original question is used.
    pub async fn answer_context(&self, question: &str, k: usize) -> Result<RankedContext> {
        let search_query = self.rewrite_query(question).await;
        let is_recency = self.recency_detector.is_recency_query(question);

        let semantic_k = semantic_candidate_count(is_recency, k, self.retrieval.recency_floor);

        let semantic = self
            .retriever
            .semantic_search(&search_query, semantic_k)
            .await?;
        debug!("semantic candidates: {}", semantic.len());

        let mut candidates: Vec<Post> = semantic.into_iter().map(|r| r.post).collect();

        if is_recency {
            let recent = self.retriever.most_recent(self.retrieval.recent_fetch);
            debug!("recent candidates merged: {}", recent.len());
            candidates.extend(recent.into_iter().map(|r| r.post));
        }

        let ranked = ranking::rank_candidates(candidates, k);
        debug!("final context posts: {}", ranked.len());

        if ranked.is_empty() {
            Ok(RankedContext::Empty)
        } else {
            Ok(RankedContext::Found(ranked))
        }
    }

    /// Answer a question with the configured context budget
    ///
    /// # Errors
    /// - Retrieval errors (embedding generation, index search)
    /// - LLM generation errors (API failures, rate limits)
    pub async fn query(&self, question: &str) -> Result<RagResponse> {
        self.query_with_budget(question, self.retrieval.final_context_cap)
            .await
    }

    /// Answer a question with an explicit context budget `k`
    pub async fn query_with_budget(&self, question: &str, k: usize) -> Result<RagResponse> {
        info!("Processing question: {}", question);

        let ranked = self.answer_context(question, k).await?;

        let posts = match ranked {
            RankedContext::Empty => {
                info!("No relevant posts; answering without the LLM");
                return Ok(RagResponse {
                    answer: NO_CONTENT_MESSAGE.to_string(),
                    sources: Vec::new(),
                    context: String::new(),
                    query: question.to_string(),
                });
            }
            RankedContext::Found(posts) => posts,
        };

        let context = self.context_assembler.assemble(&posts);
        let prompt = prompts::build_qa_prompt(question, &context);
        let answer = self.llm_service.generate(&prompt).await?;

        info!("Question answered with {} context posts", posts.len());

        Ok(RagResponse {
            answer,
            sources: posts,
            context,
            query: question.to_string(),
        })
    }

    /// Best-effort query rewrite; falls back to the original question on
    /// the error variant
    async fn rewrite_query(&self, question: &str) -> String {
        if !self.enable_query_rewrite {
            return question.to_string();
        }
        match self.llm_service.rewrite_query(question).await {
            Ok(rewritten) => {
                debug!("rewrote query '{}' -> '{}'", question, rewritten);
                rewritten
            }
            Err(e) => {
                warn!("query rewrite failed, using original question: {}", e);
                question.to_string()
            }
        }
    }

    /// Get retriever reference
    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Get context assembler reference
    pub fn context_assembler(&self) -> &ContextAssembler {
        &self.context_assembler
    }
}

/// Candidate count for the semantic search.
///
/// Recency questions widen the pool to the configured floor before recency
/// re-ranking, trading extra retrieval cost for a higher chance that the
/// true most-recent post is in it.
pub fn semantic_candidate_count(is_recency: bool, k: usize, recency_floor: usize) -> usize {
    if is_recency {
        std::cmp::max(k, recency_floor)
    } else {
        k
    }
}

/// RAG response
#[derive(Debug, Clone)]
pub struct RagResponse {
    pub answer: String,
    pub sources: Vec<Post>,
    pub context: String,
    pub query: String,
}

impl RagResponse {
    /// Get a formatted string representation
    #[must_use]
    pub fn format(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("Question: {}\n\n", self.query));
        output.push_str(&format!("Answer:\n{}\n\n", self.answer));
        output.push_str(&format!("Sources ({} posts):\n", self.sources.len()));

        for (idx, post) in self.sources.iter().enumerate() {
            output.push_str(&format!(
                "  {}. [{}] {}\n",
                idx + 1,
                post.created_at.as_deref().unwrap_or("Unknown time"),
                crate::rag::context::truncate_str(&post.content_zh, 60)
            ));
        }

        output
    }
}
