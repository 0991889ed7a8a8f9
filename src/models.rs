use serde::Deserialize;
use serde::Serialize;

/// Number of content characters used by the fallback identity key
const IDENTITY_PREFIX_CHARS: usize = 50;

/// A single retrievable Weibo post.
///
/// Posts are built once at ingest time and never mutated afterwards;
/// retrieval only re-orders references to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Externally assigned Weibo id, when the source row carried one
    pub post_id: Option<String>,
    /// Original Chinese text
    pub content_zh: String,
    /// English translation produced at preprocessing time
    pub content_en: String,
    /// Canonical `YYYY-MM-DD HH:MM:SS` timestamp, `None` when unparseable
    pub created_at: Option<String>,
    /// Display-only engagement counters, never used in ranking
    pub like_count: Option<i64>,
    pub comment_count: Option<i64>,
    pub repost_count: Option<i64>,
    /// Display-only media flags
    pub has_image: bool,
    pub has_video: bool,
}

/// Stable identity used for deduplication.
///
/// Prefers the externally assigned post id. The fallback composite of
/// (normalized timestamp, content prefix) can collide for distinct short
/// posts published in the same minute; that over-merge is an accepted risk.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PostIdentity {
    Id(String),
    Fallback(String, String),
}

impl Post {
    /// Combined bilingual text, the form that gets embedded and shown to
    /// the LLM
    pub fn embedding_text(&self) -> String {
        format!("Chinese: {}\nEnglish: {}", self.content_zh, self.content_en)
    }

    /// Deterministic identity key, stable across corpus rebuilds from the
    /// same source row
    pub fn identity(&self) -> PostIdentity {
        match &self.post_id {
            Some(id) if !id.is_empty() => PostIdentity::Id(id.clone()),
            _ => {
                let prefix: String = self
                    .embedding_text()
                    .chars()
                    .take(IDENTITY_PREFIX_CHARS)
                    .collect();
                PostIdentity::Fallback(self.created_at.clone().unwrap_or_default(), prefix)
            }
        }
    }
}
