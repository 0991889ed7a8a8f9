//! Context assembly from ranked posts

use std::fmt::Write as _;

use crate::models::Post;

/// Assembler that renders ranked posts into the context block handed to
/// the LLM
pub struct ContextAssembler {
    max_context_length: usize,
}

impl ContextAssembler {
    /// Create a new context assembler
    #[must_use]
    pub const fn new(max_context_length: usize) -> Self {
        Self { max_context_length }
    }

    /// Assemble the context string from ranked posts.
    ///
    /// Each post renders as a 1-indexed block with its timestamp and
    /// engagement counters (placeholders for missing fields), followed by
    /// the bilingual text. Assembly stops once the length cap would be
    /// exceeded. Pure and side-effect free.
    #[must_use]
    pub fn assemble(&self, posts: &[Post]) -> String {
        let mut context = String::new();
        let mut total_length = 0;

        for (idx, post) in posts.iter().enumerate() {
            let entry = format!(
                "[Post {} | time={} | likes={} | comments={} | reposts={}]\n{}\n",
                idx + 1,
                post.created_at.as_deref().unwrap_or("Unknown time"),
                count_or_na(post.like_count),
                count_or_na(post.comment_count),
                count_or_na(post.repost_count),
                post.embedding_text()
            );

            // The blank-line separator counts against the cap too
            let separator_len = usize::from(!context.is_empty());
            if total_length + separator_len + entry.len() > self.max_context_length {
                break;
            }

            if !context.is_empty() {
                context.push('\n');
            }
            context.push_str(&entry);
            total_length += separator_len + entry.len();
        }

        context
    }

    /// Create a short human-readable summary of the ranked posts
    #[must_use]
    pub fn create_summary(&self, posts: &[Post]) -> String {
        if posts.is_empty() {
            return "No posts found.".to_string();
        }

        let mut summary = format!("Found {} relevant post(s):\n\n", posts.len());
        for (idx, post) in posts.iter().enumerate().take(5) {
            let preview = truncate_str(&post.content_zh, 60);
            let _ = writeln!(
                summary,
                "{}. [{}] {}",
                idx + 1,
                post.created_at.as_deref().unwrap_or("Unknown time"),
                preview
            );
        }
        summary
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new(8000)
    }
}

fn count_or_na(count: Option<i64>) -> String {
    count.map_or_else(|| "N/A".to_string(), |n| n.to_string())
}

/// Truncate a string to at most `max_chars` characters, appending an
/// ellipsis when shortened
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}
