//! Pure ranking core: recency-intent detection, identity dedup, and the
//! merge/sort/truncate step that orders candidates before formatting.

use std::collections::HashSet;

use regex::RegexSet;

use crate::errors::Result;
use crate::errors::WeiboRagError;
use crate::models::Post;
use crate::timestamps::parse_created_at;

/// Detects whether a question asks about recent posts.
///
/// The marker table is configuration, not hardcoded branches, so it can be
/// extended without touching pipeline code.
pub struct RecencyDetector {
    patterns: RegexSet,
}

impl RecencyDetector {
    /// Compile a detector from a marker pattern table
    pub fn new(markers: &[String]) -> Result<Self> {
        let case_insensitive: Vec<String> =
            markers.iter().map(|m| format!("(?i){m}")).collect();
        let patterns = RegexSet::new(&case_insensitive)
            .map_err(|e| WeiboRagError::Config(format!("invalid recency marker: {e}")))?;
        Ok(Self { patterns })
    }

    /// True when the question signals interest in the most recent posts.
    ///
    /// Pure function over the question text; one pass over the pattern set.
    pub fn is_recency_query(&self, text: &str) -> bool {
        self.patterns.is_match(text)
    }
}

/// Drop posts whose identity was already seen, keeping first occurrences
/// in input order.
pub fn dedupe_posts(posts: Vec<Post>) -> Vec<Post> {
    let mut seen = HashSet::new();
    posts
        .into_iter()
        .filter(|post| seen.insert(post.identity()))
        .collect()
}

/// Rank merged candidates: dedupe, sort by `created_at` descending, and
/// truncate to the context budget.
///
/// The sort is stable with no secondary key, so ties keep their prior
/// relative order; sentinel-time posts (missing or unparseable timestamps)
/// sort last.
pub fn rank_candidates(candidates: Vec<Post>, k: usize) -> Vec<Post> {
    let mut posts = dedupe_posts(candidates);
    posts.sort_by(|a, b| parse_created_at(b).cmp(&parse_created_at(a)));
    posts.truncate(k);
    posts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetrievalConfig;

    fn detector() -> RecencyDetector {
        RecencyDetector::new(&RetrievalConfig::default().recency_markers).unwrap()
    }

    fn post(id: &str, created_at: Option<&str>) -> Post {
        Post {
            post_id: Some(id.to_string()),
            content_zh: format!("微博 {id}"),
            content_en: format!("post {id}"),
            created_at: created_at.map(ToString::to_string),
            like_count: None,
            comment_count: None,
            repost_count: None,
            has_image: false,
            has_video: false,
        }
    }

    #[test]
    fn test_recency_query_chinese() {
        let d = detector();
        assert!(d.is_recency_query("最近他拍了什么电视剧"));
        assert!(d.is_recency_query("他的近况怎么样"));
        assert!(d.is_recency_query("近期有什么活动"));
        assert!(!d.is_recency_query("他喜欢什么食物"));
    }

    #[test]
    fn test_recency_query_english() {
        let d = detector();
        assert!(d.is_recency_query("What is his latest drama?"));
        assert!(d.is_recency_query("Any RECENT posts about food?"));
        assert!(d.is_recency_query("show me the newest post"));
        assert!(!d.is_recency_query("What food does he like?"));
    }

    #[test]
    fn test_recency_markers_are_word_bounded_in_english() {
        let d = detector();
        // \brecent\b must not fire inside an unrelated word
        assert!(!d.is_recency_query("He decently answered"));
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let a = post("a", Some("2025-01-01 10:00:00"));
        let b = post("b", Some("2025-01-02 10:00:00"));
        let a_again = post("a", Some("2025-01-03 10:00:00"));

        let deduped = dedupe_posts(vec![a.clone(), b.clone(), a_again]);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].created_at, a.created_at);
        assert_eq!(deduped[1].post_id, b.post_id);
    }

    #[test]
    fn test_rank_sorts_descending_and_truncates() {
        let candidates = vec![
            post("old", Some("2024-05-01 09:00:00")),
            post("new", Some("2025-06-01 09:00:00")),
            post("mid", Some("2025-01-01 09:00:00")),
        ];
        let ranked = rank_candidates(candidates, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].post_id.as_deref(), Some("new"));
        assert_eq!(ranked[1].post_id.as_deref(), Some("mid"));
    }

    #[test]
    fn test_rank_sentinel_times_sort_last() {
        let candidates = vec![
            post("dateless", None),
            post("dated", Some("2025-01-01 09:00:00")),
        ];
        let ranked = rank_candidates(candidates, 10);
        assert_eq!(ranked[0].post_id.as_deref(), Some("dated"));
        assert_eq!(ranked[1].post_id.as_deref(), Some("dateless"));
    }

    #[test]
    fn test_rank_is_stable_on_ties() {
        let first = post("first", Some("2025-01-01 09:00:00"));
        let second = post("second", Some("2025-01-01 09:00:00"));
        let ranked = rank_candidates(vec![first, second], 10);
        assert_eq!(ranked[0].post_id.as_deref(), Some("first"));
        assert_eq!(ranked[1].post_id.as_deref(), Some("second"));
    }

    #[test]
    fn test_rank_under_full_corpus_returns_everything() {
        let candidates = vec![
            post("a", Some("2025-01-01 09:00:00")),
            post("b", Some("2025-02-01 09:00:00")),
        ];
        let ranked = rank_candidates(candidates, 5);
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn test_rank_with_zero_budget_is_empty() {
        let ranked = rank_candidates(vec![post("a", None)], 0);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_rank_output_is_non_increasing_by_time() {
        let candidates = vec![
            post("c", Some("2023-01-01 00:00:00")),
            post("a", Some("2025-01-01 00:00:00")),
            post("nodate", None),
            post("b", Some("2024-01-01 00:00:00")),
        ];
        let ranked = rank_candidates(candidates, 10);
        for pair in ranked.windows(2) {
            assert!(parse_created_at(&pair[0]) >= parse_created_at(&pair[1]));
        }
    }
}
