//! Pure unit tests (no network required)
//!
//! These tests verify the retrieval-and-ranking properties end to end over
//! the in-memory index, without touching the embedding or completion
//! services.

#[cfg(test)]
mod unit_tests {
    use crate::config::RetrievalConfig;
    use crate::index::VectorIndex;
    use crate::models::Post;
    use crate::rag::ranking::rank_candidates;
    use crate::rag::RecencyDetector;
    use crate::timestamps::parse_created_at;

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

    // ====== Recency merge tests ======

    #[test]
    fn test_recency_merge_rescues_most_recent_post() {
        // A corpus where the single most-recent post is semantically distant:
        // its vector points away from the query, so it misses the top-k
        // semantic matches, but the most-recent fetch must rescue it.
        let mut index = VectorIndex::new("test-model", 2);
        for i in 0..5 {
            let created = format!("2025-01-0{} 10:00:00", i + 1);
            index
                .insert(post(&format!("sem{i}"), Some(&created)), vec![1.0, 0.0])
                .unwrap();
        }
        index
            .insert(post("freshest", Some("2025-06-01 10:00:00")), vec![0.0, 1.0])
            .unwrap();

        let k = 3;
        let semantic: Vec<Post> = index
            .search(&[1.0, 0.0], k)
            .unwrap()
            .into_iter()
            .map(|(p, _)| p)
            .collect();
        assert!(semantic.iter().all(|p| p.post_id.as_deref() != Some("freshest")));

        let mut candidates = semantic;
        candidates.extend(index.most_recent(8));

        let ranked = rank_candidates(candidates, k);
        assert_eq!(ranked[0].post_id.as_deref(), Some("freshest"));
        assert!(ranked.len() <= k);
    }

    #[test]
    fn test_merge_dedupes_overlapping_candidates() {
        // Posts in both the semantic pool and the recent fetch appear once
        let semantic = vec![
            post("a", Some("2025-03-01 10:00:00")),
            post("b", Some("2025-02-01 10:00:00")),
        ];
        let recent = vec![
            post("a", Some("2025-03-01 10:00:00")),
            post("c", Some("2025-04-01 10:00:00")),
        ];

        let mut candidates = semantic;
        candidates.extend(recent);
        let ranked = rank_candidates(candidates, 10);

        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].post_id.as_deref(), Some("c"));
        assert_eq!(ranked[1].post_id.as_deref(), Some("a"));
        assert_eq!(ranked[2].post_id.as_deref(), Some("b"));
    }

    #[test]
    fn test_ranked_output_is_sorted_and_bounded() {
        let candidates: Vec<Post> = (0..20)
            .map(|i| {
                let created = format!("2025-01-{:02} 10:00:00", (i % 15) + 1);
                post(&i.to_string(), Some(&created))
            })
            .collect();

        let k = 5;
        let ranked = rank_candidates(candidates, k);
        assert!(ranked.len() <= k);
        for pair in ranked.windows(2) {
            assert!(parse_created_at(&pair[0]) >= parse_created_at(&pair[1]));
        }
    }

    // ====== Semantic floor tests ======

    #[test]
    fn test_semantic_floor_widens_recency_questions() {
        use crate::rag::pipeline::semantic_candidate_count;

        let retrieval = RetrievalConfig::default();
        let detector = RecencyDetector::new(&retrieval.recency_markers).unwrap();

        let k = 5;
        let floor = retrieval.recency_floor;
        let recency_k =
            |q: &str| semantic_candidate_count(detector.is_recency_query(q), k, floor);

        assert_eq!(recency_k("他最近在做什么"), floor);
        assert_eq!(recency_k("他喜欢什么食物"), k);
        // A budget already above the floor is not shrunk
        assert_eq!(
            semantic_candidate_count(true, floor + 5, floor),
            floor + 5
        );
    }

    // ====== Error display tests ======

    #[test]
    fn test_custom_error() {
        use crate::errors::WeiboRagError;

        let error = WeiboRagError::Custom("Test error".to_string());
        let display = format!("{error}");
        assert!(display.contains("Test error"));
    }

    #[test]
    fn test_config_error() {
        use crate::errors::WeiboRagError;

        let error = WeiboRagError::Config("llm.api_key is not set".to_string());
        let display = format!("{error}");
        assert!(display.contains("Configuration error"));
        assert!(display.contains("llm.api_key"));
    }
}
