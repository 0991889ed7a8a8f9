//! Integration tests: CSV ingest through index persistence and ranking,
//! with no external services involved.

use std::io::Write;

use weiborag::index::VectorIndex;
use weiborag::ingest;
use weiborag::models::Post;
use weiborag::rag::ranking::rank_candidates;

fn write_csv(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_csv_to_ranked_context() {
    let csv = write_csv(
        "weibo_id,content,content_en,create_time,like_num\n\
         1,开机大吉,Filming starts,2025-03-01 09:00:00,100\n\
         2,杀青了,Wrapped filming,11月02日 10:30 来自iPhone客户端,200\n\
         3,晚安,Good night,nan,50\n",
    );

    let posts = ingest::posts_from_csv(csv.path(), Some(2025)).unwrap();
    assert_eq!(posts.len(), 3);

    // Build an index with handcrafted vectors standing in for embeddings
    let mut index = VectorIndex::new("test-model", 2);
    let vectors = [[1.0, 0.0], [0.9, 0.1], [0.0, 1.0]];
    for (post, vector) in posts.iter().zip(vectors) {
        index.insert(post.clone(), vector.to_vec()).unwrap();
    }

    // Persist and reload, then run a search over the reloaded index
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.json");
    index.save(&path).unwrap();
    let index = VectorIndex::load(&path).unwrap();

    let semantic: Vec<Post> = index
        .search(&[1.0, 0.0], 2)
        .unwrap()
        .into_iter()
        .map(|(p, _)| p)
        .collect();
    assert_eq!(semantic[0].post_id.as_deref(), Some("1"));

    // Merge with the most-recent fetch and rank; the normalized display
    // timestamp (November) outranks the March ISO one, and the nan-time
    // post sorts last
    let mut candidates = semantic;
    candidates.extend(index.most_recent(8));
    let ranked = rank_candidates(candidates, 3);

    assert_eq!(ranked.len(), 3);
    assert_eq!(ranked[0].post_id.as_deref(), Some("2"));
    assert_eq!(ranked[0].created_at.as_deref(), Some("2025-11-02 10:30:00"));
    assert_eq!(ranked[1].post_id.as_deref(), Some("1"));
    assert_eq!(ranked[2].post_id.as_deref(), Some("3"));
    assert_eq!(ranked[2].created_at, None);
}

#[test]
fn test_empty_corpus_yields_empty_ranking() {
    let index = VectorIndex::new("test-model", 2);
    let results = index.search(&[1.0, 0.0], 5).unwrap();
    assert!(results.is_empty());
    assert!(rank_candidates(Vec::new(), 5).is_empty());
    assert!(index.most_recent(8).is_empty());
}
