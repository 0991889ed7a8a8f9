//! Corpus build: processed-posts CSV -> embedded, persisted vector index
//!
//! The input CSV is the output of the (external) preprocessing step and
//! carries the original Chinese text, its English translation, the raw
//! Weibo timestamp, and display metadata. Timestamps are normalized here,
//! once, at ingest; retrieval never re-parses raw time strings.

use std::path::Path;

use csv::StringRecord;
use tracing::info;
use tracing::warn;

use crate::embeddings::EmbeddingService;
use crate::embeddings::MAX_BATCH_SIZE;
use crate::errors::Result;
use crate::index::VectorIndex;
use crate::models::Post;
use crate::timestamps::normalize_create_time;

/// Read a processed-posts CSV into `Post` records.
///
/// Rows with empty Chinese content are skipped. Missing or malformed
/// fields degrade to `None`, never to an error; only I/O and CSV framing
/// problems fail the build.
pub fn posts_from_csv<P: AsRef<Path>>(path: P, default_year: Option<i32>) -> Result<Vec<Post>> {
    info!("Loading processed posts from: {}", path.as_ref().display());

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path.as_ref())?;
    let headers = reader.headers()?.clone();

    let mut posts = Vec::new();
    let mut skipped = 0usize;

    for record in reader.records() {
        let record = record?;

        let Some(content_zh) = field(&headers, &record, "content") else {
            skipped += 1;
            continue;
        };
        let content_en = field(&headers, &record, "content_en").unwrap_or_default();

        // Supports either column name for the raw timestamp
        let raw_time = field(&headers, &record, "create_time")
            .or_else(|| field(&headers, &record, "created_at"));
        let created_at =
            raw_time.and_then(|raw| normalize_create_time(&raw, None, default_year));

        posts.push(Post {
            post_id: field(&headers, &record, "weibo_id"),
            content_zh,
            content_en,
            created_at,
            like_count: count_field(&headers, &record, "like_num"),
            comment_count: count_field(&headers, &record, "comment_num"),
            repost_count: count_field(&headers, &record, "repost_num"),
            has_image: field(&headers, &record, "raw_img").is_some(),
            has_video: field(&headers, &record, "video_link").is_some(),
        });
    }

    if skipped > 0 {
        warn!("Skipped {skipped} rows with empty content");
    }
    info!("Converted {} rows into posts", posts.len());

    Ok(posts)
}

/// Embed posts in batches and build the vector index
pub async fn build_index(
    posts: Vec<Post>,
    embedding_service: &EmbeddingService,
) -> Result<VectorIndex> {
    let mut index = VectorIndex::new(
        embedding_service.model().to_string(),
        embedding_service.dimension(),
    );

    info!("Embedding {} posts...", posts.len());
    for chunk in posts.chunks(MAX_BATCH_SIZE) {
        let texts: Vec<String> = chunk.iter().map(Post::embedding_text).collect();
        let vectors = embedding_service
            .generate_batch(texts.iter().map(String::as_str).collect())
            .await?;

        for (post, vector) in chunk.iter().zip(vectors) {
            index.insert(post.clone(), vector)?;
        }
    }

    info!("Built vector index with {} posts", index.len());
    Ok(index)
}

fn field(headers: &StringRecord, record: &StringRecord, name: &str) -> Option<String> {
    let idx = headers.iter().position(|h| h == name)?;
    let value = record.get(idx)?.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("nan") {
        return None;
    }
    Some(value.to_string())
}

fn count_field(headers: &StringRecord, record: &StringRecord, name: &str) -> Option<i64> {
    field(headers, record, name).and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_posts_from_csv() {
        let file = write_csv(
            "weibo_id,content,content_en,create_time,like_num,comment_num,repost_num,raw_img,video_link\n\
             5001,晚上好,Good evening,11月02日 10:30,120,30,5,img.jpg,\n\
             5002,新剧官宣,New drama announced,2025-06-01 09:00:00,nan,12,,,video.mp4\n",
        );

        let posts = posts_from_csv(file.path(), Some(2025)).unwrap();
        assert_eq!(posts.len(), 2);

        assert_eq!(posts[0].post_id.as_deref(), Some("5001"));
        assert_eq!(posts[0].created_at.as_deref(), Some("2025-11-02 10:30:00"));
        assert_eq!(posts[0].like_count, Some(120));
        assert!(posts[0].has_image);
        assert!(!posts[0].has_video);

        assert_eq!(posts[1].created_at.as_deref(), Some("2025-06-01 09:00:00"));
        assert_eq!(posts[1].like_count, None);
        assert_eq!(posts[1].repost_count, None);
        assert!(!posts[1].has_image);
        assert!(posts[1].has_video);
    }

    #[test]
    fn test_rows_with_empty_content_are_skipped() {
        let file = write_csv(
            "weibo_id,content,content_en,create_time\n\
             5001,,empty row,2025-06-01 09:00:00\n\
             5002,有内容,has content,2025-06-01 09:00:00\n",
        );

        let posts = posts_from_csv(file.path(), None).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].content_zh, "有内容");
    }

    #[test]
    fn test_unparseable_timestamp_degrades_to_none() {
        let file = write_csv(
            "weibo_id,content,create_time\n\
             5001,内容,三天前\n",
        );

        let posts = posts_from_csv(file.path(), Some(2025)).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].created_at, None);
    }
}
