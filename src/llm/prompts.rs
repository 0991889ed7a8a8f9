//! Prompt builders for answer generation and query rewriting

/// Build the bilingual QA prompt from the user question and the formatted
/// post context
pub fn build_qa_prompt(question: &str, context: &str) -> String {
    format!(
        r#"You are a bilingual assistant (Chinese and English) answering questions about a Chinese actor's Weibo posts.

You are given some Weibo posts (each has Chinese and English text).
Use ONLY this content to answer the user's question.
If the information is not in these posts, say you don't know instead of guessing.

/* User question (may be Chinese or English): */
{question}

/* Relevant Weibo posts: */
{context}

/* Instructions:
- If the question is in Chinese, answer in Chinese.
- If the question is in English, answer in English.
- Base your answer ONLY on the posts above.
- If there is not enough information, say that honestly.
- If the question contains words related to time like "latest", "recent", "最近", "最新", or "new drama",
  pay special attention to posts with the most recent timestamps.
*/

Answer:"#
    )
}

/// Build the query-rewrite prompt.
///
/// The rewrite condenses a conversational question into retrieval keywords;
/// the answer language of the original question must be preserved.
pub fn build_rewrite_prompt(question: &str) -> String {
    format!(
        r"Rewrite the following question as a short, dense search query for retrieving Weibo posts.
Keep the original language (Chinese stays Chinese, English stays English).
Return ONLY the rewritten query, nothing else.

Question: {question}

Search query:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qa_prompt_contains_question_and_context() {
        let prompt = build_qa_prompt("最近有什么新剧？", "[Post 1 | ...]");
        assert!(prompt.contains("最近有什么新剧？"));
        assert!(prompt.contains("[Post 1 | ...]"));
        assert!(prompt.ends_with("Answer:"));
    }

    #[test]
    fn test_rewrite_prompt_contains_question() {
        let prompt = build_rewrite_prompt("What did he post about his latest drama?");
        assert!(prompt.contains("latest drama"));
    }
}
