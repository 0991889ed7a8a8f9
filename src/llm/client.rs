//! Chat completion client

use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::errors::WeiboRagError;
use crate::llm::prompts;

/// Client for an OpenAI-compatible chat completions API
pub struct LlmService {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
}

impl LlmService {
    /// Create a new LLM service from application config
    pub fn new(config: &AppConfig) -> Result<Self> {
        if config.llm.api_key.trim().is_empty() {
            return Err(WeiboRagError::Config("llm.api_key is not set".to_string()));
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|e| WeiboRagError::Http(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.llm.endpoint.clone(),
            api_key: config.llm.api_key.clone(),
            model: config.llm.model.clone(),
            temperature: config.llm.temperature,
            max_tokens: config.llm.max_tokens,
        })
    }

    /// Generate a completion with the configured parameters
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_params(prompt, self.temperature, self.max_tokens)
            .await
    }

    /// Generate a completion with explicit parameters
    pub async fn generate_with_params(
        &self,
        prompt: &str,
        temperature: f32,
        max_tokens: usize,
    ) -> Result<String> {
        #[derive(Serialize)]
        struct ChatRequest<'a> {
            model: &'a str,
            messages: Vec<ChatMessage<'a>>,
            temperature: f32,
            max_tokens: usize,
        }

        #[derive(Serialize)]
        struct ChatMessage<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: ResponseMessage,
        }

        #[derive(Deserialize)]
        struct ResponseMessage {
            content: String,
        }

        let url = format!("{}/chat/completions", self.endpoint);
        debug!("Calling chat completions API: {}", url);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature,
            max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| WeiboRagError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(WeiboRagError::Llm(format!(
                "Chat API error ({status}): {error_text}"
            )));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| WeiboRagError::Llm(format!("Failed to parse response: {e}")))?;

        result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| WeiboRagError::Llm("No choices in response".to_string()))
    }

    /// Rewrite a user question into a denser retrieval query.
    ///
    /// Returns an error on any service failure or empty output; the caller
    /// decides whether to fall back to the original question.
    pub async fn rewrite_query(&self, question: &str) -> Result<String> {
        let prompt = prompts::build_rewrite_prompt(question);
        // Low temperature so the rewrite stays close to the question
        let rewritten = self.generate_with_params(&prompt, 0.2, 100).await?;
        let rewritten = rewritten.trim().trim_matches('"').to_string();
        if rewritten.is_empty() {
            return Err(WeiboRagError::Llm("Empty query rewrite".to_string()));
        }
        Ok(rewritten)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_is_fatal() {
        let config = AppConfig::default();
        assert!(matches!(
            LlmService::new(&config),
            Err(WeiboRagError::Config(_))
        ));
    }

    #[tokio::test]
    #[ignore = "Requires API key"]
    async fn test_generate() {
        let mut config = AppConfig::default();
        config.llm.api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
        let service = LlmService::new(&config).unwrap();
        let answer = service.generate("Say hello in Chinese.").await.unwrap();
        assert!(!answer.is_empty());
    }
}
