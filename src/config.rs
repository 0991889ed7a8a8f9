use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub backtrace: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    /// Embedding provider: "openai" or "ollama"
    pub provider: String,
    pub model: String,
    pub dimension: usize,
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub endpoint: String,
    pub api_key: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    /// Rewrite the user question into a denser search query before retrieval.
    /// Best-effort: a failed rewrite falls back to the original question.
    #[serde(default)]
    pub enable_query_rewrite: bool,
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> usize {
    600
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Path of the persisted vector index file
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Maximum number of posts passed to the LLM (the context budget)
    #[serde(default = "default_final_context_cap")]
    pub final_context_cap: usize,
    /// Minimum semantic candidate count for recency questions
    #[serde(default = "default_recency_floor")]
    pub recency_floor: usize,
    /// How many most-recent posts to merge in for recency questions
    #[serde(default = "default_recent_fetch")]
    pub recent_fetch: usize,
    /// Maximum formatted context length in characters
    #[serde(default = "default_max_context_length")]
    pub max_context_length: usize,
    /// Case-insensitive markers that flag a question as recency-oriented
    #[serde(default = "default_recency_markers")]
    pub recency_markers: Vec<String>,
}

fn default_final_context_cap() -> usize {
    5
}

fn default_recency_floor() -> usize {
    15
}

fn default_recent_fetch() -> usize {
    8
}

fn default_max_context_length() -> usize {
    8000
}

fn default_recency_markers() -> Vec<String> {
    [
        r"\brecent\b",
        r"\blatest\b",
        r"\bnewest\b",
        "最近",
        "最新",
        "近况",
        "近期",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            final_context_cap: default_final_context_cap(),
            recency_floor: default_recency_floor(),
            recent_fetch: default_recent_fetch(),
            max_context_length: default_max_context_length(),
            recency_markers: default_recency_markers(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Year assumed for Weibo display timestamps that carry no year
    #[serde(default)]
    pub default_year: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub embeddings: EmbeddingsConfig,
    pub llm: LlmConfig,
    pub index: IndexConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default config file path
    pub fn load() -> crate::Result<Self> {
        // Try to load from config.toml first, then fall back to config.example.toml
        if Path::new("config.toml").exists() {
            Self::from_file("config.toml")
        } else if Path::new("config.example.toml").exists() {
            println!(
                "Warning: Using config.example.toml. Please create config.toml for production use."
            );
            Self::from_file("config.example.toml")
        } else {
            Err(crate::WeiboRagError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "No config file found. Please create config.toml or config.example.toml",
            )))
        }
    }

    /// Validate that the configuration can serve requests.
    ///
    /// A missing LLM credential is fatal at startup, before any question is
    /// accepted.
    pub fn validate(&self) -> crate::Result<()> {
        if self.llm.api_key.trim().is_empty() {
            return Err(crate::WeiboRagError::Config(
                "llm.api_key is not set".to_string(),
            ));
        }
        if self.embeddings.provider == "openai"
            && self
                .embeddings
                .api_key
                .as_deref()
                .map_or(true, |k| k.trim().is_empty())
        {
            return Err(crate::WeiboRagError::Config(
                "embeddings.api_key is required for the openai provider".to_string(),
            ));
        }
        Ok(())
    }

    /// Get LLM endpoint
    pub fn llm_endpoint(&self) -> &str {
        &self.llm.endpoint
    }

    /// Get LLM model
    pub fn llm_model(&self) -> &str {
        &self.llm.model
    }

    /// Get embedding model name
    pub fn embedding_model(&self) -> &str {
        &self.embeddings.model
    }

    /// Get embedding dimension
    pub fn embedding_dimension(&self) -> usize {
        self.embeddings.dimension
    }

    /// Get vector index path
    pub fn index_path(&self) -> &str {
        &self.index.path
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                backtrace: true,
            },
            embeddings: EmbeddingsConfig {
                provider: "openai".to_string(),
                model: "text-embedding-3-small".to_string(),
                dimension: 1536,
                endpoint: "https://api.openai.com/v1".to_string(),
                api_key: None,
            },
            llm: LlmConfig {
                endpoint: "https://api.openai.com/v1".to_string(),
                api_key: String::new(),
                model: default_llm_model(),
                temperature: default_temperature(),
                max_tokens: default_max_tokens(),
                enable_query_rewrite: false,
            },
            index: IndexConfig {
                path: "weibo_index.json".to_string(),
            },
            retrieval: RetrievalConfig::default(),
            ingest: IngestConfig::default(),
        }
    }
}
