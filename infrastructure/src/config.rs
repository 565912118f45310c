use dotenvy::dotenv;
use shared::error::{AssistantError, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Stream tokens over SSE as they are generated.
    pub stream: bool,
}

#[derive(Debug, Clone)]
pub struct EmbeddingSettings {
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct ToolSettings {
    pub api_key: String,
    pub search_base_url: String,
    pub reader_base_url: String,
    pub engine: Option<String>,
    pub retain_images: Option<String>,
    pub search_token_budget: Option<usize>,
    pub search_max_tokens: usize,
    pub reader_token_budget: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct RagSettings {
    pub document_path: PathBuf,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EarlyStopping {
    /// Ask the model for a best-effort answer from the steps so far.
    Generate,
    /// Give up with `AssistantError::BudgetExceeded`.
    Force,
}

impl FromStr for EarlyStopping {
    type Err = AssistantError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generate" => Ok(EarlyStopping::Generate),
            "force" => Ok(EarlyStopping::Force),
            other => Err(AssistantError::Config(format!(
                "AGENT_EARLY_STOPPING must be `generate` or `force`, got `{}`",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub max_query_length: usize,
    pub max_iterations: usize,
    pub early_stopping: EarlyStopping,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmSettings,
    pub embedding: EmbeddingSettings,
    pub tools: ToolSettings,
    pub rag: RagSettings,
    pub agent: AgentSettings,
    pub http_timeout: Option<Duration>,
}

impl Config {
    /// Defaults for everything except the two provider secrets.
    pub fn new(groq_api_key: impl Into<String>, jina_api_key: impl Into<String>) -> Self {
        Self {
            llm: LlmSettings {
                api_key: groq_api_key.into(),
                base_url: "https://api.groq.com/openai/v1".to_string(),
                model: "llama-3.3-70b-versatile".to_string(),
                temperature: 0.0,
                max_tokens: 2000,
                stream: false,
            },
            embedding: EmbeddingSettings {
                base_url: "http://localhost:11434".to_string(),
                model: "all-minilm".to_string(),
            },
            tools: ToolSettings {
                api_key: jina_api_key.into(),
                search_base_url: "https://s.jina.ai".to_string(),
                reader_base_url: "https://r.jina.ai".to_string(),
                engine: Some("direct".to_string()),
                retain_images: Some("none".to_string()),
                search_token_budget: None,
                search_max_tokens: 2500,
                reader_token_budget: Some(4000),
            },
            rag: RagSettings {
                document_path: PathBuf::from("./resume.pdf"),
                chunk_size: 512,
                chunk_overlap: 64,
                top_k: 4,
            },
            agent: AgentSettings {
                max_query_length: 200,
                max_iterations: 2,
                early_stopping: EarlyStopping::Generate,
            },
            http_timeout: None,
        }
    }

    /// Read `.env` and the process environment. Missing secrets are fatal.
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build from any variable source; `var` returns `None` for unset keys.
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new(required(&var, "GROQ_API_KEY")?, required(&var, "JINA_API_KEY")?);

        if let Some(v) = var("LLM_BASE_URL") {
            config.llm.base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = var("LLM_MODEL") {
            config.llm.model = v;
        }
        config.llm.temperature = parsed(&var, "LLM_TEMPERATURE", config.llm.temperature)?;
        config.llm.max_tokens = parsed(&var, "LLM_MAX_TOKENS", config.llm.max_tokens)?;
        config.llm.stream = parsed(&var, "LLM_STREAM", config.llm.stream)?;

        if let Some(v) = var("EMBEDDING_BASE_URL") {
            config.embedding.base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = var("EMBEDDING_MODEL") {
            config.embedding.model = v;
        }

        if let Some(v) = var("SEARCH_BASE_URL") {
            config.tools.search_base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = var("READER_BASE_URL") {
            config.tools.reader_base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = var("SEARCH_ENGINE") {
            config.tools.engine = non_empty(v);
        }
        if let Some(v) = var("SEARCH_RETAIN_IMAGES") {
            config.tools.retain_images = non_empty(v);
        }
        config.tools.search_token_budget =
            optional(&var, "SEARCH_TOKEN_BUDGET")?.or(config.tools.search_token_budget);
        config.tools.search_max_tokens =
            parsed(&var, "SEARCH_MAX_TOKENS", config.tools.search_max_tokens)?;
        config.tools.reader_token_budget =
            optional(&var, "READER_TOKEN_BUDGET")?.or(config.tools.reader_token_budget);

        config.http_timeout = optional::<u64, _>(&var, "HTTP_TIMEOUT_SECS")?.map(Duration::from_secs);

        if let Some(v) = var("DOCUMENT_PATH") {
            config.rag.document_path = PathBuf::from(v);
        }
        config.rag.chunk_size = parsed(&var, "CHUNK_SIZE", config.rag.chunk_size)?;
        config.rag.chunk_overlap = parsed(&var, "CHUNK_OVERLAP", config.rag.chunk_overlap)?;
        config.rag.top_k = parsed(&var, "RAG_TOP_K", config.rag.top_k)?;

        config.agent.max_query_length =
            parsed(&var, "MAX_QUERY_LENGTH", config.agent.max_query_length)?;
        config.agent.max_iterations =
            parsed(&var, "AGENT_MAX_ITERATIONS", config.agent.max_iterations)?;
        if let Some(v) = var("AGENT_EARLY_STOPPING") {
            config.agent.early_stopping = v.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.llm.api_key.trim().is_empty() {
            return Err(AssistantError::Config("GROQ_API_KEY is not set".into()));
        }
        if self.tools.api_key.trim().is_empty() {
            return Err(AssistantError::Config("JINA_API_KEY is not set".into()));
        }
        if self.rag.chunk_size == 0 {
            return Err(AssistantError::Config("CHUNK_SIZE must be positive".into()));
        }
        if self.rag.chunk_overlap >= self.rag.chunk_size {
            return Err(AssistantError::Config(format!(
                "CHUNK_OVERLAP ({}) must be smaller than CHUNK_SIZE ({})",
                self.rag.chunk_overlap, self.rag.chunk_size
            )));
        }
        if self.rag.top_k == 0 {
            return Err(AssistantError::Config("RAG_TOP_K must be positive".into()));
        }
        if self.agent.max_iterations == 0 {
            return Err(AssistantError::Config(
                "AGENT_MAX_ITERATIONS must be positive".into(),
            ));
        }
        Ok(())
    }
}

fn required<F: Fn(&str) -> Option<String>>(var: &F, key: &str) -> Result<String> {
    match var(key) {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(AssistantError::Config(format!("{} is not set", key))),
    }
}

fn optional<T, F>(var: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(v) if !v.trim().is_empty() => v
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AssistantError::Config(format!("{} has an invalid value `{}`", key, v))),
        _ => Ok(None),
    }
}

fn parsed<T, F>(var: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    Ok(optional(var, key)?.unwrap_or(default))
}

fn non_empty(v: String) -> Option<String> {
    if v.trim().is_empty() {
        None
    } else {
        Some(v)
    }
}
