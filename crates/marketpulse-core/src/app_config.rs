use std::net::SocketAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-wide configuration, built once at startup and passed down by
/// reference. Nothing below the binaries reads the environment directly.
#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub brave_api_key: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub brave_base_url: String,
    pub gemini_base_url: String,
    pub user_agent: String,
    pub default_articles: usize,
    pub max_articles: usize,
    pub search_overfetch_percent: usize,
    pub search_timeout_secs: u64,
    pub extract_timeout_secs: u64,
    pub model_timeout_secs: u64,
    pub search_max_retries: u32,
    pub model_max_retries: u32,
    pub retry_backoff_ms: u64,
    pub request_timeout_secs: u64,
    pub max_concurrency: usize,
    pub prompt_max_chars: usize,
    pub summary_max_chars: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("brave_api_key", &"[redacted]")
            .field("gemini_api_key", &"[redacted]")
            .field("gemini_model", &self.gemini_model)
            .field("brave_base_url", &self.brave_base_url)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("user_agent", &self.user_agent)
            .field("default_articles", &self.default_articles)
            .field("max_articles", &self.max_articles)
            .field("search_overfetch_percent", &self.search_overfetch_percent)
            .field("search_timeout_secs", &self.search_timeout_secs)
            .field("extract_timeout_secs", &self.extract_timeout_secs)
            .field("model_timeout_secs", &self.model_timeout_secs)
            .field("search_max_retries", &self.search_max_retries)
            .field("model_max_retries", &self.model_max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_concurrency", &self.max_concurrency)
            .field("prompt_max_chars", &self.prompt_max_chars)
            .field("summary_max_chars", &self.summary_max_chars)
            .finish()
    }
}
