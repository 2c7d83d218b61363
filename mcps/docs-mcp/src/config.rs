//! Configuration loading for docs-mcp
//!
//! Configuration is layered, later sources winning:
//! 1. Built-in defaults
//! 2. TOML file (`--config`, then `DOCS_MCP_CONFIG`, then `<config_dir>/docs-mcp/config.toml`)
//! 3. Environment variables (`SERPER_API_KEY`, `GROQ_API_KEY`, `SERPER_URL`,
//!    `DOCS_MCP_CLEANUP`, `DOCS_MCP_CHUNK_SIZE`)
//!
//! Credentials are checked by [`Config::validate`] at startup, not on first use.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing credential: {0} is not set")]
    MissingCredential(&'static str),
    #[error("invalid configuration value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub cleanup: CleanupConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    /// Library identifier -> documentation root domain
    #[serde(default = "default_libraries")]
    pub libraries: BTreeMap<String, String>,
}

/// Search provider configuration (Serper)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_url")]
    pub url: String,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Number of organic results to request and process
    #[serde(default = "default_num_results")]
    pub num_results: usize,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

/// Page fetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Maximum page body size in bytes
    #[serde(default = "default_max_response_size")]
    pub max_response_size: usize,
    /// Result links processed at once; 1 means strictly sequential
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

/// How fetched pages are turned into readable text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleanupStrategy {
    /// Chunk the raw body and send each chunk to the hosted model
    Llm,
    /// Extract text locally from the HTML, no network call
    Local,
}

impl FromStr for CleanupStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "llm" => Ok(CleanupStrategy::Llm),
            "local" => Ok(CleanupStrategy::Local),
            other => Err(ConfigError::InvalidValue {
                field: "cleanup.strategy".to_string(),
                reason: format!("expected 'llm' or 'local', got '{}'", other),
            }),
        }
    }
}

/// Text cleanup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupConfig {
    #[serde(default = "default_strategy")]
    pub strategy: CleanupStrategy,
    /// Characters per chunk sent to the model
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

/// Hosted model configuration (OpenAI-compatible chat completions)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

// Default value functions
fn default_search_url() -> String {
    "https://google.serper.dev/search".to_string()
}

fn default_num_results() -> usize {
    2
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    "docs-mcp/0.1".to_string()
}

fn default_max_response_size() -> usize {
    5 * 1024 * 1024
}

fn default_max_concurrency() -> usize {
    2
}

fn default_strategy() -> CleanupStrategy {
    CleanupStrategy::Llm
}

fn default_chunk_size() -> usize {
    4000
}

fn default_llm_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_model() -> String {
    "llama-3.1-8b-instant".to_string()
}

fn default_system_prompt() -> String {
    "You are an AI Web scraper. Only return valid text, remove and clean every \
     other HTML component that is not required."
        .to_string()
}

/// The libraries supported out of the box
pub fn default_libraries() -> BTreeMap<String, String> {
    [
        ("langchain", "python.langchain.com/docs"),
        ("llama-index", "docs.llamaindex.ai/en/stable"),
        ("openai", "platform.openai.com/docs"),
        ("uv", "docs.astral.sh/uv"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            fetch: FetchConfig::default(),
            cleanup: CleanupConfig::default(),
            llm: LlmConfig::default(),
            libraries: default_libraries(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url: default_search_url(),
            api_key: None,
            num_results: default_num_results(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
            max_response_size: default_max_response_size(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            chunk_size: default_chunk_size(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            api_key: None,
            model: default_model(),
            timeout_seconds: default_timeout(),
            system_prompt: default_system_prompt(),
        }
    }
}

impl Config {
    /// Load configuration from file (if any) and the process environment
    ///
    /// A file named by `--config` or `DOCS_MCP_CONFIG` must exist; the default
    /// location is optional.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(explicit_path, |key| std::env::var(key).ok())
    }

    /// [`load`](Self::load) with the environment read through `lookup`
    pub fn load_with<F>(explicit_path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let requested = explicit_path
            .map(Path::to_path_buf)
            .or_else(|| lookup("DOCS_MCP_CONFIG").map(PathBuf::from));

        let mut config = match requested {
            Some(path) => Self::from_file(&path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    tracing::info!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env(&lookup)?;
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        tracing::info!("Loading config from: {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Parse TOML content; `[libraries]` entries are merged over the defaults
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let mut config: Config = toml::from_str(content)?;
        let mut libraries = default_libraries();
        libraries.extend(std::mem::take(&mut config.libraries));
        config.libraries = libraries;
        Ok(config)
    }

    /// Apply environment overrides using the given lookup
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("SERPER_API_KEY") {
            self.search.api_key = Some(key);
        }
        if let Some(url) = lookup("SERPER_URL") {
            self.search.url = url;
        }
        if let Some(key) = lookup("GROQ_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(strategy) = lookup("DOCS_MCP_CLEANUP") {
            self.cleanup.strategy = strategy.parse()?;
        }
        if let Some(size) = lookup("DOCS_MCP_CHUNK_SIZE") {
            self.cleanup.chunk_size = size.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "cleanup.chunk_size".to_string(),
                reason: format!("'{}' is not a positive integer", size),
            })?;
        }
        Ok(())
    }

    /// Check credentials and numeric bounds before serving
    pub fn validate(&self) -> Result<(), ConfigError> {
        if is_blank(&self.search.api_key) {
            return Err(ConfigError::MissingCredential("SERPER_API_KEY"));
        }
        if self.cleanup.strategy == CleanupStrategy::Llm && is_blank(&self.llm.api_key) {
            return Err(ConfigError::MissingCredential("GROQ_API_KEY"));
        }

        let positive = [
            ("search.num_results", self.search.num_results as u64),
            ("search.timeout_seconds", self.search.timeout_seconds),
            ("fetch.timeout_seconds", self.fetch.timeout_seconds),
            ("fetch.max_concurrency", self.fetch.max_concurrency as u64),
            ("cleanup.chunk_size", self.cleanup.chunk_size as u64),
            ("llm.timeout_seconds", self.llm.timeout_seconds),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "must be greater than zero".to_string(),
                });
            }
        }

        if let Some((library, _)) = self.libraries.iter().find(|(_, d)| d.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: format!("libraries.{}", library),
                reason: "domain must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// `<config_dir>/docs-mcp/config.toml`
    fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("docs-mcp").join("config.toml"))
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}
