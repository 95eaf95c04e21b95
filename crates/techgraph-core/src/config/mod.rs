//! Configuration management for techgraph.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `techgraph.toml` file
//! 3. User config `~/.config/techgraph/config.toml`
//! 4. Built-in defaults (lowest priority)

use std::path::{Path, PathBuf};
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod defaults;

pub use defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Graph backend connection.
    pub backend: BackendConfig,

    /// Query execution budgets.
    pub engine: EngineConfig,

    /// Free-text classification rules.
    pub classifier: ClassifierConfig,

    /// HTTP server.
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./techgraph.toml` (project local)
    /// 2. `~/.config/techgraph/config.toml` (user config)
    /// 3. Falls back to defaults
    ///
    /// Environment overrides apply in every case.
    pub fn load() -> Result<Self, ConfigError> {
        if Path::new(PROJECT_CONFIG_FILE).exists() {
            return Self::from_file(PROJECT_CONFIG_FILE);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join(USER_CONFIG_DIR).join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Apply `TECHGRAPH_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Backend overrides
        if let Some(kind) = lookup("TECHGRAPH_BACKEND") {
            if let Ok(kind) = kind.parse() {
                self.backend.kind = kind;
            }
        }
        if let Some(endpoint) = lookup("TECHGRAPH_ENDPOINT") {
            self.backend.endpoint = endpoint;
        }
        if let Some(ns) = lookup("TECHGRAPH_NAMESPACE") {
            self.backend.namespace = ns;
        }
        if let Some(db) = lookup("TECHGRAPH_DATABASE") {
            self.backend.database = db;
        }
        if let Some(user) = lookup("TECHGRAPH_USERNAME") {
            self.backend.username = Some(user);
        }
        if let Some(password) = lookup("TECHGRAPH_PASSWORD") {
            self.backend.password = Some(password);
        }
        if let Some(snapshot) = lookup("TECHGRAPH_SNAPSHOT") {
            self.backend.snapshot = Some(PathBuf::from(snapshot));
        }
        if let Some(size) = lookup("TECHGRAPH_POOL_SIZE") {
            if let Ok(n) = size.parse() {
                self.backend.pool_size = n;
            }
        }

        // Engine overrides
        if let Some(ms) = lookup("TECHGRAPH_QUERY_TIMEOUT_MS") {
            if let Ok(n) = ms.parse() {
                self.engine.query_timeout_ms = n;
            }
        }
        if let Some(ms) = lookup("TECHGRAPH_FETCH_TIMEOUT_MS") {
            if let Ok(n) = ms.parse() {
                self.engine.fetch_timeout_ms = n;
            }
        }

        // Server overrides
        if let Some(host) = lookup("TECHGRAPH_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("TECHGRAPH_PORT") {
            if let Ok(n) = port.parse() {
                self.server.port = n;
            }
        }
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.pool_size == 0 {
            return Err(ConfigError::Invalid("backend.pool_size must be at least 1".into()));
        }
        if self.backend.kind == BackendKind::Memory && self.backend.snapshot.is_none() {
            return Err(ConfigError::Invalid(
                "backend.snapshot is required for the memory backend".into(),
            ));
        }
        if self.engine.query_timeout_ms == 0 || self.engine.fetch_timeout_ms == 0 {
            return Err(ConfigError::Invalid("engine timeouts must be non-zero".into()));
        }
        if self.engine.frequency_limit == 0 {
            return Err(ConfigError::Invalid(
                "engine.frequency_limit must be at least 1".into(),
            ));
        }
        for (name, pattern) in [
            ("classifier.error_code_pattern", &self.classifier.error_code_pattern),
            ("classifier.sku_pattern", &self.classifier.sku_pattern),
        ] {
            Regex::new(pattern)
                .map_err(|e| ConfigError::Invalid(format!("{name}: {e}")))?;
        }
        Ok(())
    }

    /// Create a default config file content as a string.
    pub fn default_config_string() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Which graph backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// SurrealDB, embedded or remote.
    #[default]
    Surreal,
    /// A YAML graph snapshot served from memory.
    Memory,
}

impl std::str::FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "surreal" | "surrealdb" => Ok(BackendKind::Surreal),
            "memory" | "mem" => Ok(BackendKind::Memory),
            other => Err(ConfigError::Invalid(format!("unknown backend kind: {other}"))),
        }
    }
}

/// Graph backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub kind: BackendKind,

    /// SurrealDB connection string (`rocksdb://`, `mem://`, `ws://`).
    pub endpoint: String,

    pub namespace: String,

    pub database: String,

    pub username: Option<String>,

    /// Password (can also be set via `TECHGRAPH_PASSWORD`).
    #[serde(skip_serializing)]
    pub password: Option<String>,

    /// Snapshot file for the memory backend.
    pub snapshot: Option<PathBuf>,

    /// Maximum concurrent backend sessions.
    pub pool_size: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::default(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            username: None,
            password: None, // Load from env
            snapshot: None,
            pool_size: DEFAULT_POOL_SIZE,
        }
    }
}

/// Query execution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Overall budget per query.
    pub query_timeout_ms: u64,

    /// Budget per backend fetch.
    pub fetch_timeout_ms: u64,

    /// Pause before the retry of a failed fetch.
    pub retry_backoff_ms: u64,

    /// Retries after a transport failure (clamped to 1).
    pub max_retries: u32,

    /// Default and maximum size of a frequency ranking.
    pub frequency_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            query_timeout_ms: DEFAULT_QUERY_TIMEOUT_MS,
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            frequency_limit: DEFAULT_FREQUENCY_LIMIT,
        }
    }
}

impl EngineConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Effective retry count; a fetch is never retried more than once.
    pub fn retries(&self) -> u32 {
        self.max_retries.min(1)
    }
}

/// Classification rule configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Regex locating an error code token.
    pub error_code_pattern: String,

    /// Regex locating a product SKU token.
    pub sku_pattern: String,

    /// Keywords that turn a SKU mention into a compatibility lookup.
    pub compatibility_keywords: Vec<String>,

    /// Keywords for cable/spec lookups (accent-insensitive).
    pub spec_keywords: Vec<String>,

    /// Cable types/applications used as a spec filter.
    pub spec_terms: Vec<String>,

    /// Keywords for frequency rankings.
    pub frequency_keywords: Vec<String>,

    /// Keywords for installer lookups.
    pub installer_keywords: Vec<String>,

    /// Region names picked out of installer questions.
    pub regions: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        let owned = |words: &[&str]| words.iter().map(|s| s.to_string()).collect();
        Self {
            error_code_pattern: DEFAULT_ERROR_CODE_PATTERN.to_string(),
            sku_pattern: DEFAULT_SKU_PATTERN.to_string(),
            compatibility_keywords: owned(DEFAULT_COMPATIBILITY_KEYWORDS),
            spec_keywords: owned(DEFAULT_SPEC_KEYWORDS),
            spec_terms: owned(DEFAULT_SPEC_TERMS),
            frequency_keywords: owned(DEFAULT_FREQUENCY_KEYWORDS),
            installer_keywords: owned(DEFAULT_INSTALLER_KEYWORDS),
            regions: owned(DEFAULT_REGIONS),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
        }
    }
}
