use serde::{Deserialize, Serialize};

use super::verification::VerdictMatch;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Evidence and classification rules
    #[serde(default)]
    pub verification: VerificationConfig,

    /// Local evaluator panel
    #[serde(default)]
    pub agreement: AgreementConfig,

    /// Evidence fetcher settings
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// Judgment engine settings
    #[serde(default)]
    pub judgment: JudgmentConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".bounty/bounty.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stderr only when unset
    #[serde(default)]
    pub log_dir: Option<String>,

    /// Number of days to retain logs
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

const fn default_retention_days() -> u32 {
    30
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            retention_days: default_retention_days(),
        }
    }
}

/// Evidence limits and verdict classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct VerificationConfig {
    /// Evidence shorter than this (in characters) rejects the task
    #[serde(default = "default_min_evidence_chars")]
    pub min_evidence_chars: usize,

    /// Evidence is cut to this many characters before judgment
    #[serde(default = "default_max_evidence_chars")]
    pub max_evidence_chars: usize,

    /// How agreed judgment text is classified
    #[serde(default)]
    pub verdict_match: VerdictMatch,
}

const fn default_min_evidence_chars() -> usize {
    50
}

const fn default_max_evidence_chars() -> usize {
    4000
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            min_evidence_chars: default_min_evidence_chars(),
            max_evidence_chars: default_max_evidence_chars(),
            verdict_match: VerdictMatch::default(),
        }
    }
}

/// Local evaluator panel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AgreementConfig {
    /// Number of independent evaluators (1-15)
    #[serde(default = "default_evaluators")]
    pub evaluators: usize,
}

const fn default_evaluators() -> usize {
    3
}

impl Default for AgreementConfig {
    fn default() -> Self {
        Self {
            evaluators: default_evaluators(),
        }
    }
}

/// HTTP evidence fetcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FetcherConfig {
    /// Request timeout in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with evidence requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

const fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("bounty-verifier/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Which judgment engine backs the evaluators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JudgmentEngineKind {
    /// Canned responses, no network
    Mock,
    /// Anthropic Messages API
    #[default]
    Anthropic,
}

/// Judgment engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct JudgmentConfig {
    #[serde(default)]
    pub engine: JudgmentEngineKind,

    /// API key; read from `ANTHROPIC_API_KEY` when unset
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_judgment_timeout_secs")]
    pub timeout_secs: u64,

    /// Sustained request rate towards the API
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: f64,

    /// Retries for rate-limit and server errors
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_model() -> String {
    "claude-3-5-sonnet-20241022".to_string()
}

const fn default_max_tokens() -> u32 {
    1024
}

const fn default_judgment_timeout_secs() -> u64 {
    120
}

const fn default_requests_per_second() -> f64 {
    2.0
}

const fn default_max_retries() -> u32 {
    3
}

impl Default for JudgmentConfig {
    fn default() -> Self {
        Self {
            engine: JudgmentEngineKind::default(),
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_judgment_timeout_secs(),
            requests_per_second: default_requests_per_second(),
            max_retries: default_max_retries(),
        }
    }
}

impl JudgmentConfig {
    /// Get API key from config or environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .filter(|key| !key.is_empty())
    }
}
