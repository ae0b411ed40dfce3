use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::Config;

/// Project directory holding configuration and the default database.
pub const CONFIG_DIR: &str = ".bounty";
pub const CONFIG_FILE: &str = ".bounty/config.yaml";
pub const LOCAL_CONFIG_FILE: &str = ".bounty/local.yaml";
pub const ENV_PREFIX: &str = "BOUNTY_";

const MAX_EVALUATORS: usize = 15;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid evaluators: {0}. Must be between 1 and 15")]
    InvalidEvaluators(usize),

    #[error("Invalid evidence limits: min_evidence_chars ({min}) must not exceed max_evidence_chars ({max})")]
    InvalidEvidenceLimits { min: usize, max: usize },

    #[error("Invalid rate limit: {0}. Must be positive")]
    InvalidRateLimit(f64),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .bounty/config.yaml (project config, created by init)
    /// 3. .bounty/local.yaml (project local overrides, optional)
    /// 4. Environment variables (BOUNTY_* prefix, `__` for nesting)
    pub fn load() -> Result<Config> {
        Self::load_layers(&[Path::new(CONFIG_FILE), Path::new(LOCAL_CONFIG_FILE)])
    }

    /// Load configuration from a specific file. Environment variables still win.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        Self::load_layers(&[path])
            .with_context(|| format!("Failed to load config from {}", path.display()))
    }

    fn load_layers(files: &[&Path]) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        for file in files {
            figment = figment.merge(Yaml::file(file));
        }

        let config: Config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }
        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(config.database.max_connections));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }
        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let evaluators = config.agreement.evaluators;
        if evaluators == 0 || evaluators > MAX_EVALUATORS {
            return Err(ConfigError::InvalidEvaluators(evaluators));
        }

        let verification = &config.verification;
        if verification.max_evidence_chars == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_evidence_chars must be at least 1".to_string(),
            ));
        }
        if verification.min_evidence_chars > verification.max_evidence_chars {
            return Err(ConfigError::InvalidEvidenceLimits {
                min: verification.min_evidence_chars,
                max: verification.max_evidence_chars,
            });
        }

        if config.fetcher.timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "fetcher.timeout_secs must be at least 1".to_string(),
            ));
        }

        let rate = config.judgment.requests_per_second;
        if !(rate.is_finite() && rate > 0.0) {
            return Err(ConfigError::InvalidRateLimit(rate));
        }

        Ok(())
    }
}
