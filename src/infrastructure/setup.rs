//! Project setup and service assembly.
//!
//! `init` writes the `.bounty` directory, a commented config file and the
//! database. Every other command opens the lifecycle service through
//! [`open_service`], which wires the evaluator panel described by the
//! loaded configuration.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::adapters::agreement::{Evaluator, LocalAgreement, VALIDATION_PREAMBLE};
use crate::adapters::judgment::{AnthropicJudgmentEngine, MockJudgmentEngine, MockResponse};
use crate::adapters::sqlite::{database_url, initialize_database, PoolConfig, SqliteTaskRepository};
use crate::adapters::web::HttpEvidenceFetcher;
use crate::domain::models::{Config, JudgmentConfig, JudgmentEngineKind};
use crate::domain::ports::{AgreementLayer, EvidenceFetcher, JudgmentEngine};
use crate::infrastructure::config::{CONFIG_DIR, CONFIG_FILE};
use crate::services::TaskLifecycleService;

/// Lifecycle service over the on-disk store.
pub type SqliteLifecycleService = TaskLifecycleService<SqliteTaskRepository>;

/// Default configuration template content
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Bounty verifier configuration
# Override settings by editing this file, adding .bounty/local.yaml, or
# setting environment variables with the BOUNTY_ prefix
#
# Example environment variables:
#   export BOUNTY_DATABASE__PATH=/custom/path/bounty.db
#   export BOUNTY_LOGGING__LEVEL=debug
#   export BOUNTY_AGREEMENT__EVALUATORS=5
#   export BOUNTY_JUDGMENT__ENGINE=mock

database:
  # Path to SQLite database file (project-local)
  path: ".bounty/bounty.db"
  max_connections: 5

logging:
  # trace, debug, info, warn, error
  level: "info"
  # json or pretty
  format: "pretty"
  # Uncomment to also write daily rolling JSON logs
  # log_dir: ".bounty/logs"
  retention_days: 30

verification:
  # Evidence shorter than this many characters rejects the task
  min_evidence_chars: 50
  # Evidence is cut to this many characters before judgment
  max_evidence_chars: 4000
  # contains: VERIFIED anywhere in the agreed text (case-insensitive)
  # prefix: the agreed text must start with VERIFIED
  verdict_match: contains

agreement:
  # Independent evaluators per unit of work (1-15)
  evaluators: 3

fetcher:
  timeout_secs: 30

judgment:
  # anthropic or mock
  engine: anthropic
  # Read from ANTHROPIC_API_KEY when unset
  # api_key: ""
  model: "claude-3-5-sonnet-20241022"
  max_tokens: 1024
  timeout_secs: 120
  requests_per_second: 2.0
  max_retries: 3
"#;

/// Setup paths and directories
#[derive(Debug, Clone)]
pub struct SetupPaths {
    pub root: PathBuf,
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
}

impl SetupPaths {
    /// Paths for a project rooted at `root`.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            config_dir: root.join(CONFIG_DIR),
            config_file: root.join(CONFIG_FILE),
            root,
        }
    }

    /// Paths for the current directory
    pub fn new() -> Result<Self> {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Ok(Self::for_root(current_dir))
    }

    /// Resolve the configured database path against the project root.
    pub fn database_file(&self, config: &Config) -> PathBuf {
        let path = Path::new(&config.database.path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.config_file.exists()
    }
}

/// Create the configuration directory and default config file.
///
/// Returns whether the config file was written. An existing file is kept
/// unless `force` is set.
pub fn create_config_file(paths: &SetupPaths, force: bool) -> Result<bool> {
    std::fs::create_dir_all(&paths.config_dir).context("Failed to create config directory")?;

    if paths.config_file.exists() && !force {
        debug!(path = %paths.config_file.display(), "config file exists, keeping it");
        return Ok(false);
    }

    std::fs::write(&paths.config_file, DEFAULT_CONFIG_TEMPLATE)
        .context("Failed to write config file")?;
    Ok(true)
}

/// Create the database file and apply migrations.
pub async fn initialize_store(paths: &SetupPaths, config: &Config) -> Result<PathBuf> {
    let db_file = paths.database_file(config);
    let url = database_url(&db_file.display().to_string());
    let pool = initialize_database(&url, Some(PoolConfig::from(&config.database)))
        .await
        .context("Failed to initialize database")?;
    pool.close().await;
    info!(path = %db_file.display(), "database ready");
    Ok(db_file)
}

/// Judgment engine selected by the configuration.
pub fn build_engine(config: &JudgmentConfig) -> Result<Arc<dyn JudgmentEngine>> {
    let engine: Arc<dyn JudgmentEngine> = match config.engine {
        JudgmentEngineKind::Anthropic => Arc::new(
            AnthropicJudgmentEngine::new(config).context("Failed to create judgment engine")?,
        ),
        JudgmentEngineKind::Mock => Arc::new(
            MockJudgmentEngine::new()
                .with_response_containing(VALIDATION_PREAMBLE, MockResponse::success("ACCEPT")),
        ),
    };
    Ok(engine)
}

/// Evaluator panel: one HTTP client per evaluator, one shared engine so
/// the configured request rate holds across the whole panel.
pub fn build_agreement(config: &Config) -> Result<Arc<dyn AgreementLayer>> {
    let engine = build_engine(&config.judgment)?;

    let evaluators = (0..config.agreement.evaluators)
        .map(|_| -> Result<Evaluator> {
            let fetcher: Arc<dyn EvidenceFetcher> = Arc::new(
                HttpEvidenceFetcher::new(&config.fetcher)
                    .context("Failed to create evidence fetcher")?,
            );
            Ok(Evaluator::new(fetcher, Arc::clone(&engine)))
        })
        .collect::<Result<Vec<_>>>()?;

    let agreement = LocalAgreement::new(evaluators).context("Failed to assemble evaluator panel")?;
    debug!(evaluators = agreement.size(), engine = engine.engine_id(), "evaluator panel ready");
    Ok(Arc::new(agreement))
}

/// Open the lifecycle service for the project at `paths`.
pub async fn open_service(paths: &SetupPaths, config: &Config) -> Result<SqliteLifecycleService> {
    let db_file = paths.database_file(config);
    if !db_file.exists() {
        anyhow::bail!(
            "No database at {}. Run 'bounty init' first.",
            db_file.display()
        );
    }

    let url = database_url(&db_file.display().to_string());
    let pool = initialize_database(&url, Some(PoolConfig::from(&config.database)))
        .await
        .context("Failed to open database")?;

    let repo = Arc::new(SqliteTaskRepository::new(pool));
    let agreement = build_agreement(config)?;

    Ok(TaskLifecycleService::new(repo, agreement)
        .with_verification_config(config.verification.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Identity, VerificationOutcome};

    fn mock_config() -> Config {
        let mut config = Config::default();
        config.judgment.engine = JudgmentEngineKind::Mock;
        config.agreement.evaluators = 2;
        config
    }

    #[test]
    fn test_default_template_parses_to_defaults() {
        let parsed: Config = serde_yaml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        let defaults = Config::default();

        assert_eq!(parsed.database.path, defaults.database.path);
        assert_eq!(parsed.verification.min_evidence_chars, 50);
        assert_eq!(parsed.verification.max_evidence_chars, 4000);
        assert_eq!(parsed.agreement.evaluators, 3);
        assert_eq!(parsed.judgment.engine, JudgmentEngineKind::Anthropic);
        assert!(parsed.logging.log_dir.is_none());
    }

    #[test]
    fn test_create_config_file_respects_force() {
        let dir = tempfile::tempdir().unwrap();
        let paths = SetupPaths::for_root(dir.path());

        assert!(create_config_file(&paths, false).unwrap());
        std::fs::write(&paths.config_file, "database: {}\n").unwrap();

        assert!(!create_config_file(&paths, false).unwrap());
        assert_eq!(std::fs::read_to_string(&paths.config_file).unwrap(), "database: {}\n");

        assert!(create_config_file(&paths, true).unwrap());
        assert_eq!(
            std::fs::read_to_string(&paths.config_file).unwrap(),
            DEFAULT_CONFIG_TEMPLATE
        );
    }

    #[tokio::test]
    async fn test_open_service_requires_init() {
        let dir = tempfile::tempdir().unwrap();
        let paths = SetupPaths::for_root(dir.path());

        let err = open_service(&paths, &mock_config()).await.err().unwrap();
        assert!(err.to_string().contains("bounty init"));
    }

    #[tokio::test]
    async fn test_open_service_after_init() {
        let dir = tempfile::tempdir().unwrap();
        let paths = SetupPaths::for_root(dir.path());
        let config = mock_config();

        let db_file = initialize_store(&paths, &config).await.unwrap();
        assert!(db_file.exists());

        let service = open_service(&paths, &config).await.unwrap();
        let id = service
            .create_task(&Identity::new("alice"), "Title", "Desc", "Criteria", 5)
            .await
            .unwrap();
        assert_eq!(id, 0);

        // Unsubmitted tasks are refused before any evaluator runs.
        let outcome = service.verify_completion(id).await.unwrap();
        assert!(matches!(outcome, VerificationOutcome::Error { .. }));
    }

    #[test]
    fn test_build_agreement_rejects_empty_panel() {
        let mut config = mock_config();
        config.agreement.evaluators = 0;
        assert!(build_agreement(&config).is_err());
    }
}
