//! Judgment engine port.
//!
//! A judgment engine takes a natural-language prompt and returns free text.
//! Its output is not deterministic; callers reach it only through the
//! agreement layer.

use async_trait::async_trait;

/// Error types for judgment engine calls
#[derive(Debug, thiserror::Error)]
pub enum JudgmentError {
    #[error("Engine not configured: {0}")]
    NotConfigured(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Execution timeout after {0}s")]
    Timeout(u64),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),
}

impl JudgmentError {
    /// Whether the same request may succeed if sent again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimitExceeded(_) | Self::Timeout(_) | Self::NetworkError(_)
        )
    }
}

/// Port trait for judgment engine implementations
///
/// Implementations must be `Send + Sync` for concurrent use across evaluators.
#[async_trait]
pub trait JudgmentEngine: Send + Sync {
    /// Unique identifier for this engine type, e.g. "anthropic-api", "mock"
    fn engine_id(&self) -> &str;

    /// Execute a prompt and return the generated text.
    async fn execute(&self, prompt: &str) -> Result<String, JudgmentError>;
}
