//! Agreement layer port.
//!
//! The only way the lifecycle touches non-determinism. A unit of work is
//! executed independently by several evaluators and a single value comes
//! back that all of them accept, or the call fails.

use async_trait::async_trait;

use crate::domain::errors::DomainError;
use crate::domain::models::WorkUnit;

/// Why evaluators could not settle on a value.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AgreementError {
    #[error("evaluators disagree: {0}")]
    Disagreement(String),

    #[error("no quorum: {0}")]
    NoQuorum(String),

    #[error("execution failed: {0}")]
    Execution(String),
}

impl AgreementError {
    pub fn into_domain(self, work: &WorkUnit) -> DomainError {
        DomainError::AgreementFailed {
            work: work.kind().to_string(),
            reason: self.to_string(),
        }
    }
}

#[async_trait]
pub trait AgreementLayer: Send + Sync {
    /// Accept the result only if every evaluator produced byte-identical output.
    ///
    /// `None` means the evaluators agreed the operation yielded nothing.
    async fn exact_match(&self, work: &WorkUnit) -> Result<Option<String>, AgreementError>;

    /// Accept one evaluator's output if the others judge it acceptable
    /// against `task` and `criteria`. Outputs need not be equal.
    async fn non_comparative_judgment(
        &self,
        work: &WorkUnit,
        task: &str,
        criteria: &str,
    ) -> Result<String, AgreementError>;
}
