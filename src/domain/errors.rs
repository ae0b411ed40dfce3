//! Domain errors.
//!
//! Business outcomes (refused transitions, rejections) are return values.
//! Everything here is an infrastructure fault that aborts the operation
//! without changing any task.

use thiserror::Error;

use crate::domain::models::TaskId;

/// Domain-level errors.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Agreement failed for {work}: {reason}")]
    AgreementFailed { work: String, reason: String },

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Concurrency conflict: task {id} was modified")]
    ConcurrencyConflict { id: TaskId },
}

impl DomainError {
    /// Infrastructure faults the calling substrate may retry.
    ///
    /// Business rejections never surface as errors, so they are never retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::AgreementFailed { .. } | Self::ConcurrencyConflict { .. } | Self::DatabaseError(_)
        )
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        let agreement = DomainError::AgreementFailed {
            work: "fetch_evidence".to_string(),
            reason: "evaluators disagree".to_string(),
        };
        assert!(agreement.is_retryable());
        assert!(DomainError::ConcurrencyConflict { id: 3 }.is_retryable());
        assert!(!DomainError::TaskNotFound(3).is_retryable());
        assert!(!DomainError::SerializationError("bad".to_string()).is_retryable());
    }

    #[test]
    fn test_display() {
        let err = DomainError::AgreementFailed {
            work: "exec_prompt".to_string(),
            reason: "no quorum".to_string(),
        };
        assert_eq!(err.to_string(), "Agreement failed for exec_prompt: no quorum");
    }
}
