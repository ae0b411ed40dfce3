//! Port trait definitions (Hexagonal Architecture)
//!
//! - TaskRepository: task persistence
//! - AgreementLayer: agreed values from non-deterministic work
//! - EvidenceFetcher: proof URL retrieval
//! - JudgmentEngine: language-model judgment

pub mod agreement;
pub mod evidence_fetcher;
pub mod judgment_engine;
pub mod task_repository;

pub use agreement::{AgreementError, AgreementLayer};
pub use evidence_fetcher::{EvidenceFetcher, FetchError};
pub use judgment_engine::{JudgmentEngine, JudgmentError};
pub use task_repository::{TaskFilter, TaskRepository};
