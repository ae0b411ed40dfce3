//! Domain models.

pub mod config;
pub mod task;
pub mod verification;

pub use config::{
    AgreementConfig, Config, DatabaseConfig, FetcherConfig, JudgmentConfig, JudgmentEngineKind,
    LoggingConfig, VerificationConfig,
};
pub use task::{Identity, NewTask, Task, TaskId, TaskStatus};
pub use verification::{
    evidence_sufficient, truncate_evidence, FetchMode, JudgmentPrompt, Verdict, VerdictMatch,
    VerificationOutcome, VerifyRefusal, WorkUnit, EVIDENCE_UNAVAILABLE,
};
