//! Bounty Verifier - bounty tasks with agreed evidence verification
//!
//! Tasks are created with free-text acceptance criteria, claimed by a
//! worker, and closed by submitting a proof URL. Verification fetches the
//! evidence behind that URL and has it judged against the criteria. Both
//! steps are non-deterministic, so each one runs through an agreement
//! layer that only returns a value every evaluator stands behind.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Task lifecycle, verdict rules and port traits
//! - **Adapters** (`adapters`): SQLite and in-memory stores, evidence fetchers,
//!   judgment engines and the local evaluator panel
//! - **Service Layer** (`services`): The lifecycle operations
//! - **Infrastructure Layer** (`infrastructure`): Configuration, logging and setup
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use bounty_verifier::adapters::agreement::ScriptedAgreement;
//! use bounty_verifier::adapters::memory::InMemoryTaskRepository;
//! use bounty_verifier::{Identity, TaskLifecycleService};
//!
//! let service = TaskLifecycleService::new(
//!     Arc::new(InMemoryTaskRepository::new()),
//!     Arc::new(ScriptedAgreement::new()),
//! );
//! let id = service
//!     .create_task(&Identity::new("alice"), "Docs", "Write docs", "README exists", 10)
//!     .await?;
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    Config, Identity, Task, TaskId, TaskStatus, Verdict, VerdictMatch, VerificationOutcome,
    VerifyRefusal,
};
pub use domain::ports::{AgreementLayer, EvidenceFetcher, JudgmentEngine, TaskRepository};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::TaskLifecycleService;
