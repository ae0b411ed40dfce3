//! Agreement layer adapters.

pub mod local;
pub mod scripted;

pub use local::{Evaluator, LocalAgreement, VALIDATION_PREAMBLE};
pub use scripted::{AgreementCall, ScriptedAgreement};
