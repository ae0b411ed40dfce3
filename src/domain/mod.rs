//! Domain layer
//!
//! Core business logic and domain models, free of infrastructure.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
