//! Infrastructure layer module
//!
//! - Configuration loading (figment: defaults, YAML files, environment)
//! - Logging (tracing subscriber, optional rolling files)
//! - Project setup and service assembly

pub mod config;
pub mod logging;
pub mod setup;
