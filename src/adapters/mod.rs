//! Adapters implementing the domain ports.

pub mod agreement;
pub mod judgment;
pub mod memory;
pub mod sqlite;
pub mod web;
