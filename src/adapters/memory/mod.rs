//! In-process adapters with no external state.

pub mod task_repository;

pub use task_repository::InMemoryTaskRepository;
