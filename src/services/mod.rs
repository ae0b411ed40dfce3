//! Application services.

pub mod task_lifecycle;

pub use task_lifecycle::{TaskLifecycleService, EMPTY_RECORD, STATUS_NOT_FOUND};
