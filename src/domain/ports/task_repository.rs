use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::errors::DomainResult;
use crate::domain::models::{NewTask, Task, TaskId, TaskStatus};

/// Filters for listing tasks
#[derive(Default, Debug, Clone)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub limit: Option<usize>,
}

/// Repository port for task persistence.
///
/// Tasks are never deleted. Writers are expected to be serialized by the
/// caller; readers must never observe a half-written record.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Allocate the next sequential id and store the Open task built for it.
    ///
    /// Allocation and insert land together or not at all.
    async fn create(&self, new_task: NewTask) -> DomainResult<Task>;

    /// Get a task by ID
    async fn get(&self, id: TaskId) -> DomainResult<Option<Task>>;

    /// Overwrite the record at `task.id`.
    ///
    /// The stored version must be `task.version - 1`, otherwise the write is
    /// refused with `ConcurrencyConflict`.
    async fn update(&self, task: &Task) -> DomainResult<()>;

    /// The allocator's next value, which equals the number of tasks ever created.
    async fn next_id(&self) -> DomainResult<TaskId>;

    /// List tasks in id order
    async fn list(&self, filter: TaskFilter) -> DomainResult<Vec<Task>>;

    /// Count tasks per status
    async fn count_by_status(&self) -> DomainResult<HashMap<TaskStatus, u64>>;
}
