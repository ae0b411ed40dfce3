//! In-memory implementation of the TaskRepository.
//!
//! Keeps the same allocation and versioning contract as the SQLite store.
//! Used by tests and by embedders that persist state elsewhere.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{NewTask, Task, TaskId, TaskStatus};
use crate::domain::ports::{TaskFilter, TaskRepository};

#[derive(Default)]
struct Store {
    next_id: TaskId,
    tasks: BTreeMap<TaskId, Task>,
}

#[derive(Default)]
pub struct InMemoryTaskRepository {
    store: RwLock<Store>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, new_task: NewTask) -> DomainResult<Task> {
        let mut store = self.store.write().await;
        let task = new_task.into_task(store.next_id);
        store.next_id += 1;
        store.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn get(&self, id: TaskId) -> DomainResult<Option<Task>> {
        Ok(self.store.read().await.tasks.get(&id).cloned())
    }

    async fn update(&self, task: &Task) -> DomainResult<()> {
        let mut store = self.store.write().await;
        let stored = store
            .tasks
            .get_mut(&task.id)
            .ok_or(DomainError::TaskNotFound(task.id))?;

        if stored.version + 1 != task.version {
            return Err(DomainError::ConcurrencyConflict { id: task.id });
        }
        *stored = task.clone();
        Ok(())
    }

    async fn next_id(&self) -> DomainResult<TaskId> {
        Ok(self.store.read().await.next_id)
    }

    async fn list(&self, filter: TaskFilter) -> DomainResult<Vec<Task>> {
        let store = self.store.read().await;
        let matching = store
            .tasks
            .values()
            .filter(|t| filter.status.map_or(true, |s| t.status == s))
            .take(filter.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();
        Ok(matching)
    }

    async fn count_by_status(&self) -> DomainResult<HashMap<TaskStatus, u64>> {
        let store = self.store.read().await;
        let mut counts = HashMap::new();
        for task in store.tasks.values() {
            *counts.entry(task.status).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Identity;

    fn new_task() -> NewTask {
        NewTask {
            creator: Identity::new("alice"),
            title: "T".to_string(),
            description: "D".to_string(),
            criteria: "C".to_string(),
            reward: 0,
        }
    }

    #[tokio::test]
    async fn test_sequential_ids_and_lookup() {
        let repo = InMemoryTaskRepository::new();
        assert_eq!(repo.create(new_task()).await.unwrap().id, 0);
        assert_eq!(repo.create(new_task()).await.unwrap().id, 1);
        assert_eq!(repo.next_id().await.unwrap(), 2);
        assert!(repo.get(1).await.unwrap().is_some());
        assert!(repo.get(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stale_update_is_refused() {
        let repo = InMemoryTaskRepository::new();
        let created = repo.create(new_task()).await.unwrap();

        let mut first = created.clone();
        first.claim(Identity::new("bob")).unwrap();
        repo.update(&first).await.unwrap();

        let mut second = created;
        second.claim(Identity::new("carol")).unwrap();
        assert!(matches!(
            repo.update(&second).await,
            Err(DomainError::ConcurrencyConflict { id: 0 })
        ));
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let repo = InMemoryTaskRepository::new();
        for _ in 0..3 {
            repo.create(new_task()).await.unwrap();
        }
        let mut task = repo.get(1).await.unwrap().unwrap();
        task.claim(Identity::new("bob")).unwrap();
        repo.update(&task).await.unwrap();

        let claimed = repo
            .list(TaskFilter { status: Some(TaskStatus::Claimed), limit: None })
            .await
            .unwrap();
        assert_eq!(claimed.len(), 1);
        assert_eq!(claimed[0].id, 1);

        let limited = repo.list(TaskFilter { status: None, limit: Some(2) }).await.unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(repo.count_by_status().await.unwrap()[&TaskStatus::Open], 2);
    }
}
