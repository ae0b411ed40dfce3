//! SQLite implementation of the TaskRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::debug;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{NewTask, Task, TaskId, TaskStatus};
use crate::domain::ports::{TaskFilter, TaskRepository};

#[derive(Clone)]
pub struct SqliteTaskRepository {
    pool: SqlitePool,
}

impl SqliteTaskRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for SqliteTaskRepository {
    async fn create(&self, new_task: NewTask) -> DomainResult<Task> {
        let mut tx = self.pool.begin().await?;

        // Bumping the counter first takes the write lock before anything is read.
        let (allocated,): (i64,) = sqlx::query_as(
            "UPDATE task_counter SET next_id = next_id + 1 WHERE singleton = 0 RETURNING next_id - 1"
        )
        .fetch_one(&mut *tx)
        .await?;

        let task = new_task.into_task(allocated as TaskId);
        let record = task.to_record()?;

        sqlx::query(
            "INSERT INTO tasks (id, status, version, record, updated_at) VALUES (?, ?, ?, ?, ?)"
        )
        .bind(allocated)
        .bind(task.status.as_str())
        .bind(task.version as i64)
        .bind(&record)
        .bind(task.updated_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!(task_id = task.id, "task row inserted");
        Ok(task)
    }

    async fn get(&self, id: TaskId) -> DomainResult<Option<Task>> {
        let row: Option<TaskRow> = sqlx::query_as(
            "SELECT id, record FROM tasks WHERE id = ?"
        )
        .bind(id as i64)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Task::try_from).transpose()
    }

    async fn update(&self, task: &Task) -> DomainResult<()> {
        let record = task.to_record()?;

        let result = sqlx::query(
            r#"UPDATE tasks SET status = ?, version = ?, record = ?, updated_at = ?
               WHERE id = ? AND version = ?"#
        )
        .bind(task.status.as_str())
        .bind(task.version as i64)
        .bind(&record)
        .bind(task.updated_at.to_rfc3339())
        .bind(task.id as i64)
        .bind(task.version.saturating_sub(1) as i64)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM tasks WHERE id = ?")
                .bind(task.id as i64)
                .fetch_optional(&self.pool)
                .await?;

            return Err(match exists {
                Some(_) => DomainError::ConcurrencyConflict { id: task.id },
                None => DomainError::TaskNotFound(task.id),
            });
        }

        Ok(())
    }

    async fn next_id(&self) -> DomainResult<TaskId> {
        let (next_id,): (i64,) = sqlx::query_as(
            "SELECT next_id FROM task_counter WHERE singleton = 0"
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(next_id as TaskId)
    }

    async fn list(&self, filter: TaskFilter) -> DomainResult<Vec<Task>> {
        let mut query = String::from("SELECT id, record FROM tasks WHERE 1=1");
        if filter.status.is_some() {
            query.push_str(" AND status = ?");
        }
        query.push_str(" ORDER BY id");
        if filter.limit.is_some() {
            query.push_str(" LIMIT ?");
        }

        let mut q = sqlx::query_as::<_, TaskRow>(&query);
        if let Some(status) = filter.status {
            q = q.bind(status.as_str());
        }
        if let Some(limit) = filter.limit {
            q = q.bind(limit as i64);
        }

        let rows: Vec<TaskRow> = q.fetch_all(&self.pool).await?;
        rows.into_iter().map(Task::try_from).collect()
    }

    async fn count_by_status(&self) -> DomainResult<HashMap<TaskStatus, u64>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM tasks GROUP BY status"
        )
        .fetch_all(&self.pool)
        .await?;

        let mut counts = HashMap::new();
        for (status_str, count) in rows {
            if let Some(status) = TaskStatus::from_str(&status_str) {
                counts.insert(status, count as u64);
            }
        }
        Ok(counts)
    }
}

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: i64,
    record: String,
}

impl TryFrom<TaskRow> for Task {
    type Error = DomainError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let task = Task::from_record(&row.record)?;
        if task.id != row.id as TaskId {
            return Err(DomainError::SerializationError(format!(
                "Record for row {} carries id {}",
                row.id, task.id
            )));
        }
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;
    use crate::domain::models::Identity;

    async fn setup_test_repo() -> SqliteTaskRepository {
        let pool = create_migrated_test_pool().await.unwrap();
        SqliteTaskRepository::new(pool)
    }

    fn new_task(title: &str) -> NewTask {
        NewTask {
            creator: Identity::new("alice"),
            title: title.to_string(),
            description: "Description".to_string(),
            criteria: "Criteria".to_string(),
            reward: 10,
        }
    }

    #[tokio::test]
    async fn test_create_allocates_sequential_ids() {
        let repo = setup_test_repo().await;

        for expected in 0..3 {
            let task = repo.create(new_task("Task")).await.unwrap();
            assert_eq!(task.id, expected);
        }
        assert_eq!(repo.next_id().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_create_and_get_task() {
        let repo = setup_test_repo().await;
        let created = repo.create(new_task("Test Task")).await.unwrap();

        let retrieved = repo.get(created.id).await.unwrap().unwrap();
        assert_eq!(retrieved, created);
        assert!(repo.get(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_checks_version() {
        let repo = setup_test_repo().await;
        let created = repo.create(new_task("Task")).await.unwrap();

        let mut claimed = created.clone();
        claimed.claim(Identity::new("bob")).unwrap();
        repo.update(&claimed).await.unwrap();

        // A second writer working from the stale copy loses.
        let mut stale = created;
        stale.claim(Identity::new("carol")).unwrap();
        let err = repo.update(&stale).await.unwrap_err();
        assert!(matches!(err, DomainError::ConcurrencyConflict { id: 0 }));

        let stored = repo.get(0).await.unwrap().unwrap();
        assert_eq!(stored.worker.as_str(), "bob");
    }

    #[tokio::test]
    async fn test_update_unknown_task() {
        let repo = setup_test_repo().await;
        let mut ghost = new_task("Ghost").into_task(7);
        ghost.version = 2;
        let err = repo.update(&ghost).await.unwrap_err();
        assert!(matches!(err, DomainError::TaskNotFound(7)));
    }

    #[tokio::test]
    async fn test_list_and_counts() {
        let repo = setup_test_repo().await;
        for i in 0..4 {
            repo.create(new_task(&format!("Task {i}"))).await.unwrap();
        }
        let mut first = repo.get(0).await.unwrap().unwrap();
        first.claim(Identity::new("bob")).unwrap();
        repo.update(&first).await.unwrap();

        let all = repo.list(TaskFilter::default()).await.unwrap();
        assert_eq!(all.iter().map(|t| t.id).collect::<Vec<_>>(), vec![0, 1, 2, 3]);

        let open = repo
            .list(TaskFilter { status: Some(TaskStatus::Open), limit: Some(2) })
            .await
            .unwrap();
        assert_eq!(open.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 2]);

        let counts = repo.count_by_status().await.unwrap();
        assert_eq!(counts.get(&TaskStatus::Open), Some(&3));
        assert_eq!(counts.get(&TaskStatus::Claimed), Some(&1));
    }
}
