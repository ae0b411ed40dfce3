//! Task lifecycle service.
//!
//! Drives tasks through `open -> claimed -> submitted -> verified | rejected`
//! and answers read-only queries over the store. Verification reaches the
//! evidence fetcher and the judgment engine only through the agreement layer.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    evidence_sufficient, truncate_evidence, Identity, JudgmentPrompt, NewTask, Task, TaskId,
    TaskStatus, Verdict, VerificationConfig, VerificationOutcome, VerifyRefusal, WorkUnit,
    EVIDENCE_UNAVAILABLE,
};
use crate::domain::ports::{AgreementLayer, TaskFilter, TaskRepository};

/// Sentinel returned by [`TaskLifecycleService::get_task_status`] for unknown ids.
pub const STATUS_NOT_FOUND: &str = "not_found";

/// Record returned by [`TaskLifecycleService::get_task`] for unknown ids.
pub const EMPTY_RECORD: &str = "{}";

pub struct TaskLifecycleService<R: TaskRepository> {
    task_repo: Arc<R>,
    agreement: Arc<dyn AgreementLayer>,
    verification: VerificationConfig,
    /// Serializes every mutating operation, including the agreement rounds of a verification.
    write_lock: Mutex<()>,
}

impl<R: TaskRepository> TaskLifecycleService<R> {
    pub fn new(task_repo: Arc<R>, agreement: Arc<dyn AgreementLayer>) -> Self {
        Self {
            task_repo,
            agreement,
            verification: VerificationConfig::default(),
            write_lock: Mutex::new(()),
        }
    }

    /// Create with custom evidence limits and classification.
    #[must_use]
    pub fn with_verification_config(mut self, config: VerificationConfig) -> Self {
        self.verification = config;
        self
    }

    /// Create an open task owned by `caller` and return its id.
    pub async fn create_task(
        &self,
        caller: &Identity,
        title: impl Into<String>,
        description: impl Into<String>,
        criteria: impl Into<String>,
        reward: u64,
    ) -> DomainResult<TaskId> {
        let _guard = self.write_lock.lock().await;

        let task = self
            .task_repo
            .create(NewTask {
                creator: caller.clone(),
                title: title.into(),
                description: description.into(),
                criteria: criteria.into(),
                reward,
            })
            .await?;

        info!(task_id = task.id, creator = %caller, reward, "task created");
        Ok(task.id)
    }

    /// Claim an open task for `caller`. Returns `false` without any change
    /// when the task is unknown or not open.
    pub async fn claim_task(&self, caller: &Identity, id: TaskId) -> DomainResult<bool> {
        let _guard = self.write_lock.lock().await;

        let Some(mut task) = self.task_repo.get(id).await? else {
            warn!(task_id = id, caller = %caller, "claim refused: task not found");
            return Ok(false);
        };
        if !task.can_transition_to(TaskStatus::Claimed) {
            warn!(task_id = id, caller = %caller, status = %task.status, "claim refused");
            return Ok(false);
        }

        task.claim(caller.clone())
            .map_err(|_| transition_error(&task, TaskStatus::Claimed))?;
        self.task_repo.update(&task).await?;

        info!(task_id = id, worker = %caller, "task claimed");
        Ok(true)
    }

    /// Record the proof URL of a claimed task. Returns `false` without any
    /// change when the task is unknown or not claimed.
    pub async fn submit_proof(
        &self,
        caller: &Identity,
        id: TaskId,
        proof_url: impl Into<String>,
    ) -> DomainResult<bool> {
        let _guard = self.write_lock.lock().await;

        let Some(mut task) = self.task_repo.get(id).await? else {
            warn!(task_id = id, caller = %caller, "submission refused: task not found");
            return Ok(false);
        };
        if !task.can_transition_to(TaskStatus::Submitted) {
            warn!(task_id = id, caller = %caller, status = %task.status, "submission refused");
            return Ok(false);
        }

        task.submit(proof_url)
            .map_err(|_| transition_error(&task, TaskStatus::Submitted))?;
        self.task_repo.update(&task).await?;

        info!(task_id = id, caller = %caller, proof_url = %task.proof_url, "proof submitted");
        Ok(true)
    }

    /// Decide a submitted task.
    ///
    /// Refusals and rejections are returned as outcomes. An `Err` means the
    /// round was aborted (agreement or storage failure) and the task is
    /// exactly as it was before the call.
    pub async fn verify_completion(&self, id: TaskId) -> DomainResult<VerificationOutcome> {
        let _guard = self.write_lock.lock().await;

        let Some(task) = self.task_repo.get(id).await? else {
            return Ok(VerificationOutcome::Error { reason: VerifyRefusal::TaskNotFound });
        };
        if task.status != TaskStatus::Submitted {
            debug!(task_id = id, status = %task.status, "verification refused");
            return Ok(VerificationOutcome::Error { reason: VerifyRefusal::NotSubmitted });
        }

        let fetch = WorkUnit::fetch_text(task.proof_url.clone());
        let evidence = self.agreement.exact_match(&fetch).await.map_err(|e| {
            warn!(task_id = id, error = %e, "evidence agreement failed");
            e.into_domain(&fetch)
        })?;

        let Some(evidence) = evidence
            .filter(|e| evidence_sufficient(Some(e.as_str()), self.verification.min_evidence_chars))
        else {
            info!(task_id = id, "rejecting task: evidence missing or too short");
            return self
                .conclude(task, Verdict::Rejected, EVIDENCE_UNAVAILABLE.to_string())
                .await;
        };

        let evidence = truncate_evidence(&evidence, self.verification.max_evidence_chars);
        let judgment = JudgmentPrompt::for_task(&task, evidence);
        let work = judgment.work_unit();
        let text = self
            .agreement
            .non_comparative_judgment(&work, &judgment.task, &judgment.criteria)
            .await
            .map_err(|e| {
                warn!(task_id = id, error = %e, "judgment agreement failed");
                e.into_domain(&work)
            })?;

        let verdict = Verdict::classify(&text, self.verification.verdict_match);
        self.conclude(task, verdict, text).await
    }

    async fn conclude(
        &self,
        mut task: Task,
        verdict: Verdict,
        result: String,
    ) -> DomainResult<VerificationOutcome> {
        let status = verdict.status();
        task.conclude(status, result.clone())
            .map_err(|_| transition_error(&task, status))?;
        self.task_repo.update(&task).await?;

        info!(task_id = task.id, status = %status, "verification concluded");
        Ok(VerificationOutcome::concluded(verdict, result))
    }

    /// The task record as JSON, or `{}` when unknown.
    pub async fn get_task(&self, id: TaskId) -> DomainResult<String> {
        match self.task_repo.get(id).await? {
            Some(task) => Ok(task.to_record()?),
            None => Ok(EMPTY_RECORD.to_string()),
        }
    }

    /// The typed task record.
    pub async fn find_task(&self, id: TaskId) -> DomainResult<Option<Task>> {
        self.task_repo.get(id).await
    }

    /// Lowercase status name, or `not_found`.
    pub async fn get_task_status(&self, id: TaskId) -> DomainResult<String> {
        Ok(self
            .task_repo
            .get(id)
            .await?
            .map_or_else(|| STATUS_NOT_FOUND.to_string(), |t| t.status.as_str().to_string()))
    }

    /// Number of ids ever allocated.
    pub async fn get_total_tasks(&self) -> DomainResult<u64> {
        self.task_repo.next_id().await
    }

    pub async fn list_tasks(&self, filter: TaskFilter) -> DomainResult<Vec<Task>> {
        self.task_repo.list(filter).await
    }

    pub async fn get_status_counts(&self) -> DomainResult<HashMap<TaskStatus, u64>> {
        self.task_repo.count_by_status().await
    }
}

fn transition_error(task: &Task, to: TaskStatus) -> DomainError {
    DomainError::InvalidStateTransition {
        from: task.status.as_str().to_string(),
        to: to.as_str().to_string(),
    }
}
