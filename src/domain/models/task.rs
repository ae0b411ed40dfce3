//! Task domain model.
//!
//! A task is a unit of bounty work. It moves forward through a fixed
//! progression and ends in one of two terminal states:
//! `Open -> Claimed -> Submitted -> {Verified | Rejected}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer task identifier, allocated sequentially from 0.
pub type TaskId = u64;

/// Status of a task in the bounty lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created and waiting for a worker
    #[default]
    Open,
    /// A worker has taken the task
    Claimed,
    /// Proof URL submitted, awaiting verification
    Submitted,
    /// Evidence judged to satisfy the criteria
    Verified,
    /// Evidence missing or judged insufficient
    Rejected,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Claimed => "claimed",
            Self::Submitted => "submitted",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "open" => Some(Self::Open),
            "claimed" => Some(Self::Claimed),
            "submitted" => Some(Self::Submitted),
            "verified" => Some(Self::Verified),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Verified | Self::Rejected)
    }

    /// Valid transitions from this status. Only forward, one step at a time.
    pub fn valid_transitions(&self) -> Vec<TaskStatus> {
        match self {
            Self::Open => vec![Self::Claimed],
            Self::Claimed => vec![Self::Submitted],
            Self::Submitted => vec![Self::Verified, Self::Rejected],
            Self::Verified | Self::Rejected => vec![],
        }
    }

    pub fn can_transition_to(&self, new_status: Self) -> bool {
        self.valid_transitions().contains(&new_status)
    }

    pub fn all() -> [TaskStatus; 5] {
        [
            Self::Open,
            Self::Claimed,
            Self::Submitted,
            Self::Verified,
            Self::Rejected,
        ]
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a caller (task creator or worker).
///
/// Passed explicitly into every lifecycle operation. The empty identity
/// marks a worker slot that has not been filled yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Input for creating a task. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub creator: Identity,
    pub title: String,
    pub description: String,
    pub criteria: String,
    pub reward: u64,
}

impl NewTask {
    /// Build the Open record for an allocated id.
    pub fn into_task(self, id: TaskId) -> Task {
        let now = Utc::now();
        Task {
            id,
            creator: self.creator,
            title: self.title,
            description: self.description,
            criteria: self.criteria,
            reward: self.reward,
            status: TaskStatus::Open,
            worker: Identity::default(),
            proof_url: String::new(),
            result: String::new(),
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }
}

/// A bounty task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Sequential identifier
    pub id: TaskId,
    /// Who created the task
    pub creator: Identity,
    /// Human-readable title
    pub title: String,
    /// What the work is
    pub description: String,
    /// Free-text success condition
    pub criteria: String,
    /// Reward amount, recorded but never transferred here
    pub reward: u64,
    /// Current status
    pub status: TaskStatus,
    /// Claimant, empty until claimed
    pub worker: Identity,
    /// Proof location, empty until submitted
    pub proof_url: String,
    /// Verification explanation, empty until terminal
    pub result: String,
    /// When created
    pub created_at: DateTime<Utc>,
    /// When last mutated
    pub updated_at: DateTime<Utc>,
    /// Version for optimistic locking
    pub version: u64,
}

impl Task {
    /// Check if can transition to given status.
    pub fn can_transition_to(&self, new_status: TaskStatus) -> bool {
        self.status.can_transition_to(new_status)
    }

    fn transition_to(&mut self, new_status: TaskStatus) -> Result<(), String> {
        if !self.can_transition_to(new_status) {
            return Err(format!(
                "Cannot transition from {} to {}",
                self.status.as_str(),
                new_status.as_str()
            ));
        }

        self.status = new_status;
        self.updated_at = Utc::now();
        self.version += 1;
        Ok(())
    }

    /// Open -> Claimed, recording the worker.
    pub fn claim(&mut self, worker: Identity) -> Result<(), String> {
        self.transition_to(TaskStatus::Claimed)?;
        self.worker = worker;
        Ok(())
    }

    /// Claimed -> Submitted, recording the proof URL.
    pub fn submit(&mut self, proof_url: impl Into<String>) -> Result<(), String> {
        self.transition_to(TaskStatus::Submitted)?;
        self.proof_url = proof_url.into();
        Ok(())
    }

    /// Submitted -> Verified or Rejected, recording the explanation.
    pub fn conclude(&mut self, status: TaskStatus, result: impl Into<String>) -> Result<(), String> {
        if !status.is_terminal() {
            return Err(format!("{} is not a terminal status", status.as_str()));
        }
        self.transition_to(status)?;
        self.result = result.into();
        Ok(())
    }

    /// Check if task is terminal.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Encode the record in its persisted text form.
    pub fn to_record(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decode a persisted record.
    pub fn from_record(record: &str) -> serde_json::Result<Self> {
        serde_json::from_str(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_task() -> Task {
        NewTask {
            creator: Identity::new("alice"),
            title: "Write article".to_string(),
            description: "Publish a post".to_string(),
            criteria: "Must be published on blog".to_string(),
            reward: 100,
        }
        .into_task(0)
    }

    #[test]
    fn test_new_task_is_open_and_empty() {
        let task = open_task();
        assert_eq!(task.status, TaskStatus::Open);
        assert!(task.worker.is_empty());
        assert!(task.proof_url.is_empty());
        assert!(task.result.is_empty());
        assert_eq!(task.version, 1);
    }

    #[test]
    fn test_forward_progression() {
        let mut task = open_task();

        task.claim(Identity::new("bob")).unwrap();
        assert_eq!(task.status, TaskStatus::Claimed);
        assert_eq!(task.worker.as_str(), "bob");

        task.submit("http://example.com/article").unwrap();
        assert_eq!(task.status, TaskStatus::Submitted);
        assert_eq!(task.proof_url, "http://example.com/article");

        task.conclude(TaskStatus::Verified, "VERIFIED: ok").unwrap();
        assert!(task.is_terminal());
        assert_eq!(task.result, "VERIFIED: ok");
        assert_eq!(task.version, 4);
    }

    #[test]
    fn test_no_skipping_or_going_back() {
        let mut task = open_task();
        assert!(task.submit("http://x").is_err());
        assert!(task.conclude(TaskStatus::Verified, "x").is_err());
        assert_eq!(task.status, TaskStatus::Open);
        assert!(task.proof_url.is_empty());

        task.claim(Identity::new("bob")).unwrap();
        assert!(task.claim(Identity::new("carol")).is_err());
        assert_eq!(task.worker.as_str(), "bob");
    }

    #[test]
    fn test_terminal_is_final() {
        let mut task = open_task();
        task.claim(Identity::new("bob")).unwrap();
        task.submit("http://x").unwrap();
        task.conclude(TaskStatus::Rejected, "nope").unwrap();

        assert!(task.conclude(TaskStatus::Verified, "yes").is_err());
        assert_eq!(task.status, TaskStatus::Rejected);
        assert_eq!(task.result, "nope");
    }

    #[test]
    fn test_conclude_requires_terminal_status() {
        let mut task = open_task();
        task.claim(Identity::new("bob")).unwrap();
        task.submit("http://x").unwrap();
        assert!(task.conclude(TaskStatus::Claimed, "x").is_err());
        assert_eq!(task.status, TaskStatus::Submitted);
    }

    #[test]
    fn test_status_strings_round_trip() {
        for status in TaskStatus::all() {
            assert_eq!(TaskStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(TaskStatus::from_str("VERIFIED"), Some(TaskStatus::Verified));
        assert_eq!(TaskStatus::from_str("complete"), None);
    }

    #[test]
    fn test_record_codec_round_trip() {
        let mut task = open_task();
        task.claim(Identity::new("bob")).unwrap();
        let record = task.to_record().unwrap();
        assert_eq!(Task::from_record(&record).unwrap(), task);
        assert!(Task::from_record("{}").is_err());
    }

    #[test]
    fn test_record_json_uses_lowercase_status() {
        let task = open_task();
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["status"], "open");
        assert_eq!(json["worker"], "");
        assert_eq!(json["creator"], "alice");
    }
}
