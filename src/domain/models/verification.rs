//! Verification domain model.
//!
//! Describes the non-deterministic units of work handed to the agreement
//! layer, the judgment prompt, and the outcome of a verification round.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::task::{Task, TaskStatus};

/// Fixed explanation stored when the proof URL yields no usable evidence.
pub const EVIDENCE_UNAVAILABLE: &str = "Could not access proof URL";

/// How fetched content should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    /// Readable text extracted from the page
    Text,
}

impl FetchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
        }
    }
}

/// Description of a non-deterministic operation to be agreed upon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkUnit {
    /// Fetch a URL and extract its content.
    FetchEvidence { url: String, mode: FetchMode },
    /// Run a prompt through the judgment engine.
    ExecPrompt { prompt: String },
}

impl WorkUnit {
    pub fn fetch_text(url: impl Into<String>) -> Self {
        Self::FetchEvidence {
            url: url.into(),
            mode: FetchMode::Text,
        }
    }

    pub fn prompt(prompt: impl Into<String>) -> Self {
        Self::ExecPrompt {
            prompt: prompt.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::FetchEvidence { .. } => "fetch_evidence",
            Self::ExecPrompt { .. } => "exec_prompt",
        }
    }
}

/// How the agreed judgment text is classified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictMatch {
    /// Case-insensitive substring `VERIFIED` anywhere in the text.
    ///
    /// Misclassifies negations such as "NOT VERIFIED".
    #[default]
    Contains,
    /// Trimmed text must start with `VERIFIED:` (case-insensitive).
    Prefix,
}

/// Classification of a judgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Verified,
    Rejected,
}

impl Verdict {
    /// Classify agreed judgment text.
    pub fn classify(text: &str, matching: VerdictMatch) -> Self {
        let upper = text.to_uppercase();
        let verified = match matching {
            VerdictMatch::Contains => upper.contains("VERIFIED"),
            VerdictMatch::Prefix => upper.trim_start().starts_with("VERIFIED:"),
        };
        if verified {
            Self::Verified
        } else {
            Self::Rejected
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Verified => "VERIFIED",
            Self::Rejected => "REJECTED",
        }
    }

    pub fn status(&self) -> TaskStatus {
        match self {
            Self::Verified => TaskStatus::Verified,
            Self::Rejected => TaskStatus::Rejected,
        }
    }

    /// Outcome message for a stored result. Always starts with the uppercase
    /// label; a label the judgment already carries is normalized, not doubled.
    pub fn message(&self, result: &str) -> String {
        let label = self.label();
        let head_len = label.len() + 1;
        match result.get(..head_len) {
            Some(head) if head.eq_ignore_ascii_case(&format!("{label}:")) => {
                format!("{label}:{}", &result[head_len..])
            }
            _ => format!("{label}: {result}"),
        }
    }
}

/// Why a verification request was refused without touching the task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyRefusal {
    TaskNotFound,
    NotSubmitted,
}

impl VerifyRefusal {
    pub fn message(&self) -> &'static str {
        match self {
            Self::TaskNotFound => "ERROR: Task not found",
            Self::NotSubmitted => "ERROR: Task not in submitted state",
        }
    }
}

/// Business result of `verify_completion`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum VerificationOutcome {
    Verified { result: String },
    Rejected { result: String },
    Error { reason: VerifyRefusal },
}

impl VerificationOutcome {
    pub fn concluded(verdict: Verdict, result: impl Into<String>) -> Self {
        let result = result.into();
        match verdict {
            Verdict::Verified => Self::Verified { result },
            Verdict::Rejected => Self::Rejected { result },
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// The outcome string: `VERIFIED: ...`, `REJECTED: ...` or `ERROR: ...`.
    pub fn message(&self) -> String {
        match self {
            Self::Verified { result } => Verdict::Verified.message(result),
            Self::Rejected { result } => Verdict::Rejected.message(result),
            Self::Error { reason } => reason.message().to_string(),
        }
    }
}

impl fmt::Display for VerificationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Whether fetched evidence is long enough to judge.
pub fn evidence_sufficient(evidence: Option<&str>, min_chars: usize) -> bool {
    evidence.is_some_and(|e| e.chars().count() >= min_chars)
}

/// First `max_chars` characters of the evidence.
pub fn truncate_evidence(evidence: &str, max_chars: usize) -> &str {
    match evidence.char_indices().nth(max_chars) {
        Some((idx, _)) => &evidence[..idx],
        None => evidence,
    }
}

/// Judgment request for one task and its (already truncated) evidence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JudgmentPrompt {
    pub prompt: String,
    /// Task statement given to validators
    pub task: String,
    /// Acceptance criteria given to validators
    pub criteria: String,
}

impl JudgmentPrompt {
    pub fn for_task(task: &Task, evidence: &str) -> Self {
        let prompt = format!(
            "You are verifying task completion for a bounty system.\n\n\
             TASK TITLE: {title}\n\n\
             TASK DESCRIPTION: {description}\n\n\
             VERIFICATION CRITERIA: {criteria}\n\n\
             SUBMITTED EVIDENCE (from {url}):\n\
             {evidence}\n\n\
             Based on the evidence, determine if the task is completed.\n\n\
             Respond with EXACTLY one of:\n\
             VERIFIED: [brief explanation]\n\
             OR\n\
             REJECTED: [brief explanation]",
            title = task.title,
            description = task.description,
            criteria = task.criteria,
            url = task.proof_url,
        );

        Self {
            prompt,
            task: format!("Verify task completion for: {}", task.title),
            criteria: format!(
                "Assessment must reflect whether evidence satisfies: {}",
                task.criteria
            ),
        }
    }

    pub fn work_unit(&self) -> WorkUnit {
        WorkUnit::prompt(self.prompt.clone())
    }
}
