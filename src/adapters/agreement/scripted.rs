//! Deterministic agreement layer returning queued results.

use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::sync::Mutex;

use crate::domain::models::WorkUnit;
use crate::domain::ports::{AgreementError, AgreementLayer};

/// A recorded call into the scripted layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgreementCall {
    ExactMatch { work: WorkUnit },
    Judgment { work: WorkUnit, task: String, criteria: String },
}

/// Agreement layer fake. Each call pops the next scripted result for its
/// strategy; an exhausted script fails the call.
#[derive(Default)]
pub struct ScriptedAgreement {
    exact: Mutex<VecDeque<Result<Option<String>, AgreementError>>>,
    judgments: Mutex<VecDeque<Result<String, AgreementError>>>,
    calls: Mutex<Vec<AgreementCall>>,
}

impl ScriptedAgreement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an agreed fetch result.
    #[must_use]
    pub fn with_evidence(mut self, evidence: Option<&str>) -> Self {
        self.exact.get_mut().push_back(Ok(evidence.map(str::to_string)));
        self
    }

    /// Queue a failed exact-match round.
    #[must_use]
    pub fn with_exact_failure(mut self, error: AgreementError) -> Self {
        self.exact.get_mut().push_back(Err(error));
        self
    }

    /// Queue an agreed judgment text.
    #[must_use]
    pub fn with_judgment(mut self, text: &str) -> Self {
        self.judgments.get_mut().push_back(Ok(text.to_string()));
        self
    }

    /// Queue a failed judgment round.
    #[must_use]
    pub fn with_judgment_failure(mut self, error: AgreementError) -> Self {
        self.judgments.get_mut().push_back(Err(error));
        self
    }

    pub async fn calls(&self) -> Vec<AgreementCall> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl AgreementLayer for ScriptedAgreement {
    async fn exact_match(&self, work: &WorkUnit) -> Result<Option<String>, AgreementError> {
        self.calls
            .lock()
            .await
            .push(AgreementCall::ExactMatch { work: work.clone() });

        self.exact
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(AgreementError::Execution("no scripted exact-match result".to_string())))
    }

    async fn non_comparative_judgment(
        &self,
        work: &WorkUnit,
        task: &str,
        criteria: &str,
    ) -> Result<String, AgreementError> {
        self.calls.lock().await.push(AgreementCall::Judgment {
            work: work.clone(),
            task: task.to_string(),
            criteria: criteria.to_string(),
        });

        self.judgments
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(AgreementError::Execution("no scripted judgment".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_results_are_served_in_order() {
        let agreement = ScriptedAgreement::new()
            .with_evidence(Some("first"))
            .with_evidence(None)
            .with_judgment("VERIFIED: ok");

        let work = WorkUnit::fetch_text("http://x");
        assert_eq!(agreement.exact_match(&work).await.unwrap().as_deref(), Some("first"));
        assert_eq!(agreement.exact_match(&work).await.unwrap(), None);
        assert!(agreement.exact_match(&work).await.is_err());

        let judged = agreement
            .non_comparative_judgment(&WorkUnit::prompt("p"), "t", "c")
            .await
            .unwrap();
        assert_eq!(judged, "VERIFIED: ok");
        assert_eq!(agreement.calls().await.len(), 4);
    }
}
