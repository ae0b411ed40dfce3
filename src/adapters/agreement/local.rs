//! In-process evaluator panel.
//!
//! Runs each unit of work on several independent evaluators and applies
//! the two agreement strategies locally. The quorum rules of a real
//! distributed agreement layer are not modelled: exact match needs every
//! evaluator to agree and judgment needs every validator to accept.

use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::domain::models::WorkUnit;
use crate::domain::ports::{AgreementError, AgreementLayer, EvidenceFetcher, JudgmentEngine};

/// First line of every validation prompt.
pub const VALIDATION_PREAMBLE: &str = "You are validating the output of another evaluator.";

/// One independent member of the panel.
#[derive(Clone)]
pub struct Evaluator {
    pub fetcher: Arc<dyn EvidenceFetcher>,
    pub engine: Arc<dyn JudgmentEngine>,
}

impl Evaluator {
    pub fn new(fetcher: Arc<dyn EvidenceFetcher>, engine: Arc<dyn JudgmentEngine>) -> Self {
        Self { fetcher, engine }
    }

    async fn run(&self, work: &WorkUnit) -> Result<Option<String>, AgreementError> {
        match work {
            WorkUnit::FetchEvidence { url, mode } => self
                .fetcher
                .fetch(url, *mode)
                .await
                .map_err(|e| AgreementError::Execution(e.to_string())),
            WorkUnit::ExecPrompt { prompt } => self
                .engine
                .execute(prompt)
                .await
                .map(Some)
                .map_err(|e| AgreementError::Execution(e.to_string())),
        }
    }

    async fn accepts(&self, prompt: &str) -> Result<bool, AgreementError> {
        let answer = self
            .engine
            .execute(prompt)
            .await
            .map_err(|e| AgreementError::Execution(e.to_string()))?;
        Ok(parse_acceptance(&answer))
    }
}

pub struct LocalAgreement {
    evaluators: Vec<Evaluator>,
}

impl LocalAgreement {
    pub fn new(evaluators: Vec<Evaluator>) -> Result<Self, AgreementError> {
        if evaluators.is_empty() {
            return Err(AgreementError::NoQuorum("panel has no evaluators".to_string()));
        }
        Ok(Self { evaluators })
    }

    pub fn size(&self) -> usize {
        self.evaluators.len()
    }
}

#[async_trait]
impl AgreementLayer for LocalAgreement {
    #[instrument(skip(self, work), fields(round = %Uuid::new_v4(), kind = work.kind(), evaluators = self.evaluators.len()))]
    async fn exact_match(&self, work: &WorkUnit) -> Result<Option<String>, AgreementError> {
        let results = join_all(self.evaluators.iter().map(|e| e.run(work))).await;

        let mut outputs = Vec::with_capacity(results.len());
        for result in results {
            outputs.push(result?);
        }

        let (first, rest) = outputs
            .split_first()
            .ok_or_else(|| AgreementError::NoQuorum("panel has no evaluators".to_string()))?;
        if let Some(pos) = rest.iter().position(|o| o != first) {
            warn!(evaluator = pos + 1, "evaluator output differs from evaluator 0");
            return Err(AgreementError::Disagreement(format!(
                "evaluator {} produced a different result than evaluator 0",
                pos + 1
            )));
        }

        debug!(has_value = first.is_some(), "exact match agreed");
        Ok(first.clone())
    }

    #[instrument(skip(self, work, task, criteria), fields(round = %Uuid::new_v4(), kind = work.kind(), evaluators = self.evaluators.len()))]
    async fn non_comparative_judgment(
        &self,
        work: &WorkUnit,
        task: &str,
        criteria: &str,
    ) -> Result<String, AgreementError> {
        let (leader, validators) = self
            .evaluators
            .split_first()
            .ok_or_else(|| AgreementError::NoQuorum("panel has no evaluators".to_string()))?;

        let output = leader
            .run(work)
            .await?
            .ok_or_else(|| AgreementError::Execution("leader produced no output".to_string()))?;

        if validators.is_empty() {
            return Ok(output);
        }

        let prompt = validation_prompt(work, task, criteria, &output);
        let votes = join_all(validators.iter().map(|v| v.accepts(&prompt))).await;

        let mut rejections = 0;
        for vote in votes {
            if !vote? {
                rejections += 1;
            }
        }

        if rejections > 0 {
            warn!(rejections, validators = validators.len(), "leader output not accepted");
            return Err(AgreementError::NoQuorum(format!(
                "{rejections} of {} validators rejected the leader output",
                validators.len()
            )));
        }

        debug!(validators = validators.len(), "leader output accepted");
        Ok(output)
    }
}

fn validation_prompt(work: &WorkUnit, task: &str, criteria: &str, output: &str) -> String {
    let input = match work {
        WorkUnit::ExecPrompt { prompt } => prompt.as_str(),
        WorkUnit::FetchEvidence { url, .. } => url.as_str(),
    };
    format!(
        "{VALIDATION_PREAMBLE}\n\n\
         TASK: {task}\n\n\
         CRITERIA: {criteria}\n\n\
         ORIGINAL INPUT:\n{input}\n\n\
         OUTPUT UNDER REVIEW:\n{output}\n\n\
         Judge the output on its own merits; it does not need to match what you would have written.\n\
         Answer ACCEPT if it is an acceptable result for the task under the criteria, otherwise REJECT."
    )
}

/// The word `ACCEPT` opening the first non-empty line accepts; anything else rejects.
fn parse_acceptance(answer: &str) -> bool {
    const WORD: &str = "ACCEPT";
    answer
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .and_then(|line| line.get(..WORD.len()).map(|head| (head, &line[WORD.len()..])))
        .is_some_and(|(head, rest)| {
            head.eq_ignore_ascii_case(WORD)
                && !rest.chars().next().is_some_and(char::is_alphanumeric)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::judgment::{MockJudgmentEngine, MockResponse};
    use crate::adapters::web::StaticEvidenceFetcher;

    const URL: &str = "http://example.com/article";

    fn evaluator(page: &str, judgment: &str, validation: &str) -> Evaluator {
        let fetcher = StaticEvidenceFetcher::new().with_page(URL, page);
        let engine = MockJudgmentEngine::with_default_response(MockResponse::success(judgment))
            .with_response_containing(VALIDATION_PREAMBLE, MockResponse::success(validation));
        Evaluator::new(Arc::new(fetcher), Arc::new(engine))
    }

    fn panel(members: Vec<Evaluator>) -> LocalAgreement {
        LocalAgreement::new(members).unwrap()
    }

    #[test]
    fn test_empty_panel_is_refused() {
        assert!(matches!(LocalAgreement::new(vec![]), Err(AgreementError::NoQuorum(_))));
    }

    #[tokio::test]
    async fn test_exact_match_agrees_on_identical_output() {
        let agreement = panel(vec![
            evaluator("same page", "", "ACCEPT"),
            evaluator("same page", "", "ACCEPT"),
            evaluator("same page", "", "ACCEPT"),
        ]);
        let value = agreement.exact_match(&WorkUnit::fetch_text(URL)).await.unwrap();
        assert_eq!(value.as_deref(), Some("same page"));
    }

    #[tokio::test]
    async fn test_exact_match_agrees_on_absence() {
        let agreement = panel(vec![
            evaluator("page", "", "ACCEPT"),
            evaluator("page", "", "ACCEPT"),
        ]);
        let value = agreement
            .exact_match(&WorkUnit::fetch_text("http://unknown.example"))
            .await
            .unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_exact_match_fails_on_any_difference() {
        let agreement = panel(vec![
            evaluator("page v1", "", "ACCEPT"),
            evaluator("page v1", "", "ACCEPT"),
            evaluator("page v2", "", "ACCEPT"),
        ]);
        let err = agreement.exact_match(&WorkUnit::fetch_text(URL)).await.unwrap_err();
        assert!(matches!(err, AgreementError::Disagreement(msg) if msg.contains("evaluator 2")));
    }

    #[tokio::test]
    async fn test_judgment_accepts_differently_phrased_panel() {
        let agreement = panel(vec![
            evaluator("", "VERIFIED: meets criteria", "ACCEPT"),
            evaluator("", "VERIFIED: the article is live", "accept - consistent"),
            evaluator("", "Verified, looks fine", "\n  ACCEPT\nreasoning..."),
        ]);
        let text = agreement
            .non_comparative_judgment(&WorkUnit::prompt("judge"), "task", "criteria")
            .await
            .unwrap();
        assert_eq!(text, "VERIFIED: meets criteria");
    }

    #[tokio::test]
    async fn test_judgment_fails_when_a_validator_rejects() {
        let agreement = panel(vec![
            evaluator("", "VERIFIED: meets criteria", "ACCEPT"),
            evaluator("", "", "ACCEPT"),
            evaluator("", "", "REJECT: the evidence contradicts this"),
        ]);
        let err = agreement
            .non_comparative_judgment(&WorkUnit::prompt("judge"), "task", "criteria")
            .await
            .unwrap_err();
        assert!(matches!(err, AgreementError::NoQuorum(msg) if msg.starts_with("1 of 2")));
    }

    #[tokio::test]
    async fn test_single_evaluator_output_is_taken_as_is() {
        let agreement = panel(vec![evaluator("", "REJECTED: nothing there", "REJECT")]);
        let text = agreement
            .non_comparative_judgment(&WorkUnit::prompt("judge"), "task", "criteria")
            .await
            .unwrap();
        assert_eq!(text, "REJECTED: nothing there");
    }

    #[tokio::test]
    async fn test_validators_see_task_and_criteria() {
        let validator_engine = Arc::new(
            MockJudgmentEngine::with_default_response(MockResponse::success("ACCEPT")),
        );
        let agreement = panel(vec![
            evaluator("", "VERIFIED: ok", "ACCEPT"),
            Evaluator::new(Arc::new(StaticEvidenceFetcher::new()), validator_engine.clone()),
        ]);
        agreement
            .non_comparative_judgment(&WorkUnit::prompt("the judgment prompt"), "Verify X", "Must Y")
            .await
            .unwrap();

        let prompts = validator_engine.prompts().await;
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].starts_with(VALIDATION_PREAMBLE));
        assert!(prompts[0].contains("TASK: Verify X"));
        assert!(prompts[0].contains("CRITERIA: Must Y"));
        assert!(prompts[0].contains("the judgment prompt"));
        assert!(prompts[0].contains("OUTPUT UNDER REVIEW:\nVERIFIED: ok"));
    }

    #[tokio::test]
    async fn test_engine_failure_is_execution_error() {
        let failing = Evaluator::new(
            Arc::new(StaticEvidenceFetcher::new()),
            Arc::new(MockJudgmentEngine::with_default_response(MockResponse::failure("down"))),
        );
        let agreement = panel(vec![failing]);
        let err = agreement
            .non_comparative_judgment(&WorkUnit::prompt("judge"), "task", "criteria")
            .await
            .unwrap_err();
        assert!(matches!(err, AgreementError::Execution(_)));
    }

    #[test]
    fn test_parse_acceptance() {
        assert!(parse_acceptance("ACCEPT"));
        assert!(parse_acceptance("\n accept: fine"));
        assert!(!parse_acceptance("REJECT"));
        assert!(!parse_acceptance(""));
        assert!(!parse_acceptance("I would ACCEPT this"));
        assert!(parse_acceptance("Accept."));
        assert!(!parse_acceptance("ACCEPTABLE? No."));
        assert!(!parse_acceptance("accepted"));
    }
}
