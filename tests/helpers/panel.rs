//! Evaluator panels built from static pages and mock engines.

use std::sync::Arc;

use bounty_verifier::adapters::agreement::{Evaluator, LocalAgreement, VALIDATION_PREAMBLE};
use bounty_verifier::adapters::judgment::{MockJudgmentEngine, MockResponse};
use bounty_verifier::adapters::web::StaticEvidenceFetcher;

pub const PROOF_URL: &str = "https://example.com/proof";

/// Long enough to clear the default minimum.
pub const EVIDENCE: &str = "The README now documents every public endpoint of the API, \
                            including request and response examples for each route.";

/// Engine answering judgments with `judgment` and validations with `vote`.
pub fn engine(judgment: &str, vote: &str) -> Arc<MockJudgmentEngine> {
    Arc::new(
        MockJudgmentEngine::with_default_response(MockResponse::success(judgment))
            .with_response_containing(VALIDATION_PREAMBLE, MockResponse::success(vote)),
    )
}

/// `size` evaluators that all see `page` at [`PROOF_URL`] and share `engine`.
pub fn panel(size: usize, page: Option<&str>, engine: &Arc<MockJudgmentEngine>) -> LocalAgreement {
    let fetcher = match page {
        Some(text) => StaticEvidenceFetcher::new().with_page(PROOF_URL, text),
        None => StaticEvidenceFetcher::new(),
    };
    let fetcher = Arc::new(fetcher);

    let evaluators = (0..size)
        .map(|_| Evaluator::new(fetcher.clone(), engine.clone()))
        .collect();
    LocalAgreement::new(evaluators).expect("panel needs at least one evaluator")
}

/// A panel whose members fetch different text for the same URL.
pub fn split_panel(pages: &[&str], engine: &Arc<MockJudgmentEngine>) -> LocalAgreement {
    let evaluators = pages
        .iter()
        .map(|page| {
            let fetcher = StaticEvidenceFetcher::new().with_page(PROOF_URL, *page);
            Evaluator::new(Arc::new(fetcher), engine.clone())
        })
        .collect();
    LocalAgreement::new(evaluators).expect("panel needs at least one evaluator")
}
