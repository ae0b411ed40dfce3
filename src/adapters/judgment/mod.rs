//! Judgment engine adapters.

pub mod anthropic;
pub mod mock;

pub use anthropic::AnthropicJudgmentEngine;
pub use mock::{MockJudgmentEngine, MockResponse};
