//! Mock judgment engine for testing.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{JudgmentEngine, JudgmentError};

/// Mock response configuration.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// Output text
    pub output: String,
    /// Whether to simulate failure
    pub fail: bool,
    /// Error message if failing
    pub error_message: Option<String>,
}

impl Default for MockResponse {
    fn default() -> Self {
        Self {
            output: "VERIFIED: Mock judgment accepted the evidence.".to_string(),
            fail: false,
            error_message: None,
        }
    }
}

impl MockResponse {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            ..Default::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            fail: true,
            error_message: Some(error.into()),
            ..Default::default()
        }
    }
}

/// Mock engine answering from a default response, overridden per prompt substring.
pub struct MockJudgmentEngine {
    default_response: MockResponse,
    /// Checked in insertion order; first matching needle wins.
    response_overrides: RwLock<Vec<(String, MockResponse)>>,
    prompts: RwLock<Vec<String>>,
}

impl MockJudgmentEngine {
    pub fn new() -> Self {
        Self::with_default_response(MockResponse::default())
    }

    pub fn with_default_response(response: MockResponse) -> Self {
        Self {
            default_response: response,
            response_overrides: RwLock::new(Vec::new()),
            prompts: RwLock::new(Vec::new()),
        }
    }

    /// Builder form of [`Self::set_response_containing`].
    #[must_use]
    pub fn with_response_containing(mut self, needle: impl Into<String>, response: MockResponse) -> Self {
        self.response_overrides.get_mut().push((needle.into(), response));
        self
    }

    /// Answer prompts containing `needle` with `response`.
    pub async fn set_response_containing(&self, needle: impl Into<String>, response: MockResponse) {
        let mut overrides = self.response_overrides.write().await;
        overrides.push((needle.into(), response));
    }

    /// Every prompt received so far.
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.read().await.clone()
    }

    async fn get_response(&self, prompt: &str) -> MockResponse {
        let overrides = self.response_overrides.read().await;
        overrides
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| self.default_response.clone())
    }
}

impl Default for MockJudgmentEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JudgmentEngine for MockJudgmentEngine {
    fn engine_id(&self) -> &str {
        "mock"
    }

    async fn execute(&self, prompt: &str) -> Result<String, JudgmentError> {
        self.prompts.write().await.push(prompt.to_string());

        let response = self.get_response(prompt).await;
        if response.fail {
            return Err(JudgmentError::ExecutionFailed(
                response.error_message.unwrap_or_else(|| "Mock failure".to_string()),
            ));
        }
        Ok(response.output)
    }
}
