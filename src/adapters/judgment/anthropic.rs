//! Anthropic Messages API judgment engine.
//!
//! Sends the judgment prompt as a single user message at temperature 0.
//! Requests are throttled by a governor rate limiter and rate-limit or
//! server errors are retried with exponential backoff.

use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::models::JudgmentConfig;
use crate::domain::ports::{JudgmentEngine, JudgmentError};

const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

pub struct AnthropicJudgmentEngine {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    max_tokens: u32,
    timeout_secs: u64,
    max_retries: u32,
    initial_retry_interval: Duration,
    rate_limiter: DefaultDirectRateLimiter,
}

impl AnthropicJudgmentEngine {
    /// A missing API key is reported on first use, not here.
    pub fn new(config: &JudgmentConfig) -> Result<Self, JudgmentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| JudgmentError::NotConfigured(e.to_string()))?;

        Ok(Self {
            client,
            api_key: config.resolve_api_key(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            timeout_secs: config.timeout_secs,
            max_retries: config.max_retries,
            initial_retry_interval: Duration::from_millis(500),
            rate_limiter: RateLimiter::direct(quota_for(config.requests_per_second)?),
        })
    }

    /// Override the first backoff delay.
    #[must_use]
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.initial_retry_interval = interval;
        self
    }

    async fn send_once(&self, prompt: &str) -> Result<String, JudgmentError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            JudgmentError::NotConfigured(
                "no API key: set judgment.api_key or ANTHROPIC_API_KEY".to_string(),
            )
        })?;
        self.rate_limiter.until_ready().await;

        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: 0.0,
            messages: vec![Message { role: "user", content: prompt }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    JudgmentError::Timeout(self.timeout_secs)
                } else {
                    JudgmentError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());
            return Err(error_for_status(status, body));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| JudgmentError::ExecutionFailed(format!("invalid response body: {e}")))?;

        let text: String = parsed
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect();

        Ok(text)
    }
}

fn quota_for(requests_per_second: f64) -> Result<Quota, JudgmentError> {
    if !(requests_per_second.is_finite() && requests_per_second > 0.0) {
        return Err(JudgmentError::NotConfigured(format!(
            "requests_per_second must be positive, got {requests_per_second}"
        )));
    }
    let period = Duration::from_secs_f64(1.0 / requests_per_second);
    Quota::with_period(period)
        .map(|q| q.allow_burst(NonZeroU32::MIN))
        .ok_or_else(|| JudgmentError::NotConfigured("rate limit period rounds to zero".to_string()))
}

fn error_for_status(status: StatusCode, body: String) -> JudgmentError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => JudgmentError::AuthError(body),
        StatusCode::TOO_MANY_REQUESTS => JudgmentError::RateLimitExceeded(body),
        s if s.is_server_error() => JudgmentError::NetworkError(format!("server error {s}: {body}")),
        s => JudgmentError::ExecutionFailed(format!("request rejected with {s}: {body}")),
    }
}

#[async_trait]
impl JudgmentEngine for AnthropicJudgmentEngine {
    fn engine_id(&self) -> &str {
        "anthropic-api"
    }

    async fn execute(&self, prompt: &str) -> Result<String, JudgmentError> {
        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_retry_interval)
            .with_max_elapsed_time(None)
            .build();

        let mut attempt: u32 = 0;
        let result = backoff::future::retry(policy, || {
            attempt += 1;
            let current = attempt;
            async move {
                self.send_once(prompt).await.map_err(|e| {
                    if e.is_transient() && current <= self.max_retries {
                        warn!(attempt = current, error = %e, "judgment request failed, retrying");
                        backoff::Error::transient(e)
                    } else {
                        backoff::Error::permanent(e)
                    }
                })
            }
        })
        .await;

        if let Ok(text) = &result {
            debug!(model = %self.model, chars = text.chars().count(), "judgment received");
        }
        result
    }
}
