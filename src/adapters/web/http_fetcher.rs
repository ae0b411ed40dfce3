//! HTTP evidence fetcher.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use super::html::extract_text;
use crate::domain::models::{FetchMode, FetcherConfig};
use crate::domain::ports::{EvidenceFetcher, FetchError};

/// Fetches proof URLs over HTTP(S).
///
/// Any failure to obtain a successful response is reported as "no evidence"
/// rather than an error, so the task is rejected instead of retried.
pub struct HttpEvidenceFetcher {
    client: Client,
}

impl HttpEvidenceFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FetchError::NotConfigured(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl EvidenceFetcher for HttpEvidenceFetcher {
    async fn fetch(&self, url: &str, mode: FetchMode) -> Result<Option<String>, FetchError> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(url, error = %e, "evidence request failed");
                return Ok(None);
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(url, status = status.as_u16(), "evidence request returned error status");
            return Ok(None);
        }

        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("text/html"));

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(url, error = %e, "failed to read evidence body");
                return Ok(None);
            }
        };

        let text = match mode {
            FetchMode::Text if is_html => extract_text(&body),
            FetchMode::Text => body,
        };

        debug!(url, chars = text.chars().count(), "evidence fetched");
        Ok(Some(text))
    }
}
