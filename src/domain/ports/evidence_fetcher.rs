use async_trait::async_trait;

use crate::domain::models::FetchMode;

/// Errors that prevent a fetch from producing any answer at all.
///
/// An unreachable or failing URL is not an error: it is `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Fetcher not configured: {0}")]
    NotConfigured(String),
}

/// Port for retrieving evidence from a proof URL.
#[async_trait]
pub trait EvidenceFetcher: Send + Sync {
    /// Fetch `url` and render it according to `mode`.
    ///
    /// Returns `Ok(None)` when the URL yields no content.
    async fn fetch(&self, url: &str, mode: FetchMode) -> Result<Option<String>, FetchError>;
}
