use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::models::FetchMode;
use crate::domain::ports::{EvidenceFetcher, FetchError};

/// Serves fixed text per URL. Unknown URLs yield no evidence.
#[derive(Debug, Clone, Default)]
pub struct StaticEvidenceFetcher {
    pages: HashMap<String, String>,
}

impl StaticEvidenceFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_page(mut self, url: impl Into<String>, text: impl Into<String>) -> Self {
        self.pages.insert(url.into(), text.into());
        self
    }
}

#[async_trait]
impl EvidenceFetcher for StaticEvidenceFetcher {
    async fn fetch(&self, url: &str, _mode: FetchMode) -> Result<Option<String>, FetchError> {
        Ok(self.pages.get(url).cloned())
    }
}
