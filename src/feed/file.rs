//! Local file feed source.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use super::FeedSource;

pub struct FileFeed {
    locator: String,
    path: String,
}

impl FileFeed {
    /// Accepts a plain path or a `file://` locator.
    pub fn new(locator: &str) -> Self {
        let path = locator.strip_prefix("file://").unwrap_or(locator).to_string();
        Self {
            locator: locator.to_string(),
            path,
        }
    }
}

#[async_trait]
impl FeedSource for FileFeed {
    async fn fetch(&self) -> Result<String> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read feed file: {}", self.path))?;
        debug!(path = %self.path, bytes = text.len(), "Feed file read");
        Ok(text)
    }

    fn locator(&self) -> &str {
        &self.locator
    }
}
