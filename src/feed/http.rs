//! HTTP(S) feed source.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::FeedSource;

pub struct HttpFeed {
    http: Client,
    url: String,
}

impl HttpFeed {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent("PROPEDGE/0.1.0")
            .build()
            .context("Failed to build feed HTTP client")?;
        Ok(Self {
            http,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl FeedSource for HttpFeed {
    async fn fetch(&self) -> Result<String> {
        let resp = self
            .http
            .get(&self.url)
            .send()
            .await
            .context("Feed request failed")?
            .error_for_status()
            .context("Feed server returned an error status")?;

        let body = resp.text().await.context("Failed to read feed body")?;
        debug!(url = %self.url, bytes = body.len(), "Feed downloaded");
        Ok(body)
    }

    fn locator(&self) -> &str {
        &self.url
    }
}
