//! Feed retrieval.
//!
//! Defines the `FeedSource` trait and provides implementations for:
//! - HTTP(S), e.g. a CSV attached to a release
//! - Local files: plain paths or `file://` locators
//!
//! `load` turns whatever a source returns into validated offers plus the
//! summary shown in the report header.

pub mod file;
pub mod http;
pub mod table;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::config::FeedConfig;
use crate::types::{FeedSummary, Offer, PropEdgeError};
use file::FileFeed;
use http::HttpFeed;
use table::FeedTable;

/// Abstraction over where the CSV text comes from.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the full CSV text.
    async fn fetch(&self) -> Result<String>;

    /// Locator shown in logs and the report (URL or path).
    fn locator(&self) -> &str;
}

/// Pick a source for a locator: HTTP(S) URLs go over the network,
/// everything else is read from disk.
pub fn source_for(locator: &str, timeout: Duration) -> Result<Box<dyn FeedSource>, PropEdgeError> {
    let lower = locator.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        let feed = HttpFeed::new(locator, timeout).map_err(|e| PropEdgeError::Retrieval {
            locator: locator.to_string(),
            message: format!("{e:#}"),
        })?;
        Ok(Box::new(feed))
    } else {
        Ok(Box::new(FileFeed::new(locator)))
    }
}

/// A loaded, validated feed.
#[derive(Debug, Clone)]
pub struct LoadedFeed {
    pub offers: Vec<Offer>,
    pub summary: FeedSummary,
}

/// Fetch, parse, cap, and validate a feed.
///
/// The row limit is applied before the schema check and before any
/// filtering, so every later stage is bounded by it.
pub async fn load(source: &dyn FeedSource, cfg: &FeedConfig) -> Result<LoadedFeed, PropEdgeError> {
    let locator = source.locator().to_string();
    let retrieval = |message: String| PropEdgeError::Retrieval {
        locator: locator.clone(),
        message,
    };

    let text = source.fetch().await.map_err(|e| retrieval(format!("{e:#}")))?;
    let mut table = FeedTable::parse(&text).map_err(retrieval)?;

    table.truncate(cfg.row_cap());

    let columns = table.check_schema()?;
    let offers = table.offers(&columns);

    let summary = FeedSummary {
        locator: locator.clone(),
        rows_loaded: table.len(),
        rows_used: offers.len(),
        row_limit: cfg.row_limit,
        fingerprint: table.fingerprint(),
    };

    info!(
        locator = %summary.locator,
        rows_loaded = summary.rows_loaded,
        rows_used = summary.rows_used,
        fingerprint = %summary.fingerprint,
        "Feed loaded"
    );

    Ok(LoadedFeed { offers, summary })
}
