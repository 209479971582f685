//! Configuration loading from TOML with environment variable overrides.
//!
//! Reads `config.toml` (optional; defaults apply when it is absent) and
//! deserializes into strongly-typed structs. `PROPS_URL` and `ROW_LIMIT`
//! from the environment take precedence over the file.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::strategy::parlay::{default_plans, ParlayPlan};
use crate::types::PropEdgeError;

/// Env var holding the feed locator (URL or path).
pub const ENV_PROPS_URL: &str = "PROPS_URL";
/// Env var holding the row cap.
pub const ENV_ROW_LIMIT: &str = "ROW_LIMIT";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub feed: FeedConfig,
    pub selection: SelectionConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct FeedConfig {
    /// CSV locator: `http(s)://…`, `file://…` or a plain path.
    pub url: Option<String>,
    /// Keep only the first N data rows. 0 or negative disables the cap.
    pub row_limit: i64,
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: None,
            row_limit: 5000,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SelectionConfig {
    pub singles_min_edge: f64,
    pub band_min: f64,
    pub band_max: f64,
    pub singles_limit: usize,
    pub pool_min_edge: f64,
    pub pool_limit: usize,
    pub parlays: Vec<ParlayPlan>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            singles_min_edge: 2.0,
            band_min: -115.0,
            band_max: 200.0,
            singles_limit: 6,
            pool_min_edge: 1.0,
            pool_limit: 40,
            parlays: default_plans(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Write the analysis as JSON here when set.
    pub json_path: Option<String>,
}

impl AppConfig {
    /// Load configuration from a TOML file. A missing file yields defaults.
    pub fn load(path: &str) -> Result<Self, PropEdgeError> {
        if !Path::new(path).exists() {
            info!(path, "No config file found, using defaults");
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .map_err(|e| PropEdgeError::Config(format!("Failed to read config file {path}: {e}")))?;
        Self::from_toml(&contents)
            .map_err(|e| PropEdgeError::Config(format!("Failed to parse config file {path}: {e}")))
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Apply environment overrides. `lookup` resolves a variable name,
    /// `std::env::var(..).ok()` in production.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), PropEdgeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_PROPS_URL) {
            self.feed.url = Some(url.trim().to_string());
        }
        if let Some(raw) = lookup(ENV_ROW_LIMIT) {
            self.feed.row_limit = raw.trim().parse().map_err(|_| {
                PropEdgeError::Config(format!("{ENV_ROW_LIMIT} must be an integer, got {raw:?}"))
            })?;
        }
        Ok(())
    }

    /// The feed locator. Absent or blank is a configuration error.
    pub fn feed_url(&self) -> Result<&str, PropEdgeError> {
        match self.feed.url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(url),
            _ => Err(PropEdgeError::Config(format!(
                "{ENV_PROPS_URL} env var is required (CSV feed URL or path)."
            ))),
        }
    }

}

impl FeedConfig {
    /// Row cap as a length, `None` when uncapped.
    pub fn row_cap(&self) -> Option<usize> {
        usize::try_from(self.row_limit).ok().filter(|&n| n > 0)
    }
}
