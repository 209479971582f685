//! Persistence layer.
//!
//! Exports a run's `Analysis` to a JSON file. Nothing is carried between
//! runs; the export is a snapshot for downstream tooling.

use anyhow::{Context, Result};
use tracing::info;

use crate::types::Analysis;

/// Save an analysis snapshot as pretty-printed JSON.
pub fn save_analysis(analysis: &Analysis, path: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(analysis)
        .context("Failed to serialise analysis")?;

    std::fs::write(path, &json)
        .with_context(|| format!("Failed to write analysis to {path}"))?;

    info!(
        path,
        singles = analysis.selection.singles.len(),
        parlays = analysis.selection.parlays.len(),
        "Analysis exported"
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
