//! PROPEDGE: cross-book player-prop edge finder
//!
//! Entry point. Loads configuration, initialises structured logging,
//! fetches the props feed, runs the consensus → edge → parlay pipeline
//! once, and prints the report. Fatal errors exit with a status that
//! identifies their kind.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tracing::{error, info};

use propedge::config::AppConfig;
use propedge::feed;
use propedge::report;
use propedge::storage;
use propedge::strategy::edge::{EdgeConfig, EdgeRanker};
use propedge::strategy::parlay::ParlayBuilder;
use propedge::strategy::EdgePipeline;
use propedge::types::{Analysis, PropEdgeError};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = e
                .downcast_ref::<PropEdgeError>()
                .map(PropEdgeError::exit_code)
                .unwrap_or(1);
            error!(error = %format!("{e:#}"), code, "Run failed");
            println!("FAIL: {e:#}");
            ExitCode::from(code)
        }
    }
}

/// Load → rank → report, once.
async fn run() -> Result<()> {
    let config_path =
        std::env::var("PROPEDGE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut cfg = AppConfig::load(&config_path)?;
    cfg.apply_env(|name| std::env::var(name).ok())?;

    let locator = cfg.feed_url()?.to_string();
    info!(
        locator = %locator,
        row_limit = cfg.feed.row_limit,
        parlays = cfg.selection.parlays.len(),
        "PROPEDGE starting"
    );

    let source = feed::source_for(&locator, Duration::from_secs(cfg.feed.timeout_secs))?;
    let loaded = feed::load(source.as_ref(), &cfg.feed).await?;

    let pipeline = EdgePipeline::new(
        EdgeRanker::new(EdgeConfig::from(&cfg.selection)),
        ParlayBuilder::new(cfg.selection.parlays.clone()),
    );
    let selection = pipeline.run(loaded.offers);

    let analysis = Analysis {
        summary: loaded.summary,
        selection,
        generated_at: Utc::now(),
    };

    print!("{}", report::render(&analysis, pipeline.ranker().config()));

    if let Some(path) = &cfg.output.json_path {
        storage::save_analysis(&analysis, path)?;
    }

    Ok(())
}

/// Initialise the `tracing` subscriber. Logs go to stderr so stdout
/// carries only the report.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("propedge=info"));

    let json_logging = std::env::var("PROPEDGE_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}
