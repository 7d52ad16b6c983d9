//! Scenario replay client entry point.
//!
//! Usage: `cover-cli [SCENARIO.ron]`. Without a path the bundled ambush
//! scenario is replayed. Every step outcome and runtime event is printed to
//! stdout as one JSON object per line.
mod logging;
mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use cover_runtime::{RuntimeConfig, Scenario, Topic};

use output::JsonLines;

const DEMO_SCENARIO: &str = include_str!("../scenarios/ambush.ron");

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = RuntimeConfig::from_env();

    // Setup logging: both to stderr and to file
    logging::setup_logging(&config.session_id)?;

    let scenario = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => Scenario::load_from_file(&path)
            .with_context(|| format!("loading scenario {}", path.display()))?,
        None => Scenario::parse(DEMO_SCENARIO).context("parsing bundled scenario")?,
    };

    let runtime = scenario.configure(config).build().await?;
    let handle = runtime.handle();
    let mut cover_rx = handle.subscribe(Topic::Cover);
    let mut privileged_rx = handle.subscribe(Topic::Privileged);

    let mut out = JsonLines::new(std::io::stdout().lock());
    let outcomes = scenario
        .replay(&runtime, |outcome| {
            out.step(outcome);
            out.events(&mut cover_rx);
            out.events(&mut privileged_rx);
        })
        .await?;

    handle.settle().await?;
    out.events(&mut cover_rx);
    out.events(&mut privileged_rx);
    out.finish()?;

    tracing::info!(steps = outcomes.len(), "scenario replayed");
    runtime.shutdown().await?;
    Ok(())
}
