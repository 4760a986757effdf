//! # intel_briefing
//!
//! Collects "hot items" from news aggregators, trending pages, forums, a
//! product-launch feed, arXiv and an LLM-backed social search, then writes a
//! Markdown briefing.
//!
//! ## Usage
//!
//! ```sh
//! intel_briefing run                  # daily briefing
//! intel_briefing run --days 7         # weekly briefing
//! intel_briefing fetch -s hackernews  # inspect one source as JSON
//! ```
//!
//! ## Architecture
//!
//! 1. **Configuration**: defaults, optional YAML file, CLI/env credentials
//! 2. **Collection**: every source and sensor runs concurrently (see [`collector`])
//! 3. **Merge**: items are tagged, deduplicated and folded into one bundle
//! 4. **Output**: Markdown report, optional JSON dump

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod collector;
mod config;
mod dedup;
mod error;
mod feed;
mod http;
mod models;
mod outputs;
mod scrapers;
mod sensors;
mod utils;
mod verifier;

use cli::{Cli, Command, FetchArgs, RunArgs};
use collector::Collector;
use config::Config;
use outputs::{DEFAULT_REPORT_DIR, json, markdown, report_file_name};
use scrapers::content::enrich_items_with_content;
use scrapers::{all_fetchers, select_fetchers};
use utils::{ensure_writable_dir, truncate_for_log};

const PREVIEW_LINES: usize = 40;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env is normal.
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level.as_str()));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("intel_briefing starting up");
    debug!(?args.config, ?args.command, "Parsed CLI arguments");

    let config = Arc::new(build_config(&args)?);
    let client = http::build_client(&config.http)?;

    match args.command {
        Some(Command::Fetch(fetch)) => run_fetch(&config, client, &fetch).await?,
        Some(Command::Run(run)) => run_briefing(config, client, &run).await?,
        None => run_briefing(config, client, &RunArgs::default()).await?,
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

/// Defaults, then the YAML file, then credentials from flags/env.
fn build_config(args: &Cli) -> Result<Config, Box<dyn Error>> {
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(key) = args.xai_api_key.as_ref().filter(|k| !k.trim().is_empty()) {
        config.llm.api_key = Some(key.clone());
    }
    if let Some(url) = &args.xai_base_url {
        config.llm.base_url = url.clone();
    }
    if let Some(model) = &args.xai_model {
        config.llm.model = model.clone();
    }
    info!(
        llm = config.llm.has_credentials(),
        model = %config.llm.model,
        disabled = ?config.sensors.disabled,
        "Configuration ready"
    );
    Ok(config)
}

fn report_path(run: &RunArgs, date: &str) -> PathBuf {
    match &run.output {
        Some(path) => path.clone(),
        None => Path::new(DEFAULT_REPORT_DIR).join(report_file_name(date, run.days, run.test)),
    }
}

#[instrument(level = "info", skip_all, fields(days = run.days, test = run.test))]
async fn run_briefing(config: Arc<Config>, client: reqwest::Client, run: &RunArgs) -> Result<(), Box<dyn Error>> {
    let now = Local::now();
    let date = now.format("%Y-%m-%d").to_string();
    let generated_at = now.format("%H:%M").to_string();
    let path = report_path(run, &date);

    // Early check: fail before spending a minute on collection.
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        let dir = dir.to_string_lossy();
        if let Err(e) = ensure_writable_dir(&dir).await {
            error!(path = %dir, error = %e, "Report directory is not writable");
            return Err(e);
        }
    }

    let limit = run.effective_limit();
    info!(limit, path = %path.display(), "Generating briefing");

    let collector = Collector::new(config, client);
    let bundle = collector.fetch_all_sources(limit).await;
    if bundle.is_empty() {
        warn!("No source returned anything; writing an empty briefing");
    }

    let report = if run.days > 1 {
        markdown::render_periodic_report(&bundle, run.days, &date, &generated_at)
    } else {
        markdown::render_report(&bundle, &date, &generated_at)
    };

    tokio::fs::write(&path, &report).await?;
    info!(path = %path.display(), chars = report.len(), "Wrote briefing");

    if let Some(json_path) = &run.json {
        if let Err(e) = json::write_bundle(&bundle, json_path).await {
            error!(path = %json_path.display(), error = %e, "Failed to write bundle JSON");
        }
    }

    println!("{}", report.lines().take(PREVIEW_LINES).collect::<Vec<_>>().join("\n"));
    if report.lines().count() > PREVIEW_LINES {
        println!("...\n(full report: {})", path.display());
    }
    Ok(())
}

#[instrument(level = "info", skip_all, fields(source = %fetch.source, limit = fetch.limit))]
async fn run_fetch(config: &Arc<Config>, client: reqwest::Client, fetch: &FetchArgs) -> Result<(), Box<dyn Error>> {
    let fetchers = select_fetchers(all_fetchers(&client, config), &fetch.source);
    if fetchers.is_empty() {
        return Err(format!("no known source in '{}'", fetch.source).into());
    }

    let mut items = Vec::new();
    for fetcher in &fetchers {
        items.extend(fetcher.fetch(fetch.limit, fetch.keyword.as_deref()).await);
    }
    info!(count = items.len(), sources = fetchers.len(), "Fetched");

    if fetch.deep {
        items = enrich_items_with_content(&client, &config.http, items).await;
    }

    let out = serde_json::to_string_pretty(&items)?;
    debug!(preview = %truncate_for_log(&out, 300), "Fetch output");
    println!("{out}");
    Ok(())
}
