//! Covenant - Main Entry Point
//!
//! Runs the JokeAPI contract suites and exits non-zero if any spec fails.
//! Positional arguments select suites by name.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, bail};
use covenant::{REPORT_VAR, ReportFormat, jokeapi, run_suites, select};
use covenant_infrastructure::{RandomFaker, ReqwestExecutor, config};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = config::load().await.context("loading configuration")?;
    let format = match std::env::var(REPORT_VAR) {
        Ok(value) => match ReportFormat::parse(&value) {
            Some(format) => format,
            None => bail!("{REPORT_VAR} must be 'console' or 'json', got '{value}'"),
        },
        Err(_) => ReportFormat::default(),
    };

    let selected: Vec<String> = std::env::args().skip(1).collect();
    let suites = select(jokeapi::all(&RandomFaker::new()), &selected)?;

    tracing::info!(
        base_url = %config.base_url,
        suites = suites.len(),
        "Starting Covenant v{}",
        env!("CARGO_PKG_VERSION")
    );

    let executor = Arc::new(ReqwestExecutor::new().context("creating HTTP client")?);
    let summaries = run_suites(suites, &config, executor, format.reporter()).await;

    let failed: usize = summaries.iter().map(|s| s.failed).sum();
    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
