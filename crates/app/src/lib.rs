//! Covenant - JokeAPI contract suites
//!
//! Wires the harness together: configuration, the reqwest executor, the
//! selected reporters, and the suites in [`jokeapi`].

pub mod jokeapi;

use std::io;
use std::sync::Arc;

use anyhow::bail;

use covenant_application::{Executor, FanOutReporter, ReporterSink, Suite};
use covenant_domain::{SuiteConfig, SuiteSummary};
use covenant_infrastructure::{ConsoleReporter, JsonLinesReporter, TracingReporter};

use crate::jokeapi::SuiteDefinition;

/// Environment variable selecting the output format.
pub const REPORT_VAR: &str = "COVENANT_REPORT";

/// Output format of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Human readable lines on stdout.
    #[default]
    Console,
    /// One JSON object per event on stdout.
    JsonLines,
}

impl ReportFormat {
    /// Parses `console` or `json`; anything else is `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "console" | "" => Some(Self::Console),
            "json" | "jsonl" | "json-lines" => Some(Self::JsonLines),
            _ => None,
        }
    }

    /// Builds the reporter for this format. Results are also emitted as
    /// `tracing` events so log pipelines see them regardless of format.
    #[must_use]
    pub fn reporter(self) -> Arc<dyn ReporterSink> {
        let primary: Arc<dyn ReporterSink> = match self {
            Self::Console => Arc::new(ConsoleReporter::stdout()),
            Self::JsonLines => Arc::new(JsonLinesReporter::new(io::stdout())),
        };
        Arc::new(
            FanOutReporter::new()
                .with(primary)
                .with(Arc::new(TracingReporter::new())),
        )
    }
}

/// Keeps the suites whose names appear in `selected`; an empty selection
/// keeps everything.
///
/// # Errors
///
/// Fails if any selected name matches no suite, listing the known names.
pub fn select(suites: Vec<SuiteDefinition>, selected: &[String]) -> anyhow::Result<Vec<SuiteDefinition>> {
    if selected.is_empty() {
        return Ok(suites);
    }
    let unknown: Vec<&str> = selected
        .iter()
        .map(String::as_str)
        .filter(|name| !suites.iter().any(|suite| suite.name == *name))
        .collect();
    if !unknown.is_empty() {
        let known: Vec<&str> = suites.iter().map(|suite| suite.name).collect();
        bail!(
            "unknown suite(s) {}; expected one of {}",
            unknown.join(", "),
            known.join(", ")
        );
    }
    Ok(suites
        .into_iter()
        .filter(|suite| selected.iter().any(|name| name == suite.name))
        .collect())
}

/// Runs each suite in order, each with its own handoff context.
pub async fn run_suites(
    suites: Vec<SuiteDefinition>,
    config: &SuiteConfig,
    executor: Arc<dyn Executor>,
    reporter: Arc<dyn ReporterSink>,
) -> Vec<SuiteSummary> {
    let mut summaries = Vec::with_capacity(suites.len());
    for definition in suites {
        let mut suite = Suite::start(
            definition.name,
            config.clone(),
            Arc::clone(&executor),
            Arc::clone(&reporter),
        );
        suite.run_all(definition.specs).await;
        summaries.push(suite.finish());
    }
    summaries
}
