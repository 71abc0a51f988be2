//! JSON-lines reporter.

use std::io::{self, Write};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use covenant_application::ReporterSink;
use covenant_domain::SpecResult;
use serde::Serialize;
use tracing::warn;

use super::{Tally, lock};

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Line<'a> {
    SuiteStart {
        suite: &'a str,
        timestamp: DateTime<Utc>,
    },
    SpecResult {
        suite: &'a str,
        result: &'a SpecResult,
    },
    SuiteEnd {
        suite: &'a str,
        total: usize,
        passed: usize,
        failed: usize,
        timestamp: DateTime<Utc>,
    },
}

/// Writes each event as one serialized JSON object followed by a newline.
pub struct JsonLinesReporter<W: Write + Send> {
    state: Mutex<(W, Tally)>,
}

impl<W: Write + Send> JsonLinesReporter<W> {
    /// Reporter writing to `out`.
    pub fn new(out: W) -> Self {
        Self {
            state: Mutex::new((out, Tally::default())),
        }
    }

    /// Returns the writer.
    pub fn into_inner(self) -> W {
        self.state
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .0
    }

    fn emit(out: &mut W, line: &Line<'_>) {
        let written = serde_json::to_writer(&mut *out, line)
            .map_err(io::Error::from)
            .and_then(|()| out.write_all(b"\n"))
            .and_then(|()| out.flush());
        if let Err(e) = written {
            warn!(error = %e, "JSON-lines reporter failed to write");
        }
    }
}

impl<W: Write + Send> ReporterSink for JsonLinesReporter<W> {
    fn on_suite_start(&self, name: &str) {
        let mut state = lock(&self.state);
        let (out, tally) = &mut *state;
        tally.start(name);
        Self::emit(
            out,
            &Line::SuiteStart {
                suite: name,
                timestamp: Utc::now(),
            },
        );
    }

    fn on_spec_result(&self, result: &SpecResult) {
        let mut state = lock(&self.state);
        let (out, tally) = &mut *state;
        tally.record(result.passed());
        Self::emit(
            out,
            &Line::SpecResult {
                suite: &tally.suite,
                result,
            },
        );
    }

    fn on_suite_end(&self) {
        let mut state = lock(&self.state);
        let (out, tally) = &mut *state;
        Self::emit(
            out,
            &Line::SuiteEnd {
                suite: &tally.suite,
                total: tally.total(),
                passed: tally.passed,
                failed: tally.failed,
                timestamp: Utc::now(),
            },
        );
    }
}
