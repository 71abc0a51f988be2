//! Reporter that emits `tracing` events.

use std::sync::Mutex;

use covenant_application::ReporterSink;
use covenant_domain::SpecResult;
use tracing::{info, warn};

use super::{Tally, lock};

/// Emits one `tracing` event per reporter call, with the result fields
/// attached as structured fields. Useful when output goes to a log
/// pipeline instead of a terminal.
#[derive(Debug, Default)]
pub struct TracingReporter {
    tally: Mutex<Tally>,
}

impl TracingReporter {
    /// Creates a reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReporterSink for TracingReporter {
    fn on_suite_start(&self, name: &str) {
        lock(&self.tally).start(name);
        info!(target: "covenant::report", suite = name, "suite start");
    }

    fn on_spec_result(&self, result: &SpecResult) {
        let mut tally = lock(&self.tally);
        tally.record(result.passed());
        if result.passed() {
            info!(
                target: "covenant::report",
                suite = %tally.suite,
                spec = result.name(),
                status = result.status(),
                duration_ms = result.duration_ms(),
                attempts = result.attempts(),
                "PASS"
            );
        } else {
            for failure in result.failures() {
                warn!(
                    target: "covenant::report",
                    suite = %tally.suite,
                    spec = result.name(),
                    kind = %failure.kind,
                    message = %failure.message,
                    "FAIL"
                );
            }
        }
    }

    fn on_suite_end(&self) {
        let tally = lock(&self.tally);
        info!(
            target: "covenant::report",
            suite = %tally.suite,
            passed = tally.passed,
            failed = tally.failed,
            total = tally.total(),
            "suite end"
        );
    }
}
