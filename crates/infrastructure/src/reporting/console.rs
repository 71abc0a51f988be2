//! Human readable reporter.

use std::io::{self, Write};
use std::sync::Mutex;

use covenant_application::ReporterSink;
use covenant_domain::SpecResult;
use tracing::warn;

use super::{Tally, lock};

struct State<W> {
    out: W,
    tally: Tally,
}

/// Writes one line per spec, indented failure details and a summary line.
///
/// ```text
/// JokeAPI
///   PASS ping (84 ms)
///   FAIL invalid category (51 ms)
///        expected status 400, got 200
/// JokeAPI: 1 passed, 1 failed, 2 total
/// ```
pub struct ConsoleReporter<W: Write + Send> {
    state: Mutex<State<W>>,
}

impl ConsoleReporter<io::Stdout> {
    /// Reporter writing to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleReporter<W> {
    /// Reporter writing to `out`.
    pub fn new(out: W) -> Self {
        Self {
            state: Mutex::new(State {
                out,
                tally: Tally::default(),
            }),
        }
    }

    /// Returns the writer.
    pub fn into_inner(self) -> W {
        self.state
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .out
    }

    fn write(&self, render: impl FnOnce(&mut State<W>) -> io::Result<()>) {
        let mut state = lock(&self.state);
        if let Err(e) = render(&mut *state).and_then(|()| state.out.flush()) {
            warn!(error = %e, "console reporter failed to write");
        }
    }
}

impl<W: Write + Send> ReporterSink for ConsoleReporter<W> {
    fn on_suite_start(&self, name: &str) {
        self.write(|state| {
            state.tally.start(name);
            writeln!(state.out, "{name}")
        });
    }

    fn on_spec_result(&self, result: &SpecResult) {
        self.write(|state| {
            state.tally.record(result.passed());
            let verdict = if result.passed() { "PASS" } else { "FAIL" };
            writeln!(
                state.out,
                "  {verdict} {} ({} ms)",
                result.name(),
                result.duration_ms()
            )?;
            for failure in result.failures() {
                if failure.details.is_empty() {
                    writeln!(state.out, "       {}", failure.message)?;
                } else {
                    for detail in &failure.details {
                        writeln!(state.out, "       {detail}")?;
                    }
                }
            }
            Ok(())
        });
    }

    fn on_suite_end(&self) {
        self.write(|state| {
            let tally = &state.tally;
            writeln!(
                state.out,
                "{}: {} passed, {} failed, {} total",
                tally.suite,
                tally.passed,
                tally.failed,
                tally.total()
            )
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_domain::{Expectation, Failure};
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_results_and_summary() {
        let reporter = ConsoleReporter::new(Vec::new());
        reporter.on_suite_start("JokeAPI");
        reporter.on_spec_result(&SpecResult::new("ping", Vec::new(), 84));
        reporter.on_spec_result(&SpecResult::failed(
            "invalid category",
            Failure::assertion(&Expectation::status(400), "expected status 400, got 200"),
            51,
        ));
        reporter.on_suite_end();

        let output = String::from_utf8_lossy(&reporter.into_inner()).into_owned();
        assert_eq!(
            output,
            "JokeAPI\n  PASS ping (84 ms)\n  FAIL invalid category (51 ms)\n       expected status 400, got 200\nJokeAPI: 1 passed, 1 failed, 2 total\n"
        );
    }

    #[test]
    fn lists_each_detail() {
        let reporter = ConsoleReporter::new(Vec::new());
        reporter.on_spec_result(&SpecResult::failed(
            "flags",
            Failure::assertion_with_details(
                &Expectation::json_like(serde_json::json!({})),
                vec!["first".to_string(), "second".to_string()],
            ),
            1,
        ));
        let output = String::from_utf8_lossy(&reporter.into_inner()).into_owned();
        assert!(output.ends_with("       first\n       second\n"));
    }
}
