//! Reporter sinks that write somewhere.
//!
//! - [`ConsoleReporter`]: human readable lines
//! - [`JsonLinesReporter`]: one JSON object per event
//! - [`TracingReporter`]: structured `tracing` events

mod console;
mod json_lines;
mod structured;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use console::ConsoleReporter;
pub use json_lines::JsonLinesReporter;
pub use structured::TracingReporter;

/// Running counts for the suite currently being reported.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct Tally {
    suite: String,
    passed: usize,
    failed: usize,
}

impl Tally {
    fn start(&mut self, suite: &str) {
        *self = Self {
            suite: suite.to_string(),
            ..Self::default()
        };
    }

    fn record(&mut self, passed: bool) {
        if passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
    }

    const fn total(&self) -> usize {
        self.passed + self.failed
    }
}

/// Locks a sink's state, recovering it if a previous writer panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
