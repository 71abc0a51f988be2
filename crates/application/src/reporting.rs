//! Reporter sinks that need no I/O.

use std::sync::{Arc, Mutex, PoisonError};

use covenant_domain::SpecResult;

use crate::ports::ReporterSink;

/// An event received by a [`MemoryReporter`].
#[derive(Debug, Clone, PartialEq)]
pub enum ReportEvent {
    /// `on_suite_start`.
    SuiteStarted(String),
    /// `on_spec_result`.
    SpecFinished(SpecResult),
    /// `on_suite_end`.
    SuiteEnded,
}

/// Records every event in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    events: Mutex<Vec<ReportEvent>>,
}

impl MemoryReporter {
    /// Creates an empty reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All events received so far.
    #[must_use]
    pub fn events(&self) -> Vec<ReportEvent> {
        self.lock().clone()
    }

    /// Spec results received so far, in order.
    #[must_use]
    pub fn results(&self) -> Vec<SpecResult> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                ReportEvent::SpecFinished(result) => Some(result.clone()),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ReportEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ReporterSink for MemoryReporter {
    fn on_suite_start(&self, name: &str) {
        self.lock().push(ReportEvent::SuiteStarted(name.to_string()));
    }

    fn on_spec_result(&self, result: &SpecResult) {
        self.lock().push(ReportEvent::SpecFinished(result.clone()));
    }

    fn on_suite_end(&self) {
        self.lock().push(ReportEvent::SuiteEnded);
    }
}

/// Forwards every event to each wrapped sink, in order.
#[derive(Default, Clone)]
pub struct FanOutReporter {
    sinks: Vec<Arc<dyn ReporterSink>>,
}

impl FanOutReporter {
    /// Creates a reporter with no sinks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sink.
    #[must_use]
    pub fn with(mut self, sink: Arc<dyn ReporterSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Number of wrapped sinks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Returns true if no sinks are attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl ReporterSink for FanOutReporter {
    fn on_suite_start(&self, name: &str) {
        for sink in &self.sinks {
            sink.on_suite_start(name);
        }
    }

    fn on_spec_result(&self, result: &SpecResult) {
        for sink in &self.sinks {
            sink.on_spec_result(result);
        }
    }

    fn on_suite_end(&self) {
        for sink in &self.sinks {
            sink.on_suite_end();
        }
    }
}
