//! Reporter port

use covenant_domain::SpecResult;

/// Receives structured events while a suite runs.
///
/// Methods take `&self`; sinks that accumulate state use interior mutability.
pub trait ReporterSink: Send + Sync {
    /// A suite is starting.
    fn on_suite_start(&self, name: &str);

    /// A spec finished; called once per spec, in run order.
    fn on_spec_result(&self, result: &SpecResult);

    /// The suite finished.
    fn on_suite_end(&self);
}
