//! Covenant Application - Contract-test orchestration
//!
//! This crate holds the assertion engine, spec and suite orchestration, and
//! the ports the infrastructure layer implements.

pub mod assertion;
pub mod context;
pub mod error;
pub mod ports;
pub mod reporting;
pub mod spec;
pub mod suite;

pub use assertion::AssertionEngine;
pub use context::SuiteContext;
pub use error::{ExecuteError, ExecuteResult};
pub use ports::{Executor, Faker, ReporterSink};
pub use reporting::{FanOutReporter, MemoryReporter, ReportEvent};
pub use spec::{RetryPolicy, Spec};
pub use suite::Suite;
