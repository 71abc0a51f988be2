//! Covenant Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus configuration loading.

pub mod adapters;
pub mod config;
pub mod reporting;

pub use adapters::{RandomFaker, ReqwestExecutor};
pub use config::{ConfigError, ConfigResult};
pub use reporting::{ConsoleReporter, JsonLinesReporter, TracingReporter};
