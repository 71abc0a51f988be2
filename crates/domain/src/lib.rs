//! Covenant Domain - Core contract-testing types
//!
//! This crate defines the request, response, expectation and result model
//! of the harness. All types here are pure Rust with no I/O dependencies.

pub mod config;
pub mod error;
pub mod expectation;
pub mod json_path;
pub mod outcome;
pub mod request;
pub mod response;

pub use config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS, SuiteConfig};
pub use error::{DomainError, DomainResult};
pub use expectation::{ArrayOrder, Expectation};
pub use json_path::{JsonPath, PathSegment};
pub use outcome::{Failure, FailureKind, SpecResult, SuiteSummary};
pub use request::{HttpMethod, RequestBody, RequestBuilder, RequestSpec};
pub use response::ResponseCapture;
