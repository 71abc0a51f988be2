//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the harness core and its
//! collaborators. Adapters live in the infrastructure crate.

mod executor;
mod faker;
mod reporter;

pub use executor::Executor;
pub use faker::Faker;
pub use reporter::ReporterSink;
