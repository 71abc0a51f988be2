//! Adapter implementations
//!
//! Concrete implementations of the application ports.

mod random_faker;
mod reqwest_executor;

pub use random_faker::RandomFaker;
pub use reqwest_executor::{MAX_REDIRECTS, ReqwestExecutor, USER_AGENT};
