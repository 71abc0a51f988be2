//! Executor port

use async_trait::async_trait;
use covenant_domain::{RequestSpec, ResponseCapture};

use crate::error::ExecuteResult;

/// Port for performing one HTTP call.
///
/// Implementations must enforce `request.timeout()` as a single deadline
/// from dispatch to full body receipt, release the connection when the
/// deadline expires, and never retry on their own.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Executes the request and captures the response.
    ///
    /// # Errors
    ///
    /// Returns `ExecuteError::Timeout` when the deadline expires and one of
    /// the network variants when the transport fails.
    async fn execute(&self, request: &RequestSpec) -> ExecuteResult<ResponseCapture>;
}
