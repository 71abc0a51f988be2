//! Test-data port

/// Source of throwaway free text for request payloads. Output is not
/// reproducible between runs.
pub trait Faker: Send + Sync {
    /// Returns a random sentence.
    fn sentence(&self) -> String;
}

impl<F> Faker for F
where
    F: Fn() -> String + Send + Sync,
{
    fn sentence(&self) -> String {
        self()
    }
}
