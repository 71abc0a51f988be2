//! JSON Schema validation of response bodies.

use jsonschema::{Draft, Validator};
use serde_json::Value;

/// Compiles a schema document (draft 2020-12).
///
/// # Errors
///
/// Returns a message if the document is not a usable schema.
pub fn compile(schema: &Value) -> Result<Validator, String> {
    jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(schema)
        .map_err(|err| format!("invalid schema: {err}"))
}

/// Validates `instance`, returning one message per violation.
#[must_use]
pub fn violations(validator: &Validator, instance: &Value) -> Vec<String> {
    validator
        .iter_errors(instance)
        .map(|err| err.to_string())
        .collect()
}
