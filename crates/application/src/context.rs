//! Handoff variables shared between the specs of one suite run.
//!
//! A spec captures a value with [`Spec::capture`](crate::Spec::capture);
//! later specs reference it as `{{name}}` anywhere in their request text.

use std::collections::BTreeMap;
use std::ops::Range;

use covenant_domain::{DomainError, DomainResult};
use serde_json::Value;

/// A `{{name}}` occurrence in a template string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Variable name, trimmed.
    pub name: String,
    /// Byte range of the whole `{{...}}` token.
    pub span: Range<usize>,
}

/// Finds every `{{name}}` placeholder in `input`, left to right. An opening
/// `{{` without a closing `}}` ends the scan; blank names are skipped.
#[must_use]
pub fn placeholders(input: &str) -> Vec<Placeholder> {
    let mut found = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((start, ch)) = chars.next() {
        if ch != '{' || !matches!(chars.peek(), Some((_, '{'))) {
            continue;
        }
        chars.next();

        let mut name = String::new();
        let mut closed = false;
        while let Some((_, ch)) = chars.next() {
            if ch == '}' {
                if let Some(&(end, '}')) = chars.peek() {
                    chars.next();
                    let trimmed = name.trim();
                    if !trimmed.is_empty() {
                        found.push(Placeholder {
                            name: trimmed.to_string(),
                            span: start..end + 1,
                        });
                    }
                    closed = true;
                    break;
                }
            }
            name.push(ch);
        }
        if !closed {
            break;
        }
    }

    found
}

/// Variables captured during one suite run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuiteContext {
    variables: BTreeMap<String, Value>,
}

impl SuiteContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a variable, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    /// Looks a variable up.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Returns true if the variable has been captured.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Number of stored variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Returns true if nothing has been captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Resolves `template` to a JSON value. A template that is exactly one
    /// placeholder yields the captured value unchanged, keeping its type;
    /// anything else is interpolated into a string.
    ///
    /// # Errors
    ///
    /// See [`SuiteContext::interpolate`].
    pub fn resolve(&self, template: &str) -> DomainResult<Value> {
        if let [whole] = placeholders(template).as_slice()
            && whole.span == (0..template.len())
        {
            return self.get(&whole.name).cloned().ok_or_else(|| {
                DomainError::invalid_request(format!("unresolved variable '{}'", whole.name))
            });
        }
        self.interpolate(template).map(Value::String)
    }

    /// Replaces every `{{name}}` in `template`. String values are inserted
    /// verbatim; other JSON values use their compact JSON rendering.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` naming the first variable that has not been
    /// captured.
    pub fn interpolate(&self, template: &str) -> DomainResult<String> {
        let found = placeholders(template);
        if found.is_empty() {
            return Ok(template.to_string());
        }

        let mut output = String::with_capacity(template.len());
        let mut cursor = 0;
        for placeholder in found {
            let value = self.get(&placeholder.name).ok_or_else(|| {
                DomainError::invalid_request(format!("unresolved variable '{}'", placeholder.name))
            })?;
            output.push_str(&template[cursor..placeholder.span.start]);
            match value {
                Value::String(text) => output.push_str(text),
                other => output.push_str(&other.to_string()),
            }
            cursor = placeholder.span.end;
        }
        output.push_str(&template[cursor..]);
        Ok(output)
    }
}
