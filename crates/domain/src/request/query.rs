//! Query parameter types

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// A query parameter key-value pair. Scalar values are rendered to text
/// when they are set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParam {
    /// The parameter key
    pub key: String,
    /// The parameter value
    pub value: String,
}

/// An ordered collection of query parameters with unique keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParams {
    items: Vec<QueryParam>,
}

impl QueryParams {
    /// Creates an empty parameter collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Sets a parameter. A later write to the same key replaces the value
    /// but keeps the position of the first write.
    pub fn set(&mut self, key: impl Into<String>, value: impl Display) {
        let key = key.into();
        let value = value.to_string();
        match self.items.iter_mut().find(|p| p.key == key) {
            Some(existing) => existing.value = value,
            None => self.items.push(QueryParam { key, value }),
        }
    }

    /// Merges another collection into this one, last write wins per key.
    pub fn merge(&mut self, other: Self) {
        for param in other.items {
            self.set(param.key, param.value);
        }
    }

    /// Gets a parameter value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }

    /// Returns an iterator over the parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &QueryParam> {
        self.items.iter()
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut String> {
        self.items.iter_mut().map(|p| &mut p.value)
    }

    /// Returns true if there are no parameters.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of parameters.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn len(&self) -> usize {
        self.items.len()
    }
}
