//! A small JSON path dialect for addressing values in response bodies.
//!
//! Supported forms: `$`, `$.field`, `$.field.nested`, `$.array[0]`,
//! `$[2].field`. The leading `$` is optional, so `id`, `.id` and `$.id`
//! all address the same value.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DomainError, DomainResult};

/// One step of a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathSegment {
    /// Object member.
    Key(String),
    /// Array element.
    Index(usize),
}

/// A parsed JSON path.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JsonPath {
    segments: Vec<PathSegment>,
}

impl JsonPath {
    /// The path addressing the whole document.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Parses a path expression.
    ///
    /// # Errors
    ///
    /// Returns `InvalidJsonPath` for unbalanced brackets, non-numeric
    /// indices or empty member names.
    pub fn parse(expression: &str) -> DomainResult<Self> {
        let invalid = |reason: &str| DomainError::InvalidJsonPath {
            path: expression.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = expression.trim();
        let rest = trimmed.strip_prefix('$').unwrap_or(trimmed);
        let mut segments = Vec::new();
        let mut chars = rest.chars().peekable();
        let mut expect_key = !rest.starts_with('.') && !rest.starts_with('[') && !rest.is_empty();

        while chars.peek().is_some() || expect_key {
            if expect_key {
                let mut key = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch == '.' || ch == '[' {
                        break;
                    }
                    key.push(ch);
                    chars.next();
                }
                if key.is_empty() {
                    return Err(invalid("empty member name"));
                }
                segments.push(PathSegment::Key(key));
                expect_key = false;
                continue;
            }

            match chars.next() {
                Some('.') => expect_key = true,
                Some('[') => {
                    let mut index = String::new();
                    loop {
                        match chars.next() {
                            Some(']') => break,
                            Some(ch) => index.push(ch),
                            None => return Err(invalid("unclosed '['")),
                        }
                    }
                    let index = index
                        .trim()
                        .parse::<usize>()
                        .map_err(|_| invalid(&format!("invalid array index '{index}'")))?;
                    segments.push(PathSegment::Index(index));
                }
                Some(other) => return Err(invalid(&format!("unexpected character '{other}'"))),
                None => break,
            }
        }

        Ok(Self { segments })
    }

    /// Returns a new path extended by a member name.
    #[must_use]
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.segments.push(PathSegment::Key(key.into()));
        next
    }

    /// Returns a new path extended by an array index.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.segments.push(PathSegment::Index(index));
        next
    }

    /// The path segments.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Looks up the addressed value, returning `None` if any step is missing.
    #[must_use]
    pub fn query<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(document, |current, segment| match segment {
                PathSegment::Key(key) => current.get(key.as_str()),
                PathSegment::Index(index) => current.get(*index),
            })
    }
}

/// Renders as `.a.b[0]`; the root renders as `.`.
impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str(".");
        }
        for segment in &self.segments {
            match segment {
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}
