//! Recursive partial matching of JSON documents.
//!
//! Every key in the shape must be present in the actual document with a
//! matching value; keys the shape does not mention are ignored. Scalars
//! compare by value, with numbers compared numerically so `1` matches `1.0`.

use covenant_domain::{ArrayOrder, JsonPath};
use serde_json::Value;

/// Matches `actual` against `shape`, returning one message per mismatch.
/// An empty vector means the document matches.
#[must_use]
pub fn json_like(actual: &Value, shape: &Value, order: ArrayOrder) -> Vec<String> {
    let mut mismatches = Vec::new();
    walk(&JsonPath::root(), actual, shape, order, &mut mismatches);
    mismatches
}

/// Deep equality using the same scalar rules as [`json_like`].
#[must_use]
pub fn json_equals(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Object(a), Value::Object(e)) => {
            a.len() == e.len()
                && e.iter()
                    .all(|(key, value)| a.get(key).is_some_and(|found| json_equals(found, value)))
        }
        (Value::Array(a), Value::Array(e)) => {
            a.len() == e.len() && a.iter().zip(e).all(|(x, y)| json_equals(x, y))
        }
        _ => scalars_equal(actual, expected),
    }
}

fn walk(path: &JsonPath, actual: &Value, shape: &Value, order: ArrayOrder, out: &mut Vec<String>) {
    match shape {
        Value::Object(expected) => {
            let Value::Object(found) = actual else {
                out.push(format!("at {path}: expected object, got {}", type_name(actual)));
                return;
            };
            for (key, expected_value) in expected {
                match found.get(key) {
                    Some(actual_value) => walk(&path.key(key), actual_value, expected_value, order, out),
                    None => out.push(format!("at {path}: missing key '{key}'")),
                }
            }
        }
        Value::Array(expected) => {
            let Value::Array(found) = actual else {
                out.push(format!("at {path}: expected array, got {}", type_name(actual)));
                return;
            };
            match order {
                ArrayOrder::Ordered => walk_ordered(path, found, expected, order, out),
                ArrayOrder::Unordered => walk_unordered(path, found, expected, order, out),
            }
        }
        _ => {
            if !scalars_equal(actual, shape) {
                out.push(format!("at {path}: expected {shape}, got {actual}"));
            }
        }
    }
}

fn walk_ordered(
    path: &JsonPath,
    found: &[Value],
    expected: &[Value],
    order: ArrayOrder,
    out: &mut Vec<String>,
) {
    if found.len() < expected.len() {
        out.push(format!(
            "at {path}: expected at least {} elements, got {}",
            expected.len(),
            found.len()
        ));
    }
    for (index, (actual_item, expected_item)) in found.iter().zip(expected).enumerate() {
        walk(&path.index(index), actual_item, expected_item, order, out);
    }
}

/// Pairs each shape element with a distinct actual element. Candidates are
/// collected first, then assigned with augmenting paths so a loose shape
/// element never starves a stricter one.
fn walk_unordered(
    path: &JsonPath,
    found: &[Value],
    expected: &[Value],
    order: ArrayOrder,
    out: &mut Vec<String>,
) {
    let candidates: Vec<Vec<usize>> = expected
        .iter()
        .map(|expected_item| {
            found
                .iter()
                .enumerate()
                .filter(|(index, candidate)| {
                    let mut scratch = Vec::new();
                    walk(&path.index(*index), candidate, expected_item, order, &mut scratch);
                    scratch.is_empty()
                })
                .map(|(index, _)| index)
                .collect()
        })
        .collect();

    let mut owner: Vec<Option<usize>> = vec![None; found.len()];
    for (shape_index, expected_item) in expected.iter().enumerate() {
        let mut visited = vec![false; found.len()];
        if !assign(shape_index, &candidates, &mut owner, &mut visited) {
            out.push(format!("at {path}: no element matches {expected_item}"));
        }
    }
}

fn assign(
    shape_index: usize,
    candidates: &[Vec<usize>],
    owner: &mut [Option<usize>],
    visited: &mut [bool],
) -> bool {
    for &slot in &candidates[shape_index] {
        if visited[slot] {
            continue;
        }
        visited[slot] = true;
        let free = match owner[slot] {
            None => true,
            Some(other) => assign(other, candidates, owner, visited),
        };
        if free {
            owner[slot] = Some(shape_index);
            return true;
        }
    }
    false
}

fn scalars_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(e)) => {
            if let (Some(a), Some(e)) = (a.as_i64(), e.as_i64()) {
                a == e
            } else if let (Some(a), Some(e)) = (a.as_u64(), e.as_u64()) {
                a == e
            } else {
                floats_equal(a.as_f64(), e.as_f64())
            }
        }
        _ => actual == expected,
    }
}

#[allow(clippy::float_cmp)]
fn floats_equal(a: Option<f64>, e: Option<f64>) -> bool {
    matches!((a, e), (Some(a), Some(e)) if a == e)
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
