//! Contract suites for JokeAPI v2.
//!
//! Each suite is a list of specs run in order inside one [`Suite`]. The
//! `handoff` suite depends on that order: its second spec reads the joke id
//! captured by the first.
//!
//! [`Suite`]: covenant_application::Suite

use std::time::Duration;

use covenant_application::{Faker, RetryPolicy, Spec};
use covenant_domain::{ArrayOrder, Expectation, RequestBuilder};
use serde_json::{Value, json};

/// Lowest submission format version the API accepts.
pub const SUBMISSION_FORMAT_VERSION: u8 = 3;

/// A named, ordered group of specs.
#[derive(Debug, Clone)]
pub struct SuiteDefinition {
    /// Suite name, used by reporters and for selection on the command line.
    pub name: &'static str,
    /// Specs in run order.
    pub specs: Vec<Spec>,
}

/// Every suite, in the order the binary runs them.
#[must_use]
pub fn all(faker: &dyn Faker) -> Vec<SuiteDefinition> {
    vec![
        SuiteDefinition {
            name: "metadata",
            specs: metadata(),
        },
        SuiteDefinition {
            name: "jokes",
            specs: jokes(),
        },
        SuiteDefinition {
            name: "handoff",
            specs: handoff(),
        },
        SuiteDefinition {
            name: "submission",
            specs: submission(faker),
        },
    ]
}

/// Live calls occasionally drop; assertion failures are still final.
fn spec(name: &str) -> Spec {
    Spec::new(name).retry(RetryPolicy::new(2, Duration::from_secs(1)))
}

/// Liveness, info and taxonomy endpoints.
#[must_use]
pub fn metadata() -> Vec<Spec> {
    vec![
        spec("ping responds with Pong")
            .request(RequestBuilder::new().get("/ping"))
            .expect_status(200)
            .expect_header_contains("content-type", "application/json")
            .expect_json_like(json!({"error": false, "ping": "Pong!"}))
            .expect_response_time_under(5_000),
        spec("info describes the joke catalogue")
            .request(RequestBuilder::new().get("/info"))
            .expect_status(200)
            .expect_json_like(json!({"error": false}))
            .expect_json_schema(info_schema()),
        spec("categories are listed")
            .request(RequestBuilder::new().get("/categories"))
            .expect_status(200)
            .expect(Expectation::json_like_unordered(json!({
                "error": false,
                "categories": ["Any", "Misc", "Programming", "Dark", "Pun", "Spooky", "Christmas"]
            }))),
        spec("flags are listed")
            .request(RequestBuilder::new().get("/flags"))
            .expect_status(200)
            .expect(Expectation::json_like_unordered(json!({
                "error": false,
                "flags": ["nsfw", "religious", "political", "racist", "sexist", "explicit"]
            }))),
        spec("formats are listed")
            .request(RequestBuilder::new().get("/formats"))
            .expect_status(200)
            .expect(Expectation::json_like_unordered(json!({
                "error": false,
                "formats": ["json", "xml", "yaml", "txt"]
            }))),
        spec("endpoints are described")
            .request(RequestBuilder::new().get("/endpoints"))
            .expect_status(200)
            .expect_json_schema(json!({
                "type": "array",
                "minItems": 1,
                "items": {
                    "type": "object",
                    "required": ["name", "description", "usage"],
                    "properties": {
                        "name": {"type": "string"},
                        "usage": {
                            "type": "object",
                            "required": ["method", "url"]
                        }
                    }
                }
            })),
        spec("languages include English")
            .request(RequestBuilder::new().get("/languages"))
            .expect_status(200)
            .expect_json_like(json!({"defaultLanguage": "en"}))
            .expect(Expectation::JsonLikeAt {
                path: "$.jokeLanguages".to_string(),
                shape: json!(["en"]),
                array_order: ArrayOrder::Unordered,
            }),
    ]
}

/// The joke endpoint and its filters.
#[must_use]
pub fn jokes() -> Vec<Spec> {
    vec![
        spec("single programming joke")
            .request(
                RequestBuilder::new()
                    .get("/joke/Programming")
                    .query("type", "single"),
            )
            .expect_status(200)
            .expect_json_like(json!({"error": false, "category": "Programming", "type": "single"}))
            .expect_json_schema(joke_schema(&["joke"])),
        spec("two-part joke")
            .request(RequestBuilder::new().get("/joke/Any").query("type", "twopart"))
            .expect_status(200)
            .expect_json_like(json!({"error": false, "type": "twopart"}))
            .expect_json_schema(joke_schema(&["setup", "delivery"])),
        spec("several jokes at once")
            .request(RequestBuilder::new().get("/joke/Any").query("amount", 3))
            .expect_status(200)
            .expect_json_like(json!({"error": false, "amount": 3}))
            .expect_json_schema(json!({
                "type": "object",
                "required": ["jokes"],
                "properties": {
                    "jokes": {"type": "array", "minItems": 3, "maxItems": 3}
                }
            })),
        spec("blacklisted flags are excluded")
            .request(
                RequestBuilder::new()
                    .get("/joke/Any")
                    .query("blacklistFlags", "nsfw,racist,sexist"),
            )
            .expect_status(200)
            .expect_json_like(json!({
                "error": false,
                "flags": {"nsfw": false, "racist": false, "sexist": false}
            })),
        spec("safe mode returns safe jokes")
            .request(RequestBuilder::new().get("/joke/Any").query("safe-mode", ""))
            .expect_status(200)
            .expect_json_like(json!({"error": false, "safe": true})),
        spec("id range is honoured")
            .request(RequestBuilder::new().get("/joke/Any").query("idRange", "0-10"))
            .expect_status(200)
            .expect_json_schema(json!({
                "type": "object",
                "required": ["id"],
                "properties": {"id": {"type": "integer", "minimum": 0, "maximum": 10}}
            })),
        spec("language filter")
            .request(RequestBuilder::new().get("/joke/Any").query("lang", "de"))
            .expect_status(200)
            .expect_json_like(json!({"error": false, "lang": "de"})),
        spec("search by text")
            .request(
                RequestBuilder::new()
                    .get("/joke/Programming")
                    .query("contains", "computer"),
            )
            .expect_status(200)
            .expect_json_like(json!({"error": false, "category": "Programming"}))
            .expect(Expectation::body_matches("(?i)computer")),
        spec("xml format")
            .request(RequestBuilder::new().get("/joke/Any").query("format", "xml"))
            .expect_status(200)
            .expect_header_contains("content-type", "xml")
            .expect(Expectation::body_matches(r"^\s*<\?xml")),
        spec("invalid category is rejected")
            .request(RequestBuilder::new().get("/joke/NotACategory"))
            .expect_status(400)
            .expect_json_like(json!({"error": true})),
    ]
}

/// A joke fetched once, then fetched again by the id captured from the
/// first response.
#[must_use]
pub fn handoff() -> Vec<Spec> {
    vec![
        spec("random programming joke")
            .request(
                RequestBuilder::new()
                    .get("/joke/Programming")
                    .query("type", "single"),
            )
            .expect_status(200)
            .expect_json_like(json!({"error": false}))
            .capture("jokeId", "$.id")
            .capture("category", "$.category"),
        spec("same joke by id")
            .request(
                RequestBuilder::new()
                    .get("/joke/{{category}}")
                    .query("idRange", "{{jokeId}}"),
            )
            .expect_status(200)
            .expect_json_like(json!({"error": false, "category": "Programming", "type": "single"})),
    ]
}

/// Dry-run submissions, which validate without storing anything.
#[must_use]
pub fn submission(faker: &dyn Faker) -> Vec<Spec> {
    vec![
        spec("valid submission passes dry run")
            .request(submit(submission_payload(
                SUBMISSION_FORMAT_VERSION,
                Some(faker.sentence()),
            )))
            .expect_status(201)
            .expect_json_like(json!({"error": false})),
        spec("outdated format version is rejected")
            .request(submit(submission_payload(1, Some(faker.sentence()))))
            .expect_status(400)
            .expect_json_like(json!({"error": true})),
        spec("submission without joke text is rejected")
            .request(submit(submission_payload(SUBMISSION_FORMAT_VERSION, None)))
            .expect_status(400)
            .expect_json_like(json!({"error": true})),
    ]
}

fn submit(payload: Value) -> RequestBuilder {
    RequestBuilder::new()
        .post("/submit")
        .query("dry-run", "")
        .json(payload)
}

/// A single-type submission; `joke: None` omits the text field.
#[must_use]
pub fn submission_payload(format_version: u8, joke: Option<String>) -> Value {
    let mut payload = json!({
        "formatVersion": format_version,
        "category": "Misc",
        "type": "single",
        "flags": {
            "nsfw": false,
            "religious": false,
            "political": false,
            "racist": false,
            "sexist": false,
            "explicit": false
        },
        "lang": "en"
    });
    if let (Some(text), Some(fields)) = (joke, payload.as_object_mut()) {
        fields.insert("joke".to_string(), Value::String(text));
    }
    payload
}

fn joke_schema(text_fields: &[&str]) -> Value {
    let mut required = vec!["category", "type", "flags", "id", "safe", "lang"];
    required.extend_from_slice(text_fields);
    json!({
        "type": "object",
        "required": required,
        "properties": {
            "category": {"type": "string"},
            "type": {"enum": ["single", "twopart"]},
            "id": {"type": "integer", "minimum": 0},
            "safe": {"type": "boolean"},
            "lang": {"type": "string", "minLength": 2},
            "flags": {
                "type": "object",
                "required": ["nsfw", "religious", "political", "racist", "sexist", "explicit"],
                "additionalProperties": {"type": "boolean"}
            }
        }
    })
}

fn info_schema() -> Value {
    json!({
        "type": "object",
        "required": ["version", "jokes", "formats"],
        "properties": {
            "version": {"type": "string"},
            "formats": {"type": "array", "items": {"type": "string"}},
            "jokes": {
                "type": "object",
                "required": ["totalCount", "categories", "flags", "types"],
                "properties": {
                    "totalCount": {"type": "integer", "minimum": 1},
                    "categories": {"type": "array", "items": {"type": "string"}},
                    "types": {"type": "array", "items": {"enum": ["single", "twopart"]}}
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn spec_names_are_unique_within_each_suite() {
        let faker = || "Why do programmers prefer dark mode?".to_string();
        for suite in all(&faker) {
            let names: HashSet<_> = suite.specs.iter().map(Spec::name).collect();
            assert_eq!(names.len(), suite.specs.len(), "duplicate in {}", suite.name);
        }
    }

    #[test]
    fn payload_includes_joke_only_when_given() {
        let with = submission_payload(3, Some("text".to_string()));
        assert_eq!(with["joke"], "text");
        assert_eq!(with["formatVersion"], 3);

        let without = submission_payload(3, None);
        assert!(without.get("joke").is_none());
    }
}
