//! Runs the shipped JokeAPI suites against canned responses.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use covenant::jokeapi::{self, SuiteDefinition};
use covenant::run_suites;
use covenant_application::{ExecuteResult, Executor, MemoryReporter};
use covenant_domain::{FailureKind, HttpMethod, RequestBody, RequestSpec, ResponseCapture, SuiteConfig};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

/// Answers like JokeAPI does for the requests the suites make.
#[derive(Default)]
struct CannedJokeApi {
    /// Status returned for any dry-run submission, when set.
    submission_status: Option<u16>,
    requests: Mutex<Vec<String>>,
}

fn programming_joke(id: u64) -> Value {
    json!({
        "error": false,
        "category": "Programming",
        "type": "single",
        "joke": "A computer once beat me at chess, but it was no match for me at kick boxing.",
        "flags": {
            "nsfw": false, "religious": false, "political": false,
            "racist": false, "sexist": false, "explicit": false
        },
        "id": id,
        "safe": true,
        "lang": "en"
    })
}

impl CannedJokeApi {
    fn answer(&self, request: &RequestSpec) -> (u16, &'static str, String) {
        let url = request.url().unwrap();
        let query = |key: &str| request.query().get(key).map(str::to_string);
        let json_type = "application/json; charset=utf-8";

        let (status, body) = match (request.method(), url.path()) {
            (HttpMethod::Get, "/ping") => (200, json!({"error": false, "ping": "Pong!", "timestamp": 1})),
            (HttpMethod::Get, "/info") => (
                200,
                json!({
                    "error": false,
                    "version": "2.3.3",
                    "jokes": {
                        "totalCount": 1368,
                        "categories": ["Any", "Misc", "Programming"],
                        "flags": ["nsfw"],
                        "types": ["single", "twopart"]
                    },
                    "formats": ["json", "xml", "yaml", "txt"]
                }),
            ),
            (HttpMethod::Get, "/categories") => (
                200,
                json!({
                    "error": false,
                    "categories": ["Any", "Misc", "Programming", "Dark", "Pun", "Spooky", "Christmas"],
                    "categoryAliases": []
                }),
            ),
            (HttpMethod::Get, "/flags") => (
                200,
                json!({
                    "error": false,
                    "flags": ["nsfw", "religious", "political", "racist", "sexist", "explicit"]
                }),
            ),
            (HttpMethod::Get, "/formats") => {
                (200, json!({"error": false, "formats": ["json", "xml", "yaml", "txt"]}))
            }
            (HttpMethod::Get, "/endpoints") => (
                200,
                json!([{
                    "name": "joke",
                    "description": "Returns a joke",
                    "usage": {"method": "GET", "url": "https://v2.jokeapi.dev/joke/{CATEGORY}"}
                }]),
            ),
            (HttpMethod::Get, "/languages") => (
                200,
                json!({"defaultLanguage": "en", "jokeLanguages": ["cs", "de", "en", "es", "fr", "pt"]}),
            ),
            (HttpMethod::Get, "/joke/Any") if query("format").as_deref() == Some("xml") => {
                return (
                    200,
                    "application/xml; charset=utf-8",
                    "<?xml version='1.0'?>\n<data><error>false</error></data>".to_string(),
                );
            }
            (HttpMethod::Get, "/joke/Any") if query("type").as_deref() == Some("twopart") => (
                200,
                json!({
                    "error": false, "category": "Pun", "type": "twopart",
                    "setup": "Why?", "delivery": "Because.",
                    "flags": {
                        "nsfw": false, "religious": false, "political": false,
                        "racist": false, "sexist": false, "explicit": false
                    },
                    "id": 12, "safe": true, "lang": "en"
                }),
            ),
            (HttpMethod::Get, "/joke/Any") if query("amount").is_some() => (
                200,
                json!({"error": false, "amount": 3, "jokes": [programming_joke(1), programming_joke(2), programming_joke(3)]}),
            ),
            (HttpMethod::Get, "/joke/Any") if query("lang").as_deref() == Some("de") => {
                let mut joke = programming_joke(4);
                joke["lang"] = json!("de");
                (200, joke)
            }
            (HttpMethod::Get, "/joke/Any") => (200, programming_joke(7)),
            (HttpMethod::Get, "/joke/Programming") => {
                let id = query("idRange").and_then(|r| r.parse().ok()).unwrap_or(25);
                (200, programming_joke(id))
            }
            (HttpMethod::Post, "/submit") => self.submission(request),
            _ => (
                400,
                json!({"error": true, "internalError": false, "code": 106, "message": "No matching joke found"}),
            ),
        };
        (status, json_type, body.to_string())
    }

    fn submission(&self, request: &RequestSpec) -> (u16, Value) {
        if let Some(status) = self.submission_status {
            return (status, json!({"error": status >= 400}));
        }
        let Some(RequestBody::Json { value }) = request.body() else {
            return (400, json!({"error": true, "message": "no payload"}));
        };
        let current = value["formatVersion"] == json!(jokeapi::SUBMISSION_FORMAT_VERSION);
        if current && value.get("joke").is_some() {
            (201, json!({"error": false, "message": "Dry Run complete! No errors were found."}))
        } else {
            (400, json!({"error": true, "message": "Submission invalid"}))
        }
    }
}

#[async_trait]
impl Executor for CannedJokeApi {
    async fn execute(&self, request: &RequestSpec) -> ExecuteResult<ResponseCapture> {
        self.requests
            .lock()
            .unwrap()
            .push(request.url().unwrap().to_string());
        let (status, content_type, body) = self.answer(request);
        Ok(ResponseCapture::new(
            status,
            vec![("Content-Type", content_type)],
            body.into_bytes(),
            Duration::from_millis(40),
        ))
    }
}

fn suites() -> Vec<SuiteDefinition> {
    let faker = || "I told a joke about UDP once.".to_string();
    jokeapi::all(&faker)
}

fn config() -> SuiteConfig {
    SuiteConfig::new("https://v2.jokeapi.dev", 90_000)
}

#[tokio::test]
async fn every_suite_passes_against_a_conforming_api() {
    let api = Arc::new(CannedJokeApi::default());
    let reporter = Arc::new(MemoryReporter::new());

    let summaries = run_suites(suites(), &config(), api.clone(), reporter.clone()).await;

    for summary in &summaries {
        for result in &summary.results {
            assert!(result.passed(), "{}: {:?}", result.name(), result.failures());
        }
    }
    assert_eq!(summaries.len(), 4);
    assert_eq!(
        reporter.results().len(),
        summaries.iter().map(|s| s.total).sum::<usize>()
    );
}

#[tokio::test]
async fn handoff_reuses_the_captured_id() {
    let api = Arc::new(CannedJokeApi::default());
    let reporter = Arc::new(MemoryReporter::new());
    let handoff = vec![SuiteDefinition {
        name: "handoff",
        specs: jokeapi::handoff(),
    }];

    let summaries = run_suites(handoff, &config(), api.clone(), reporter).await;

    assert!(summaries[0].all_passed());
    assert_eq!(
        api.requests.lock().unwrap().as_slice(),
        [
            "https://v2.jokeapi.dev/joke/Programming?type=single",
            "https://v2.jokeapi.dev/joke/Programming?idRange=25",
        ]
    );
}

#[tokio::test]
async fn bypassed_submission_validation_is_reported() {
    let api = Arc::new(CannedJokeApi {
        submission_status: Some(201),
        ..CannedJokeApi::default()
    });
    let reporter = Arc::new(MemoryReporter::new());
    let faker = || "text".to_string();
    let submission = vec![SuiteDefinition {
        name: "submission",
        specs: jokeapi::submission(&faker),
    }];

    let summaries = run_suites(submission, &config(), api, reporter).await;
    let summary = &summaries[0];

    assert_eq!((summary.passed, summary.failed), (1, 2));
    let outdated = summary
        .results
        .iter()
        .find(|r| r.name() == "outdated format version is rejected")
        .unwrap();
    assert_eq!(outdated.failures()[0].kind, FailureKind::AssertionFailure);
    assert!(
        outdated
            .failures()
            .iter()
            .any(|f| f.message == "expected status 400, got 201")
    );
}
