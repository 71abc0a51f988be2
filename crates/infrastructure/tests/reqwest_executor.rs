//! Runs the reqwest executor against a throwaway local listener.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{AppendHeaders, IntoResponse, Redirect};
use axum::routing::{any, get};
use covenant_application::{
    AssertionEngine, ExecuteError, Executor, MemoryReporter, Spec, Suite,
};
use covenant_domain::{Expectation, FailureKind, RequestBuilder, RequestSpec, SuiteConfig};
use covenant_infrastructure::ReqwestExecutor;
use covenant_infrastructure::adapters::USER_AGENT;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: String) -> impl IntoResponse {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    axum::Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": uri.query(),
        "userAgent": header("user-agent"),
        "contentType": header("content-type"),
        "custom": header("x-custom"),
        "body": body,
    }))
}

async fn stall() -> &'static str {
    tokio::time::sleep(Duration::from_secs(10)).await;
    "too late"
}

async fn serve() -> SocketAddr {
    let app = Router::new()
        .route(
            "/ping",
            get(|| async { axum::Json(json!({"error": false, "ping": "Pong!", "timestamp": 1})) }),
        )
        .route(
            "/categories",
            get(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    AppendHeaders([("x-dup", "a"), ("x-dup", "b")]),
                    axum::Json(json!({"error": true, "code": 106})),
                )
            }),
        )
        .route("/html", get(|| async { "<html>maintenance</html>" }))
        .route("/stall", get(stall))
        .route("/loop", get(|| async { Redirect::temporary("/loop") }))
        .route("/echo", any(echo));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

fn request(addr: SocketAddr, builder: RequestBuilder) -> RequestSpec {
    builder
        .with_defaults(&SuiteConfig::new(format!("http://{addr}"), 2_000))
        .build()
        .unwrap()
}

#[tokio::test]
async fn captures_status_headers_body_and_timing() {
    let addr = serve().await;
    let executor = ReqwestExecutor::new().unwrap();

    let response = executor
        .execute(&request(addr, RequestBuilder::new().get("/ping")))
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert!(response.content_type().unwrap().contains("application/json"));
    assert_eq!(response.json().unwrap()["ping"], "Pong!");
    assert!(response.elapsed() < Duration::from_secs(2));

    let result = AssertionEngine::new().evaluate(
        "ping",
        &response,
        &[
            Expectation::status(200),
            Expectation::header_contains("Content-Type", "json"),
            Expectation::json_like(json!({"error": false, "ping": "Pong!"})),
            Expectation::response_time_under(5_000),
        ],
    );
    assert!(result.passed(), "{:?}", result.failures());
}

#[tokio::test]
async fn repeated_response_headers_are_joined() {
    let addr = serve().await;
    let executor = ReqwestExecutor::new().unwrap();

    let response = executor
        .execute(&request(addr, RequestBuilder::new().get("/categories")))
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    assert_eq!(response.header("X-Dup"), Some("a, b"));
}

#[tokio::test]
async fn sends_query_headers_and_json_body() {
    let addr = serve().await;
    let executor = ReqwestExecutor::new().unwrap();

    let response = executor
        .execute(&request(
            addr,
            RequestBuilder::new()
                .post("/echo")
                .query("dry-run", "")
                .query("lang", "en")
                .header("X-Custom", "contract")
                .json(json!({"formatVersion": 3})),
        ))
        .await
        .unwrap();

    let echoed: &Value = response.json().unwrap();
    assert_eq!(echoed["method"], "POST");
    assert_eq!(echoed["path"], "/echo");
    assert_eq!(echoed["query"], "dry-run=&lang=en");
    assert_eq!(echoed["userAgent"], USER_AGENT);
    assert_eq!(echoed["contentType"], "application/json");
    assert_eq!(echoed["custom"], "contract");
    assert_eq!(
        serde_json::from_str::<Value>(echoed["body"].as_str().unwrap()).unwrap(),
        json!({"formatVersion": 3})
    );
}

#[tokio::test]
async fn stalled_response_times_out() {
    let addr = serve().await;
    let executor = ReqwestExecutor::new().unwrap();

    let started = Instant::now();
    let result = executor
        .execute(&request(
            addr,
            RequestBuilder::new()
                .get("/stall")
                .timeout(Duration::from_millis(200)),
        ))
        .await;

    assert_eq!(result.err(), Some(ExecuteError::Timeout { timeout_ms: 200 }));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn refused_connection_is_a_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let executor = ReqwestExecutor::new().unwrap();
    let error = executor
        .execute(&request(addr, RequestBuilder::new().get("/ping")))
        .await
        .unwrap_err();

    assert_eq!(error.kind(), FailureKind::NetworkError);
}

#[tokio::test]
async fn redirect_loops_are_cut_off() {
    let addr = serve().await;
    let executor = ReqwestExecutor::new().unwrap();

    let error = executor
        .execute(&request(addr, RequestBuilder::new().get("/loop")))
        .await
        .unwrap_err();

    assert_eq!(error.kind(), FailureKind::NetworkError);
}

#[tokio::test]
async fn suite_reports_timeout_without_propagating() {
    let addr = serve().await;
    let reporter = Arc::new(MemoryReporter::new());
    let mut suite = Suite::start(
        "local",
        SuiteConfig::new(format!("http://{addr}"), 250),
        Arc::new(ReqwestExecutor::new().unwrap()),
        reporter.clone(),
    );

    let stalled = Spec::new("stalled")
        .request(RequestBuilder::new().get("/stall"))
        .expect_status(200)
        .run(&mut suite)
        .await;
    let ping = Spec::new("ping")
        .request(RequestBuilder::new().get("/ping"))
        .expect_status(200)
        .run(&mut suite)
        .await;

    assert!(!stalled.passed());
    assert_eq!(stalled.failures().len(), 1);
    assert_eq!(stalled.failures()[0].kind, FailureKind::TimeoutError);
    assert!(stalled.failures()[0].message.starts_with("TimeoutError"));
    assert!(ping.passed());

    let summary = suite.finish();
    assert_eq!((summary.passed, summary.failed), (1, 1));
    assert_eq!(reporter.results().len(), 2);
}

#[tokio::test]
async fn non_json_body_fails_only_json_expectations() {
    let addr = serve().await;
    let executor = ReqwestExecutor::new().unwrap();

    let response = executor
        .execute(&request(addr, RequestBuilder::new().get("/html")))
        .await
        .unwrap();
    let result = AssertionEngine::new().evaluate(
        "html",
        &response,
        &[
            Expectation::status(200),
            Expectation::body_contains("maintenance"),
            Expectation::json_like(json!({"error": false})),
        ],
    );

    assert_eq!(result.failures().len(), 1);
    assert_eq!(result.failures()[0].kind, FailureKind::MalformedBodyError);
}
