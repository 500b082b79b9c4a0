use super::*;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use serde_json::{Value, json};
use tokio::io::AsyncReadExt;

use config::LlmTimeouts;
use prompt::{ISSUES_HEADER, IssueContext, MAX_DESCRIPTION_CHARS};

// =========================================================================
// Helpers
// =========================================================================

#[derive(Clone, Default)]
struct Captured {
    bodies: Arc<Mutex<Vec<Value>>>,
    auth: Arc<Mutex<Vec<String>>>,
}

fn live_config(base_url: String, request_timeout: Duration) -> LlmConfig {
    LlmConfig {
        api_key: Some("sk-test".into()),
        base_url,
        timeouts: LlmTimeouts { request: request_timeout, connect: Duration::from_secs(2) },
        ..LlmConfig::default()
    }
}

fn issues(count: usize, description_len: usize) -> Vec<IssueRecord> {
    (0..count)
        .map(|n| IssueRecord {
            id: n.to_string(),
            key: format!("PROJ-{n}"),
            summary: format!("Story {n}"),
            status: "Open".into(),
            assignee: "Alice".into(),
            description: Some("d".repeat(description_len)),
        })
        .collect()
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn capturing_gateway(captured: Captured) -> String {
    async fn handler(State(captured): State<Captured>, headers: HeaderMap, body: axum::Json<Value>) -> axum::Json<Value> {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        captured.auth.lock().unwrap().push(auth);
        captured.bodies.lock().unwrap().push(body.0);
        axum::Json(json!({
            "model": "nvidia/nemotron-nano-9b-v2",
            "choices": [{ "message": { "content": "Summary: fine." }, "finish_reason": "stop" }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 3 }
        }))
    }
    serve(Router::new().route("/chat/completions", post(handler)).with_state(captured)).await
}

/// A port with nothing listening on it.
fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

// =========================================================================
// Placeholder mode
// =========================================================================

#[tokio::test]
async fn placeholder_mode_makes_no_outbound_call() {
    let captured = Captured::default();
    let base_url = capturing_gateway(captured.clone()).await;
    let config = LlmConfig { api_key: None, base_url, ..LlmConfig::default() };
    let client = ModelClient::from_config(config).unwrap();

    assert_eq!(client.mode(), ModelMode::Placeholder);
    let reply = client.analyze("status?", &issues(2, 10)).await.unwrap();
    assert!(reply.contains("status?"));
    assert!(reply.contains('2'));
    assert!(captured.bodies.lock().unwrap().is_empty());
}

// =========================================================================
// Live mode: request shape
// =========================================================================

#[tokio::test]
async fn live_request_is_bounded_and_authorized() {
    let captured = Captured::default();
    let base_url = capturing_gateway(captured.clone()).await;
    let client = ModelClient::from_config(live_config(base_url, Duration::from_secs(5))).unwrap();

    assert_eq!(client.mode(), ModelMode::Live);
    let reply = client.analyze("what is late?", &issues(15, 800)).await.unwrap();
    assert_eq!(reply, "Summary: fine.");

    let bodies = captured.bodies.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    let body: ModelRequestBody = serde_json::from_value(bodies[0].clone()).unwrap();
    assert_eq!(body.model, config::DEFAULT_MODEL);
    assert_eq!(body.max_tokens, 2000);
    assert!((body.temperature - 0.2).abs() < f32::EPSILON);
    assert_eq!(body.messages.len(), 2);

    let (_, json) = body.messages[1].content.split_once(ISSUES_HEADER).unwrap();
    let sent: Vec<IssueContext> = serde_json::from_str(json.trim()).unwrap();
    assert_eq!(sent.len(), 10);
    assert_eq!(sent[9].key, "PROJ-9");
    assert!(sent.iter().all(|i| i.description.chars().count() <= MAX_DESCRIPTION_CHARS));

    assert_eq!(captured.auth.lock().unwrap()[0], "Bearer sk-test");
}

// =========================================================================
// Live mode: error kinds
// =========================================================================

#[tokio::test]
async fn error_status_maps_to_upstream_error() {
    let app = Router::new().route(
        "/chat/completions",
        post(|| async {
            (StatusCode::PAYMENT_REQUIRED, axum::Json(json!({ "error": { "message": "Insufficient credits" } })))
        }),
    );
    let client = ModelClient::from_config(live_config(serve(app).await, Duration::from_secs(5))).unwrap();
    let err = client.analyze("q", &issues(1, 1)).await.unwrap_err();
    assert!(matches!(err, ModelError::UpstreamError { status: 402, ref message } if message == "Insufficient credits"));
}

#[tokio::test]
async fn empty_choice_maps_to_empty_response() {
    let app = Router::new().route(
        "/chat/completions",
        post(|| async { axum::Json(json!({ "choices": [{ "message": { "content": "" } }] })) }),
    );
    let client = ModelClient::from_config(live_config(serve(app).await, Duration::from_secs(5))).unwrap();
    let err = client.analyze("q", &issues(1, 1)).await.unwrap_err();
    assert!(matches!(err, ModelError::EmptyResponse));
}

#[tokio::test]
async fn truncated_reply_is_still_returned() {
    let app = Router::new().route(
        "/chat/completions",
        post(|| async {
            axum::Json(json!({ "choices": [{ "message": { "content": "Partial answer" }, "finish_reason": "length" }] }))
        }),
    );
    let client = ModelClient::from_config(live_config(serve(app).await, Duration::from_secs(5))).unwrap();
    assert_eq!(client.analyze("q", &issues(1, 1)).await.unwrap(), "Partial answer");
}

#[tokio::test]
async fn stalled_gateway_maps_to_timeout() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let _held = socket;
                tokio::time::sleep(Duration::from_secs(30)).await;
            });
        }
    });

    let client = ModelClient::from_config(live_config(format!("http://{addr}"), Duration::from_millis(200))).unwrap();
    let err = client.analyze("q", &issues(1, 1)).await.unwrap_err();
    assert!(matches!(err, ModelError::Timeout), "got {err:?}");
}

#[tokio::test]
async fn refused_connection_maps_to_network_unreachable() {
    let client = ModelClient::from_config(live_config(closed_port_url(), Duration::from_secs(5))).unwrap();
    let err = client.analyze("q", &issues(1, 1)).await.unwrap_err();
    assert!(matches!(err, ModelError::NetworkUnreachable(_)), "got {err:?}");
}

#[tokio::test]
async fn unresolvable_host_maps_to_network_unreachable() {
    let config = live_config("http://model-gateway.invalid".into(), Duration::from_secs(10));
    let client = ModelClient::from_config(config).unwrap();
    let err = client.analyze("q", &issues(1, 1)).await.unwrap_err();
    assert!(matches!(err, ModelError::NetworkUnreachable(_)), "got {err:?}");
}

#[tokio::test]
async fn dropped_connection_maps_to_no_response() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0_u8; 4096];
            let _ = socket.read(&mut buf).await;
            drop(socket);
        }
    });

    let client = ModelClient::from_config(live_config(format!("http://{addr}"), Duration::from_secs(5))).unwrap();
    let err = client.analyze("q", &issues(1, 1)).await.unwrap_err();
    assert!(matches!(err, ModelError::NoResponse(_)), "got {err:?}");
}

#[test]
fn error_kinds_have_distinct_codes() {
    use crate::error::ErrorCode;
    let codes = [
        ModelError::NetworkUnreachable(String::new()).error_code(),
        ModelError::Timeout.error_code(),
        ModelError::UpstreamError { status: 500, message: String::new() }.error_code(),
        ModelError::NoResponse(String::new()).error_code(),
        ModelError::EmptyResponse.error_code(),
        ModelError::Unknown(String::new()).error_code(),
    ];
    let unique: std::collections::HashSet<_> = codes.iter().collect();
    assert_eq!(unique.len(), codes.len());
}
