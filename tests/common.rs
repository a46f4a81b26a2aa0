/// Common test utilities for Switchboard integration tests
///
/// Builds the full router on a fresh in-memory database with a recording
/// notifier, and wraps the request/response plumbing the tests share.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use switchboard::{
    create_app,
    db::DbPool,
    notify::{Notifier, RecordingNotifier},
    repo::tests::setup_test_db,
    webhook::EmergencyClassifier,
    AppState,
};
use tower::ServiceExt;

pub const WEBHOOK_PATH: &str = "/webhooks/voice-agent";

/// A router plus handles on the state behind it
pub struct TestApp {
    pub router: Router,
    pub pool: Arc<DbPool>,
    pub notifier: Arc<RecordingNotifier>,
}

/// Creates a test application with the default emergency keywords
pub fn create_test_app() -> TestApp {
    create_test_app_with(RecordingNotifier::new(), None)
}

/// Creates a test application around the given notifier and default workspace
pub fn create_test_app_with(notifier: RecordingNotifier, default_workspace_id: Option<&str>) -> TestApp {
    let pool = setup_test_db();
    let notifier = Arc::new(notifier);
    let mut state = AppState::new(
        pool.clone(),
        EmergencyClassifier::default(),
        notifier.clone() as Arc<dyn Notifier>,
    );
    if let Some(workspace_id) = default_workspace_id {
        state = state.with_default_workspace(workspace_id);
    }

    TestApp {
        router: create_app(state),
        pool,
        notifier,
    }
}

/// Sends a request and returns the status and the body parsed as JSON
///
/// An empty body comes back as `Value::Null`.
pub async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

/// POSTs raw bytes to the webhook
pub async fn post_webhook_raw(app: &TestApp, body: impl Into<Body>) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(WEBHOOK_PATH)
        .method("POST")
        .header("Content-Type", "application/json")
        .body(body.into())
        .unwrap();
    send(app, request).await
}

/// POSTs a JSON payload to the webhook
pub async fn post_webhook(app: &TestApp, payload: &Value) -> (StatusCode, Value) {
    post_webhook_raw(app, serde_json::to_vec(payload).unwrap()).await
}

pub async fn get_json(app: &TestApp, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).method("GET").body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn patch_json(app: &TestApp, uri: &str, payload: &Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(uri)
        .method("PATCH")
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_vec(payload).unwrap()))
        .unwrap();
    send(app, request).await
}

/// Lists every stored maintenance request through the API
pub async fn list_requests(app: &TestApp) -> Vec<Value> {
    let (status, body) = get_json(app, "/maintenance_requests").await;
    assert_eq!(status, StatusCode::OK);
    body.as_array().cloned().unwrap()
}

/// Runs a `ticket.created` event through the webhook and returns the stored request
pub async fn create_ticket(app: &TestApp, call_id: &str, data: Value) -> Value {
    let payload = serde_json::json!({
        "type": "ticket.created",
        "conversation_id": call_id,
        "data": data,
    });
    let (status, _) = post_webhook(app, &payload).await;
    assert_eq!(status, StatusCode::OK);

    list_requests(app)
        .await
        .into_iter()
        .find(|r| r["call_id"] == call_id)
        .unwrap()
}
