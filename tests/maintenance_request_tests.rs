/// Integration tests for the maintenance request API
///
/// This file contains tests for:
/// - Listing requests with status, emergency and workspace filters
/// - Fetching a single request
/// - Moving a request through its workflow
/// - Reading a request's activity log
/// - The health probe

use axum::http::StatusCode;
use serde_json::json;
use switchboard::notify::RecordingNotifier;

mod common;
use common::*;

#[tokio::test]
async fn test_list_empty() {
    let app = create_test_app();
    assert!(list_requests(&app).await.is_empty());
}

#[tokio::test]
async fn test_list_newest_first() {
    let app = create_test_app();

    create_ticket(&app, "conv_a", json!({"issue_description": "Dripping faucet"})).await;
    create_ticket(&app, "conv_b", json!({"issue_description": "Squeaky door"})).await;

    let requests = list_requests(&app).await;
    let call_ids: Vec<&str> = requests.iter().map(|r| r["call_id"].as_str().unwrap()).collect();
    assert_eq!(call_ids, vec!["conv_b", "conv_a"]);
}

#[tokio::test]
async fn test_list_filters() {
    let app = create_test_app();

    create_ticket(&app, "conv_fire", json!({"issue_description": "Smoke coming from the outlet", "workspace_id": "ws_1"})).await;
    let quiet = create_ticket(&app, "conv_quiet", json!({"issue_description": "Loose cabinet hinge", "workspace_id": "ws_2"})).await;
    let id = quiet["id"].as_str().unwrap();
    let (status, _) = patch_json(&app, &format!("/maintenance_requests/{}/status", id), &json!({"status": "assigned"})).await;
    assert_eq!(status, StatusCode::OK);

    let (_, emergencies) = get_json(&app, "/maintenance_requests?emergency=true").await;
    let emergencies = emergencies.as_array().unwrap();
    assert_eq!(emergencies.len(), 1);
    assert_eq!(emergencies[0]["call_id"], "conv_fire");

    let (_, assigned) = get_json(&app, "/maintenance_requests?status=assigned").await;
    let assigned = assigned.as_array().unwrap();
    assert_eq!(assigned.len(), 1);
    assert_eq!(assigned[0]["call_id"], "conv_quiet");

    let (_, workspace) = get_json(&app, "/maintenance_requests?workspace_id=ws_1&status=new").await;
    let workspace = workspace.as_array().unwrap();
    assert_eq!(workspace.len(), 1);
    assert_eq!(workspace[0]["call_id"], "conv_fire");

    let (_, limited) = get_json(&app, "/maintenance_requests?limit=1").await;
    assert_eq!(limited.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_rejects_unknown_status_filter() {
    let app = create_test_app();

    let (status, body) = get_json(&app, "/maintenance_requests?status=bogus").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_get_request() {
    let app = create_test_app();
    let created = create_ticket(&app, "conv_get", json!({"caller_name": "Ari"})).await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = get_json(&app, &format!("/maintenance_requests/{}", id)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);
    assert_eq!(body["caller_name"], "Ari");
}

#[tokio::test]
async fn test_get_missing_request_is_null() {
    let app = create_test_app();

    let (status, body) = get_json(&app, "/maintenance_requests/does-not-exist").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.is_null());
}

#[tokio::test]
async fn test_update_status_logs_activity() {
    let app = create_test_app();
    let created = create_ticket(&app, "conv_status", json!({"issue_description": "Clogged drain"})).await;
    let id = created["id"].as_str().unwrap();

    let (status, body) =
        patch_json(&app, &format!("/maintenance_requests/{}/status", id), &json!({"status": "in_progress"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "in_progress");

    let (_, activity) = get_json(&app, &format!("/maintenance_requests/{}/activity", id)).await;
    let last = activity.as_array().unwrap().last().cloned().unwrap();
    assert_eq!(last["action"], "status_changed");
    assert_eq!(last["details"], json!({"from": "new", "to": "in_progress"}));
}

#[tokio::test]
async fn test_update_status_invalid() {
    let app = create_test_app();
    let created = create_ticket(&app, "conv_bad_status", json!({})).await;
    let id = created["id"].as_str().unwrap();

    let (status, body) =
        patch_json(&app, &format!("/maintenance_requests/{}/status", id), &json!({"status": "teleported"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid status: teleported");
}

#[tokio::test]
async fn test_update_status_without_status_field() {
    let app = create_test_app();
    let created = create_ticket(&app, "conv_no_status", json!({})).await;
    let id = created["id"].as_str().unwrap();

    let (status, body) =
        patch_json(&app, &format!("/maintenance_requests/{}/status", id), &json!({"state": "x"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("status"));
}

#[tokio::test]
async fn test_update_status_missing_request() {
    let app = create_test_app();

    let (status, body) =
        patch_json(&app, "/maintenance_requests/nope/status", &json!({"status": "completed"})).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Maintenance request not found");
}

#[tokio::test]
async fn test_status_survives_later_call_events() {
    let app = create_test_app();
    let created = create_ticket(&app, "conv_keep", json!({"issue_description": "Light fixture out"})).await;
    let id = created["id"].as_str().unwrap();
    patch_json(&app, &format!("/maintenance_requests/{}/status", id), &json!({"status": "completed"})).await;

    post_webhook(
        &app,
        &json!({"type": "post_call_transcription", "conversation_id": "conv_keep", "data": {"transcript": "Caller: thanks"}}),
    )
    .await;

    let (_, body) = get_json(&app, &format!("/maintenance_requests/{}", id)).await;
    assert_eq!(body["status"], "completed");
    assert_eq!(body["call_status"], "transcribed");
}

#[tokio::test]
async fn test_activity_for_missing_request_is_not_found() {
    let app = create_test_app();

    let (status, _) = get_json(&app, "/maintenance_requests/ghost/activity").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_activity_records_emergency_alert() {
    let app = create_test_app_with(RecordingNotifier::new(), None);
    let created = create_ticket(&app, "conv_co", json!({"issue_description": "Carbon monoxide alarm going off"})).await;
    let id = created["id"].as_str().unwrap();

    let (_, activity) = get_json(&app, &format!("/maintenance_requests/{}/activity", id)).await;
    let actions: Vec<&str> = activity.as_array().unwrap().iter().map(|a| a["action"].as_str().unwrap()).collect();

    assert_eq!(actions, vec!["ticket_created", "emergency_notification_sent"]);
    assert_eq!(app.notifier.sent_call_ids(), vec!["conv_co".to_string()]);
}

#[tokio::test]
async fn test_health() {
    let app = create_test_app();

    let (status, body) = get_json(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}
