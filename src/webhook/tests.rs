use super::*;
use crate::models::{CallStatus, Urgency};
use crate::notify::{DisabledNotifier, RecordingNotifier};
use crate::repo::tests::setup_test_db;
use serde_json::{json, Value};

fn event(body: Value) -> VoiceEvent {
    VoiceEvent::from_value(body).unwrap()
}

fn stored_id(outcome: &WebhookOutcome) -> String {
    match outcome {
        WebhookOutcome::Stored { request_id, .. } => request_id.clone(),
        WebhookOutcome::Ignored => panic!("expected the event to be stored"),
    }
}

#[tokio::test]
async fn test_full_call_lifecycle() {
    let pool = setup_test_db();
    let classifier = EmergencyClassifier::default();
    let notifier = RecordingNotifier::new();
    let ctx = WebhookContext { pool: &pool, classifier: &classifier, notifier: &notifier, default_workspace_id: Some("ws_1") };

    let started = process_event(&ctx, &event(json!({
        "type": "conversation.started",
        "conversation_id": "conv_1",
        "data": {"caller_phone": "+15550001111"}
    })))
    .await
    .unwrap();
    let ticket = process_event(&ctx, &event(json!({
        "type": "ticket.created",
        "conversation_id": "conv_1",
        "data": {"caller_name": "Dana", "issue_description": "Dishwasher won't drain", "urgency": "low"}
    })))
    .await
    .unwrap();
    let transcribed = process_event(&ctx, &event(json!({
        "type": "post_call_transcription",
        "data": {
            "conversation_id": "conv_1",
            "transcript": [{"role": "user", "message": "The dishwasher won't drain."}],
            "analysis": {"transcript_summary": "Dishwasher drain issue."}
        }
    })))
    .await
    .unwrap();

    let request_id = stored_id(&started);
    assert_eq!(stored_id(&ticket), request_id);
    assert_eq!(stored_id(&transcribed), request_id);

    let request = repo::get_maintenance_request(&pool, &request_id).unwrap().unwrap();
    assert_eq!(request.workspace_id.as_deref(), Some("ws_1"));
    assert_eq!(request.caller_phone.as_deref(), Some("+15550001111"));
    assert_eq!(request.caller_name.as_deref(), Some("Dana"));
    assert_eq!(request.urgency, Urgency::Low);
    assert_eq!(request.call_status, CallStatus::Transcribed);
    assert_eq!(request.summary.as_deref(), Some("Dishwasher drain issue."));
    assert!(!request.is_emergency);
    assert!(notifier.sent_call_ids().is_empty());

    let activity = repo::list_activity_for_request(&pool, &request_id).unwrap();
    let names: Vec<&str> = activity.iter().map(|a| a.get_action()).collect();
    assert_eq!(names, vec![actions::CALL_STARTED, actions::TICKET_CREATED, actions::TRANSCRIPTION_RECEIVED]);
}

#[tokio::test]
async fn test_emergency_notifies_once() {
    let pool = setup_test_db();
    let classifier = EmergencyClassifier::new(["gas leak"]);
    let notifier = RecordingNotifier::new();
    let ctx = WebhookContext { pool: &pool, classifier: &classifier, notifier: &notifier, default_workspace_id: None };
    let body = json!({
        "type": "post_call_transcription",
        "conversation_id": "conv_gas",
        "data": {"transcript": "Caller: there is a gas leak by the boiler"}
    });

    let first = process_event(&ctx, &event(body.clone())).await.unwrap();
    let redelivered = process_event(&ctx, &event(body)).await.unwrap();

    assert!(matches!(first, WebhookOutcome::Stored { became_emergency: true, notified: true, .. }));
    assert!(matches!(redelivered, WebhookOutcome::Stored { became_emergency: false, notified: false, created: false, .. }));
    assert_eq!(notifier.sent_call_ids(), vec!["conv_gas".to_string()]);

    let activity = repo::list_activity_for_request(&pool, &stored_id(&first)).unwrap();
    let sent = activity.iter().filter(|a| a.get_action() == actions::EMERGENCY_NOTIFICATION_SENT).count();
    assert_eq!(sent, 1);
    let transcription = activity.iter().find(|a| a.get_action() == actions::TRANSCRIPTION_RECEIVED).unwrap();
    assert_eq!(transcription.get_details()["matched_keywords"], json!(["gas leak"]));
}

#[tokio::test]
async fn test_notification_failure_does_not_fail_event() {
    let pool = setup_test_db();
    let classifier = EmergencyClassifier::default();
    let notifier = RecordingNotifier::failing();
    let ctx = WebhookContext { pool: &pool, classifier: &classifier, notifier: &notifier, default_workspace_id: None };

    let outcome = process_event(&ctx, &event(json!({
        "type": "ticket.created",
        "conversation_id": "conv_fire",
        "data": {"issue_description": "Fire in the trash chute"}
    })))
    .await
    .unwrap();

    assert!(matches!(outcome, WebhookOutcome::Stored { became_emergency: true, notified: false, .. }));
    let activity = repo::list_activity_for_request(&pool, &stored_id(&outcome)).unwrap();
    let failed = activity.iter().find(|a| a.get_action() == actions::EMERGENCY_NOTIFICATION_FAILED).unwrap();
    assert!(failed.get_details()["error"].as_str().unwrap().contains("simulated email outage"));
}

#[tokio::test]
async fn test_disabled_notifier_skips_notification_activity() {
    let pool = setup_test_db();
    let classifier = EmergencyClassifier::default();
    let ctx = WebhookContext { pool: &pool, classifier: &classifier, notifier: &DisabledNotifier, default_workspace_id: None };

    let outcome = process_event(&ctx, &event(json!({
        "type": "ticket.created",
        "conversation_id": "conv_flood",
        "data": {"issue_description": "Basement flood"}
    })))
    .await
    .unwrap();

    let activity = repo::list_activity_for_request(&pool, &stored_id(&outcome)).unwrap();
    assert_eq!(activity.len(), 1);
    assert_eq!(activity[0].get_action(), actions::TICKET_CREATED);
}

#[tokio::test]
async fn test_unknown_event_is_ignored() {
    let pool = setup_test_db();
    let classifier = EmergencyClassifier::default();
    let ctx = WebhookContext { pool: &pool, classifier: &classifier, notifier: &DisabledNotifier, default_workspace_id: None };

    let outcome = process_event(&ctx, &event(json!({"type": "call_initiation_failure", "conversation_id": "conv_x"})))
        .await
        .unwrap();

    assert_eq!(outcome, WebhookOutcome::Ignored);
    assert!(repo::get_maintenance_request_by_call_id(&pool, "conv_x").unwrap().is_none());
}

#[tokio::test]
async fn test_missing_call_id_is_a_payload_error() {
    let pool = setup_test_db();
    let classifier = EmergencyClassifier::default();
    let ctx = WebhookContext { pool: &pool, classifier: &classifier, notifier: &DisabledNotifier, default_workspace_id: None };

    let err = process_event(&ctx, &event(json!({"type": "conversation.started", "data": {}})))
        .await
        .unwrap_err();

    assert_eq!(
        err.downcast_ref::<PayloadError>(),
        Some(&PayloadError::MissingCallId(EventKind::ConversationStarted))
    );
}
