use super::*;
use crate::models::{actions, RequestPatch};
use crate::repo::tests::setup_test_db;
use crate::repo::upsert_by_call_id;
use serde_json::json;

#[tokio::test]
async fn test_record_and_list_activity() {
    let pool = setup_test_db();
    let outcome = upsert_by_call_id(&pool, "conv_1", RequestPatch::default(), &json!({}), None).await.unwrap();
    let request_id = outcome.request.id;

    record_activity(&pool, &request_id, actions::CALL_STARTED, json!({"event_type": "conversation.started"}))
        .await
        .unwrap();
    record_activity(&pool, &request_id, actions::CALL_ENDED, json!({"event_type": "conversation.ended"}))
        .await
        .unwrap();

    let entries = list_activity_for_request(&pool, &request_id).unwrap();
    let names: Vec<&str> = entries.iter().map(|e| e.get_action()).collect();
    assert_eq!(names, vec![actions::CALL_STARTED, actions::CALL_ENDED]);
    assert!(entries.iter().all(|e| e.get_maintenance_request_id() == request_id));
    assert_eq!(entries[1].get_details()["event_type"], "conversation.ended");
}

#[tokio::test]
async fn test_record_activity_requires_existing_request() {
    let pool = setup_test_db();
    let result = record_activity(&pool, "missing-id", actions::CALL_STARTED, json!({})).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_activity_is_scoped_to_request() {
    let pool = setup_test_db();
    let first = upsert_by_call_id(&pool, "conv_1", RequestPatch::default(), &json!({}), None).await.unwrap();
    let second = upsert_by_call_id(&pool, "conv_2", RequestPatch::default(), &json!({}), None).await.unwrap();

    record_activity(&pool, &first.request.id, actions::TICKET_CREATED, json!({})).await.unwrap();

    assert_eq!(list_activity_for_request(&pool, &first.request.id).unwrap().len(), 1);
    assert!(list_activity_for_request(&pool, &second.request.id).unwrap().is_empty());
}
