use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::JsonValue;

/// Actions written to the activity log by the webhook
pub mod actions {
    pub const CALL_STARTED: &str = "call_started";
    pub const CALL_ENDED: &str = "call_ended";
    pub const TICKET_CREATED: &str = "ticket_created";
    pub const TRANSCRIPTION_RECEIVED: &str = "transcription_received";
    pub const EMERGENCY_NOTIFICATION_SENT: &str = "emergency_notification_sent";
    pub const EMERGENCY_NOTIFICATION_FAILED: &str = "emergency_notification_failed";
    pub const STATUS_CHANGED: &str = "status_changed";
}

/// One entry in a maintenance request's history
///
/// This struct maps directly to the `activity_logs` table.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::activity_logs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ActivityLog {
    /// Unique identifier for the entry (UUID v4 as string)
    id: String,

    /// The maintenance request this entry belongs to
    maintenance_request_id: String,

    /// What happened, e.g. `call_started`
    action: String,

    /// Structured context for the action
    details: JsonValue,

    /// When the entry was written
    created_at: NaiveDateTime,
}

impl ActivityLog {
    /// Creates a new entry stamped with the current time
    pub fn new(maintenance_request_id: String, action: &str, details: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            maintenance_request_id,
            action: action.to_string(),
            details: JsonValue(details),
            created_at: Utc::now().naive_utc(),
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_maintenance_request_id(&self) -> String {
        self.maintenance_request_id.clone()
    }

    pub fn get_action(&self) -> &str {
        &self.action
    }

    pub fn get_details(&self) -> &serde_json::Value {
        &self.details.0
    }

    pub fn get_created_at(&self) -> NaiveDateTime {
        self.created_at
    }
}
