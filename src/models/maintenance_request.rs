use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CallStatus, JsonValue, RequestStatus, Urgency};

/// Alphabet for generated ticket numbers; no 0/O or 1/I to keep them readable over the phone
const TICKET_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// A maintenance request captured from a voice-agent call
///
/// Maps to the `maintenance_requests` table. Exactly one row exists per
/// `call_id`; later events for the same call are merged into it with
/// [`MaintenanceRequest::merge`].
#[derive(Queryable, Selectable, Insertable, AsChangeset, Identifiable, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::maintenance_requests)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct MaintenanceRequest {
    pub id: String,
    pub workspace_id: Option<String>,
    pub call_id: String,
    pub agent_id: Option<String>,
    pub ticket_number: String,
    pub caller_name: Option<String>,
    pub caller_phone: Option<String>,
    pub caller_email: Option<String>,
    pub property_address: Option<String>,
    pub unit_number: Option<String>,
    pub issue_category: Option<String>,
    pub issue_description: Option<String>,
    pub urgency: Urgency,
    /// Set once any event has reported an urgency; until then `urgency` is the default
    #[serde(skip)]
    pub urgency_reported: bool,
    pub is_emergency: bool,
    pub status: RequestStatus,
    pub call_status: CallStatus,
    pub permission_to_enter: Option<bool>,
    pub pets_on_premises: Option<bool>,
    pub call_started_at: Option<NaiveDateTime>,
    pub call_ended_at: Option<NaiveDateTime>,
    pub call_duration_secs: Option<i32>,
    pub transcript: Option<String>,
    pub summary: Option<String>,
    pub raw_payload: JsonValue,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// The fields one call event contributes to a maintenance request
///
/// `None` means "this event did not mention the field", never "clear it".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestPatch {
    pub workspace_id: Option<String>,
    pub agent_id: Option<String>,
    pub ticket_number: Option<String>,
    pub caller_name: Option<String>,
    pub caller_phone: Option<String>,
    pub caller_email: Option<String>,
    pub property_address: Option<String>,
    pub unit_number: Option<String>,
    pub issue_category: Option<String>,
    pub issue_description: Option<String>,
    pub urgency: Option<Urgency>,
    pub is_emergency: bool,
    pub call_status: Option<CallStatus>,
    pub permission_to_enter: Option<bool>,
    pub pets_on_premises: Option<bool>,
    pub call_started_at: Option<NaiveDateTime>,
    pub call_ended_at: Option<NaiveDateTime>,
    /// Start time to use only when the call has none stored
    pub fallback_started_at: Option<NaiveDateTime>,
    /// End time to use only when the call has none stored
    pub fallback_ended_at: Option<NaiveDateTime>,
    pub call_duration_secs: Option<i32>,
    pub transcript: Option<String>,
    pub summary: Option<String>,
}

impl MaintenanceRequest {
    /// Creates the first row for a call from the event that introduced it
    pub fn from_patch(call_id: String, patch: RequestPatch, raw_payload: serde_json::Value) -> Self {
        let now = Utc::now().naive_utc();
        let mut request = Self {
            id: Uuid::new_v4().to_string(),
            workspace_id: None,
            call_id,
            agent_id: None,
            ticket_number: String::new(),
            caller_name: None,
            caller_phone: None,
            caller_email: None,
            property_address: None,
            unit_number: None,
            issue_category: None,
            issue_description: None,
            urgency: Urgency::default(),
            urgency_reported: false,
            is_emergency: false,
            status: RequestStatus::New,
            call_status: CallStatus::Started,
            permission_to_enter: None,
            pets_on_premises: None,
            call_started_at: None,
            call_ended_at: None,
            call_duration_secs: None,
            transcript: None,
            summary: None,
            raw_payload: JsonValue(raw_payload),
            created_at: now,
            updated_at: now,
        };
        request.ticket_number = patch.ticket_number.clone().unwrap_or_else(generate_ticket_number);
        request.merge(patch);
        request
    }

    /// Folds a later event for the same call into this request
    ///
    /// Present fields overwrite, absent fields keep their stored value.
    /// The first reported urgency replaces the default; after that urgency
    /// only rises. Call status only moves forward and an emergency flag is
    /// never cleared.
    pub fn merge(&mut self, patch: RequestPatch) {
        fn overwrite<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        overwrite(&mut self.workspace_id, patch.workspace_id);
        overwrite(&mut self.agent_id, patch.agent_id);
        overwrite(&mut self.caller_name, patch.caller_name);
        overwrite(&mut self.caller_phone, patch.caller_phone);
        overwrite(&mut self.caller_email, patch.caller_email);
        overwrite(&mut self.property_address, patch.property_address);
        overwrite(&mut self.unit_number, patch.unit_number);
        overwrite(&mut self.issue_category, patch.issue_category);
        overwrite(&mut self.issue_description, patch.issue_description);
        overwrite(&mut self.permission_to_enter, patch.permission_to_enter);
        overwrite(&mut self.pets_on_premises, patch.pets_on_premises);
        overwrite(&mut self.call_started_at, patch.call_started_at);
        overwrite(&mut self.call_ended_at, patch.call_ended_at);
        overwrite(&mut self.call_duration_secs, patch.call_duration_secs);
        overwrite(&mut self.transcript, patch.transcript);
        overwrite(&mut self.summary, patch.summary);

        if self.call_started_at.is_none() {
            self.call_started_at = patch.fallback_started_at;
        }
        if self.call_ended_at.is_none() {
            self.call_ended_at = patch.fallback_ended_at;
        }

        if let Some(ticket_number) = patch.ticket_number {
            self.ticket_number = ticket_number;
        }
        if let Some(urgency) = patch.urgency {
            self.urgency = if self.urgency_reported { self.urgency.max(urgency) } else { urgency };
            self.urgency_reported = true;
        }
        if let Some(call_status) = patch.call_status {
            self.call_status = self.call_status.max(call_status);
        }

        self.is_emergency = self.is_emergency || patch.is_emergency || self.urgency == Urgency::Emergency;
        if self.is_emergency {
            self.urgency = Urgency::Emergency;
        }

        self.updated_at = Utc::now().naive_utc();
    }
}

/// Generates a short human-friendly ticket number such as `MR-7KQ2ZP4M`
pub fn generate_ticket_number() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..8)
        .map(|_| TICKET_ALPHABET[rng.random_range(0..TICKET_ALPHABET.len())] as char)
        .collect();
    format!("MR-{}", suffix)
}
