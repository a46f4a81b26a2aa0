use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

use super::emergency::EmergencyClassifier;
use super::normalize::{build_transcript_text, lookup, normalize_string, parse_boolean, parse_seconds};
use super::payload::{EventKind, VoiceEvent};
use crate::models::{CallStatus, RequestPatch, Urgency};

const WORKSPACE_ID: &[&str] = &["workspace_id", "organization_id", "org_id"];
const AGENT_ID: &[&str] = &["agent_id"];
const TICKET_NUMBER: &[&str] = &["ticket_number", "ticket_id"];
const CALLER_NAME: &[&str] = &["caller_name", "tenant_name", "resident_name", "name"];
const CALLER_PHONE: &[&str] = &[
    "caller_phone",
    "phone_number",
    "callback_number",
    "phone",
    "from_number",
    "metadata.phone_call.external_number",
];
const CALLER_EMAIL: &[&str] = &["caller_email", "email"];
const PROPERTY_ADDRESS: &[&str] = &["property_address", "address", "property"];
const UNIT_NUMBER: &[&str] = &["unit_number", "unit", "apartment"];
const ISSUE_CATEGORY: &[&str] = &["issue_category", "category", "issue_type"];
const ISSUE_DESCRIPTION: &[&str] = &["issue_description", "description", "issue", "problem"];
const URGENCY: &[&str] = &["urgency", "urgency_level", "priority"];
const EMERGENCY_FLAG: &[&str] = &["is_emergency", "emergency"];
const PERMISSION_TO_ENTER: &[&str] = &["permission_to_enter", "entry_permission", "ok_to_enter"];
const PETS_ON_PREMISES: &[&str] = &["pets_on_premises", "has_pets", "pets"];
const SUMMARY: &[&str] = &["summary", "analysis.transcript_summary", "call_summary"];
const STARTED_AT: &[&str] = &["started_at", "start_time_unix_secs", "metadata.start_time_unix_secs"];
const ENDED_AT: &[&str] = &["ended_at", "end_time_unix_secs", "metadata.end_time_unix_secs"];
const DURATION: &[&str] = &["call_duration_secs", "duration_secs", "duration", "metadata.call_duration_secs"];

/// What a single event contributes, plus the evidence behind its emergency flag
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub patch: RequestPatch,
    pub matched_keywords: Vec<String>,
}

/// Finds the first alias with a usable value
///
/// Each alias is tried against `data` itself, then the agent's collected
/// data (`analysis.data_collection_results.<alias>.value`), then the
/// dynamic variables the call was started with.
fn find_field<T>(data: &Value, aliases: &[&str], read: impl Fn(&Value) -> Option<T>) -> Option<T> {
    const SOURCES: &[&str] = &[
        "",
        "analysis.data_collection_results",
        "conversation_initiation_client_data.dynamic_variables",
    ];

    SOURCES.iter().find_map(|source| {
        let scope = if source.is_empty() { Some(data) } else { lookup(data, source) }?;
        aliases.iter().find_map(|alias| {
            let value = lookup(scope, alias)?;
            // collected data wraps values as {"value": ..., "rationale": ...}
            let value = match value.get("value") {
                Some(inner) if value.is_object() => inner,
                _ => value,
            };
            read(value)
        })
    })
}

fn text(data: &Value, aliases: &[&str]) -> Option<String> {
    find_field(data, aliases, normalize_string)
}

fn flag(data: &Value, aliases: &[&str]) -> Option<bool> {
    find_field(data, aliases, parse_boolean)
}

/// Reads unix seconds, unix milliseconds, or an RFC 3339 string
pub fn parse_timestamp(value: &Value) -> Option<NaiveDateTime> {
    let from_number = |n: f64| {
        let secs = if n > 1e12 { n / 1000.0 } else { n };
        DateTime::<Utc>::from_timestamp(secs.trunc() as i64, 0).map(|dt| dt.naive_utc())
    };
    match value {
        Value::Number(n) => n.as_f64().and_then(from_number),
        Value::String(s) => {
            let s = s.trim();
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc).naive_utc())
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(from_number))
        }
        _ => None,
    }
}

/// Turns an event into the fields it sets on its maintenance request
///
/// Unhandled event kinds produce an empty extraction.
pub fn extract(event: &VoiceEvent, classifier: &EmergencyClassifier) -> Extraction {
    let data = &event.data;
    let event_time = event.raw.get("event_timestamp").and_then(parse_timestamp);

    let mut patch = RequestPatch {
        workspace_id: text(data, WORKSPACE_ID),
        agent_id: text(data, AGENT_ID),
        caller_phone: text(data, CALLER_PHONE),
        caller_name: text(data, CALLER_NAME),
        ..Default::default()
    };

    match event.kind {
        EventKind::ConversationStarted => {
            patch.call_status = Some(CallStatus::Started);
            patch.call_started_at = find_field(data, STARTED_AT, parse_timestamp);
            patch.fallback_started_at = event_time.or_else(|| Some(Utc::now().naive_utc()));
        }
        EventKind::ConversationEnded => {
            patch.call_status = Some(CallStatus::Ended);
            apply_call_summary(&mut patch, data);
            patch.fallback_ended_at = event_time.or_else(|| Some(Utc::now().naive_utc()));
        }
        EventKind::TicketCreated => {
            apply_ticket_fields(&mut patch, data);
        }
        EventKind::PostCallTranscription => {
            patch.call_status = Some(CallStatus::Transcribed);
            apply_ticket_fields(&mut patch, data);
            apply_call_summary(&mut patch, data);
        }
        EventKind::Other(_) => return Extraction::default(),
    }

    let haystack = [&patch.issue_description, &patch.summary, &patch.transcript]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n");
    let matched_keywords = classifier.matches(&haystack);

    let explicit = flag(data, EMERGENCY_FLAG).unwrap_or(false);
    if explicit || !matched_keywords.is_empty() || patch.urgency == Some(Urgency::Emergency) {
        patch.is_emergency = true;
        patch.urgency = Some(Urgency::Emergency);
    }

    Extraction { patch, matched_keywords }
}

fn apply_ticket_fields(patch: &mut RequestPatch, data: &Value) {
    patch.ticket_number = text(data, TICKET_NUMBER);
    patch.caller_email = text(data, CALLER_EMAIL);
    patch.property_address = text(data, PROPERTY_ADDRESS);
    patch.unit_number = text(data, UNIT_NUMBER);
    patch.issue_category = text(data, ISSUE_CATEGORY);
    patch.issue_description = text(data, ISSUE_DESCRIPTION);
    patch.urgency = text(data, URGENCY).and_then(|u| Urgency::parse_lenient(&u));
    patch.permission_to_enter = flag(data, PERMISSION_TO_ENTER);
    patch.pets_on_premises = flag(data, PETS_ON_PREMISES);
}

fn apply_call_summary(patch: &mut RequestPatch, data: &Value) {
    patch.transcript = data.get("transcript").and_then(build_transcript_text);
    patch.summary = text(data, SUMMARY);
    patch.call_duration_secs = find_field(data, DURATION, parse_seconds);
    patch.call_started_at = find_field(data, STARTED_AT, parse_timestamp);
    patch.call_ended_at = find_field(data, ENDED_AT, parse_timestamp).or_else(|| {
        let started = patch.call_started_at?;
        let duration = patch.call_duration_secs?;
        Some(started + chrono::Duration::seconds(i64::from(duration)))
    });
}
