use std::fmt;

use serde_json::Value;
use thiserror::Error;

use super::normalize::{lookup, normalize_string};

/// Problems with an inbound webhook body that make it unusable
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("Invalid JSON payload: {0}")]
    InvalidJson(String),
    #[error("Payload must be a JSON object")]
    NotAnObject,
    #[error("Missing conversation_id for {0} event")]
    MissingCallId(EventKind),
}

/// The call events the voice platform sends
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    ConversationStarted,
    ConversationEnded,
    TicketCreated,
    PostCallTranscription,
    /// Anything else, kept verbatim for logging
    Other(String),
}

impl EventKind {
    pub fn parse(label: &str) -> Self {
        match label {
            "conversation.started" => EventKind::ConversationStarted,
            "conversation.ended" => EventKind::ConversationEnded,
            "ticket.created" => EventKind::TicketCreated,
            "post_call_transcription" => EventKind::PostCallTranscription,
            other => EventKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventKind::ConversationStarted => "conversation.started",
            EventKind::ConversationEnded => "conversation.ended",
            EventKind::TicketCreated => "ticket.created",
            EventKind::PostCallTranscription => "post_call_transcription",
            EventKind::Other(label) => label,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded webhook delivery
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceEvent {
    pub kind: EventKind,
    pub call_id: Option<String>,
    /// The `data` object, or an empty object when the payload had none
    pub data: Value,
    /// The full body as received
    pub raw: Value,
}

impl VoiceEvent {
    /// Parses a raw request body
    pub fn from_slice(body: &[u8]) -> Result<Self, PayloadError> {
        let raw: Value =
            serde_json::from_slice(body).map_err(|e| PayloadError::InvalidJson(e.to_string()))?;
        Self::from_value(raw)
    }

    /// Decodes an already-parsed body
    ///
    /// The event type comes from `event_type`, falling back to `type`. The
    /// call id comes from `conversation_id` or `call_id`, at the top level
    /// first and then inside `data`.
    pub fn from_value(raw: Value) -> Result<Self, PayloadError> {
        if !raw.is_object() {
            return Err(PayloadError::NotAnObject);
        }

        let label = ["event_type", "type"]
            .iter()
            .find_map(|key| raw.get(*key).and_then(normalize_string))
            .unwrap_or_default();

        let data = match raw.get("data") {
            Some(data @ Value::Object(_)) => data.clone(),
            _ => Value::Object(Default::default()),
        };

        let call_id = ["conversation_id", "call_id"]
            .iter()
            .find_map(|key| raw.get(*key).and_then(normalize_string))
            .or_else(|| {
                ["conversation_id", "call_id", "metadata.phone_call.call_sid"]
                    .iter()
                    .find_map(|path| lookup(&data, path).and_then(normalize_string))
            });

        Ok(Self {
            kind: EventKind::parse(&label),
            call_id,
            data,
            raw,
        })
    }

    /// The call id, or an error naming the event that lacked one
    pub fn require_call_id(&self) -> Result<&str, PayloadError> {
        self.call_id
            .as_deref()
            .ok_or_else(|| PayloadError::MissingCallId(self.kind.clone()))
    }
}
