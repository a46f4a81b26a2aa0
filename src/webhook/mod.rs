/// Voice-agent webhook processing
///
/// Turns call events from the conversational-AI phone platform into
/// maintenance requests. Each delivery is decoded ([`payload`]), reduced to
/// the fields it carries ([`extract`]), merged into the request for its call
/// ([`crate::repo::upsert_by_call_id`]) and logged. A request that turns into
/// an emergency triggers one alert through the configured notifier.

pub mod emergency;
pub mod extract;
pub mod normalize;
pub mod payload;

pub use emergency::{EmergencyClassifier, DEFAULT_EMERGENCY_KEYWORDS};
pub use payload::{EventKind, PayloadError, VoiceEvent};

use serde_json::json;
use tracing::{error, info, instrument, warn};

use crate::db::DbPool;
use crate::models::actions;
use crate::notify::Notifier;
use crate::repo;

/// What happened to a delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// The event was stored against the given maintenance request
    Stored {
        request_id: String,
        created: bool,
        became_emergency: bool,
        notified: bool,
    },
    /// The event type is not one this service acts on
    Ignored,
}

/// Everything event processing needs besides the event itself
pub struct WebhookContext<'a> {
    pub pool: &'a DbPool,
    pub classifier: &'a EmergencyClassifier,
    pub notifier: &'a dyn Notifier,
    pub default_workspace_id: Option<&'a str>,
}

fn activity_action(kind: &EventKind) -> Option<&'static str> {
    match kind {
        EventKind::ConversationStarted => Some(actions::CALL_STARTED),
        EventKind::ConversationEnded => Some(actions::CALL_ENDED),
        EventKind::TicketCreated => Some(actions::TICKET_CREATED),
        EventKind::PostCallTranscription => Some(actions::TRANSCRIPTION_RECEIVED),
        EventKind::Other(_) => None,
    }
}

/// Handles one decoded delivery
///
/// Storage failures are returned; activity-log and notification failures are
/// logged and swallowed so the platform is not told to redeliver an event
/// that was already stored.
///
/// ### Errors
///
/// Returns [`PayloadError::MissingCallId`] (wrapped) when a handled event has
/// no call id, or the storage error when the upsert fails.
#[instrument(skip(ctx, event), fields(event_type = %event.kind, call_id = ?event.call_id))]
pub async fn process_event(ctx: &WebhookContext<'_>, event: &VoiceEvent) -> anyhow::Result<WebhookOutcome> {
    let Some(action) = activity_action(&event.kind) else {
        info!("Ignoring unhandled voice agent event");
        return Ok(WebhookOutcome::Ignored);
    };

    let call_id = event.require_call_id()?;
    let extraction = extract::extract(event, ctx.classifier);
    if !extraction.matched_keywords.is_empty() {
        warn!(keywords = ?extraction.matched_keywords, "Emergency keywords detected");
    }

    let outcome = repo::upsert_by_call_id(
        ctx.pool,
        call_id,
        extraction.patch,
        &event.raw,
        ctx.default_workspace_id,
    )
    .await?;
    let request = &outcome.request;

    let details = json!({
        "event_type": event.kind.as_str(),
        "created": outcome.created,
        "is_emergency": request.is_emergency,
        "matched_keywords": extraction.matched_keywords,
    });
    if let Err(e) = repo::record_activity(ctx.pool, &request.id, action, details).await {
        error!("Failed to record {} activity: {:#}", action, e);
    }

    let mut notified = false;
    if outcome.became_emergency && ctx.notifier.is_enabled() {
        let (log_action, details) = match ctx.notifier.send_emergency_alert(request).await {
            Ok(()) => {
                notified = true;
                info!(request_id = %request.id, "Emergency alert sent");
                (actions::EMERGENCY_NOTIFICATION_SENT, json!({ "ticket_number": request.ticket_number }))
            }
            Err(e) => {
                error!(request_id = %request.id, "Failed to send emergency alert: {:#}", e);
                (actions::EMERGENCY_NOTIFICATION_FAILED, json!({ "error": e.to_string() }))
            }
        };
        if let Err(e) = repo::record_activity(ctx.pool, &request.id, log_action, details).await {
            error!("Failed to record {} activity: {:#}", log_action, e);
        }
    }

    Ok(WebhookOutcome::Stored {
        request_id: request.id.clone(),
        created: outcome.created,
        became_emergency: outcome.became_emergency,
        notified,
    })
}

#[cfg(test)]
mod tests;
