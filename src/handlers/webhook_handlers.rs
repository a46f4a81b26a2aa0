use axum::{body::Bytes, extract::State, Json};
use tracing::{debug, instrument};

use crate::dto::WebhookAck;
use crate::errors::ApiError;
use crate::webhook::{self, PayloadError, VoiceEvent, WebhookContext};
use crate::AppState;

/// Handler for voice-agent platform deliveries
///
/// This function handles POST requests to `/webhooks/voice-agent`.
///
/// The body is read as raw bytes so that a malformed payload is answered
/// with the service's own `{"error": ...}` shape instead of axum's JSON
/// rejection.
///
/// ### Returns
///
/// `{"success": true}` once the event is stored or deliberately ignored
#[instrument(skip(state, body), fields(bytes = body.len()))]
pub async fn voice_agent_webhook_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<WebhookAck>, ApiError> {
    let event = VoiceEvent::from_slice(&body)?;
    debug!(event_type = %event.kind, "Received voice agent event");

    let ctx = WebhookContext {
        pool: &state.pool,
        classifier: &state.classifier,
        notifier: state.notifier.as_ref(),
        default_workspace_id: state.default_workspace_id.as_deref(),
    };

    webhook::process_event(&ctx, &event).await.map_err(|err| {
        match err.downcast::<PayloadError>() {
            Ok(payload_err) => ApiError::InvalidPayload(payload_err),
            Err(err) => ApiError::Database(err),
        }
    })?;

    Ok(Json(WebhookAck::ok()))
}
