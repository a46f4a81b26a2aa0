/// Emergency notifications
///
/// When a maintenance request first turns into an emergency the webhook asks
/// a [`Notifier`] to alert on-call staff. The production implementation posts
/// to an HTTP email-delivery API; delivery is best effort and its failure is
/// recorded, never propagated to the voice platform.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::config::Config;
use crate::models::MaintenanceRequest;

/// Sends alerts about emergency maintenance requests
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Alerts staff that `request` is an emergency
    async fn send_emergency_alert(&self, request: &MaintenanceRequest) -> Result<()>;

    /// Whether alerts actually go anywhere
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Body accepted by the email-delivery API
#[derive(Debug, Serialize)]
struct EmailMessage<'a> {
    from: &'a str,
    to: &'a [String],
    subject: String,
    html: String,
}

/// Sends alerts through an HTTP email API with bearer-token auth
#[derive(Debug, Clone)]
pub struct EmailNotifier {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
    recipients: Vec<String>,
}

impl EmailNotifier {
    pub fn new(api_url: String, api_key: String, from: String, recipients: Vec<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            from,
            recipients,
        }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    #[instrument(skip(self, request), fields(call_id = %request.call_id, ticket = %request.ticket_number))]
    async fn send_emergency_alert(&self, request: &MaintenanceRequest) -> Result<()> {
        let message = EmailMessage {
            from: &self.from,
            to: &self.recipients,
            subject: alert_subject(request),
            html: alert_html(request),
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&message)
            .send()
            .await
            .context("failed to reach email API")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("email API returned {}: {}", status.as_u16(), body));
        }

        debug!(recipients = self.recipients.len(), "emergency alert delivered");
        Ok(())
    }
}

/// Used when no email API key or no recipients are configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn send_emergency_alert(&self, request: &MaintenanceRequest) -> Result<()> {
        debug!(call_id = %request.call_id, "emergency notifications disabled, skipping alert");
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Picks the notifier the configuration asks for
pub fn notifier_from_config(config: &Config) -> Box<dyn Notifier> {
    match &config.email_api_key {
        Some(key) if !config.emergency_recipients.is_empty() => Box::new(EmailNotifier::new(
            config.email_api_url.clone(),
            key.clone(),
            config.email_from.clone(),
            config.emergency_recipients.clone(),
        )),
        _ => Box::new(DisabledNotifier),
    }
}

pub fn alert_subject(request: &MaintenanceRequest) -> String {
    let location = match (&request.property_address, &request.unit_number) {
        (Some(address), Some(unit)) => format!("{} #{}", address, unit),
        (Some(address), None) => address.clone(),
        (None, Some(unit)) => format!("Unit {}", unit),
        (None, None) => "unknown location".to_string(),
    };
    format!("EMERGENCY maintenance request {} at {}", request.ticket_number, location)
}

pub fn alert_html(request: &MaintenanceRequest) -> String {
    fn row(label: &str, value: Option<&str>) -> String {
        format!(
            "<tr><th align=\"left\">{}</th><td>{}</td></tr>",
            label,
            escape_html(value.unwrap_or("-"))
        )
    }

    let rows = [
        row("Ticket", Some(&request.ticket_number)),
        row("Caller", request.caller_name.as_deref()),
        row("Phone", request.caller_phone.as_deref()),
        row("Property", request.property_address.as_deref()),
        row("Unit", request.unit_number.as_deref()),
        row("Issue", request.issue_description.as_deref()),
        row("Summary", request.summary.as_deref()),
    ]
    .join("");

    format!(
        "<h2>Emergency maintenance request</h2><table>{}</table><p>Call ID: {}</p>",
        rows,
        escape_html(&request.call_id)
    )
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(any(test, feature = "test"))]
pub use recording::RecordingNotifier;

#[cfg(any(test, feature = "test"))]
mod recording {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// Remembers every alert instead of sending it
    #[derive(Debug, Default)]
    pub struct RecordingNotifier {
        sent: Mutex<Vec<MaintenanceRequest>>,
        fail: AtomicBool,
    }

    impl RecordingNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        /// A notifier whose every send fails
        pub fn failing() -> Self {
            let notifier = Self::default();
            notifier.fail.store(true, Ordering::SeqCst);
            notifier
        }

        /// Call ids of every alert sent so far
        pub fn sent_call_ids(&self) -> Vec<String> {
            self.sent
                .lock()
                .map(|sent| sent.iter().map(|r| r.call_id.clone()).collect())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send_emergency_alert(&self, request: &MaintenanceRequest) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(anyhow!("simulated email outage"));
            }
            self.sent
                .lock()
                .map_err(|_| anyhow!("recording notifier poisoned"))?
                .push(request.clone());
            Ok(())
        }
    }
}
