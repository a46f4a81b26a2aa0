use reqwest::{Client, Url};
use serde_json::Value;
use switchboard::dto::{ListRequestsQuery, UpdateStatusDto, WebhookAck};
use switchboard::models::{ActivityLog, MaintenanceRequest, RequestStatus};

/// Error type for CLI client operations
#[derive(Debug)]
pub enum ClientError {
    /// Server returned an error status with a message body
    Server { status: reqwest::StatusCode, message: String },
    /// Network/connection/request error
    Request(reqwest::Error),
    /// The configured server URL cannot carry a path
    InvalidUrl(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Server { status, message } => {
                write!(f, "Server error ({}): {}", status.as_u16(), message)
            }
            ClientError::Request(err) => write!(f, "{}", err),
            ClientError::InvalidUrl(reason) => write!(f, "Invalid server URL: {}", reason),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Request(err) => Some(err),
            ClientError::Server { .. } | ClientError::InvalidUrl(_) => None,
        }
    }
}

/// Turns non-2xx responses into [`ClientError::Server`] carrying the body's `error` field
trait ResponseExt {
    async fn check(self) -> Result<reqwest::Response, ClientError>;
}

impl ResponseExt for reqwest::Response {
    async fn check(self) -> Result<reqwest::Response, ClientError> {
        if self.status().is_success() {
            return Ok(self);
        }
        let status = self.status();
        let message = match self.json::<Value>().await {
            Ok(body) => body
                .get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("Unknown error")
                .to_string(),
            Err(_) => format!("HTTP {}", status),
        };
        Err(ClientError::Server { status, message })
    }
}

/// Query string pairs for a list filter; unset filters are left out
fn list_params(query: &ListRequestsQuery) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(status) = query.status {
        params.push(("status", status.to_string()));
    }
    if let Some(emergency) = query.emergency {
        params.push(("emergency", emergency.to_string()));
    }
    if let Some(workspace_id) = &query.workspace_id {
        params.push(("workspace_id", workspace_id.clone()));
    }
    if let Some(limit) = query.limit {
        params.push(("limit", limit.to_string()));
    }
    params
}

/// HTTP client for a running Switchboard server
pub struct SwitchboardClient {
    /// The base URL of the server (e.g. "http://localhost:3000")
    base_url: String,
    client: Client,
}

impl SwitchboardClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Builds an endpoint URL, percent-encoding each path segment
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Lists maintenance requests matching `query`, newest first
    pub async fn list_requests(&self, query: &ListRequestsQuery) -> Result<Vec<MaintenanceRequest>, ClientError> {
        let url = self.endpoint(&["maintenance_requests"])?;
        let response = self
            .client
            .get(url)
            .query(&list_params(query))
            .send()
            .await
            .map_err(ClientError::Request)?
            .check()
            .await?;
        response.json().await.map_err(ClientError::Request)
    }

    /// Gets one maintenance request; `None` if the server has no such ID
    pub async fn get_request(&self, id: &str) -> Result<Option<MaintenanceRequest>, ClientError> {
        let url = self.endpoint(&["maintenance_requests", id])?;
        let response = self.client.get(url).send().await.map_err(ClientError::Request)?.check().await?;
        response.json().await.map_err(ClientError::Request)
    }

    pub async fn list_activity(&self, id: &str) -> Result<Vec<ActivityLog>, ClientError> {
        let url = self.endpoint(&["maintenance_requests", id, "activity"])?;
        let response = self.client.get(url).send().await.map_err(ClientError::Request)?.check().await?;
        response.json().await.map_err(ClientError::Request)
    }

    /// Moves a request to a new workflow status
    pub async fn set_status(&self, id: &str, status: RequestStatus) -> Result<MaintenanceRequest, ClientError> {
        let url = self.endpoint(&["maintenance_requests", id, "status"])?;
        let dto = UpdateStatusDto { status: status.to_string() };
        let response = self
            .client
            .patch(url)
            .json(&dto)
            .send()
            .await
            .map_err(ClientError::Request)?
            .check()
            .await?;
        response.json().await.map_err(ClientError::Request)
    }

    /// Posts a stored payload to the webhook exactly as the voice platform would
    pub async fn replay(&self, body: Vec<u8>) -> Result<WebhookAck, ClientError> {
        let url = self.endpoint(&["webhooks", "voice-agent"])?;
        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(ClientError::Request)?
            .check()
            .await?;
        response.json().await.map_err(ClientError::Request)
    }

    pub async fn health(&self) -> Result<Value, ClientError> {
        let url = self.endpoint(&["health"])?;
        let response = self.client.get(url).send().await.map_err(ClientError::Request)?.check().await?;
        response.json().await.map_err(ClientError::Request)
    }
}
