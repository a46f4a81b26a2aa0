use serde::{Deserialize, Serialize};

use crate::models::RequestStatus;

/// Response body returned to the voice platform
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WebhookAck {
    pub success: bool,
}

impl WebhookAck {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Query parameters for listing maintenance requests
///
/// Every field is optional; omitted fields do not filter.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ListRequestsQuery {
    /// Only requests in this workflow status
    pub status: Option<RequestStatus>,

    /// Only emergencies (`true`) or only non-emergencies (`false`)
    pub emergency: Option<bool>,

    /// Only requests belonging to this workspace
    pub workspace_id: Option<String>,

    /// Maximum number of rows, newest first
    pub limit: Option<i64>,
}

/// Data transfer object for changing a request's workflow status
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UpdateStatusDto {
    /// The new status label, e.g. `in_progress`
    pub status: String,
}
