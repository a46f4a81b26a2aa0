/// Data models module
///
/// This module defines the rows stored for voice-agent intake: maintenance
/// requests, their activity log, and the enum and JSON column types they use.

mod json_value;
pub use json_value::JsonValue;

mod enums;
pub use enums::{CallStatus, RequestStatus, UnknownLabel, Urgency};

mod maintenance_request;
pub use maintenance_request::{generate_ticket_number, MaintenanceRequest, RequestPatch};

mod activity_log;
pub use activity_log::{actions, ActivityLog};
