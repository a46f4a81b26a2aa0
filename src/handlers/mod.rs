/// Web API Handlers
///
/// This module contains the handlers for the HTTP endpoints: the voice-agent
/// webhook, the maintenance-request read/update API and the health probe.
/// Handlers extract request data, call into [`crate::webhook`] or
/// [`crate::repo`], and map failures onto [`crate::errors::ApiError`].

mod webhook_handlers;
mod maintenance_request_handlers;
mod health_handlers;

pub use webhook_handlers::*;
pub use maintenance_request_handlers::*;
pub use health_handlers::*;
