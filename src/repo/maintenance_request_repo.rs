use anyhow::Result;
use chrono::Utc;
use diesel::prelude::*;
use tracing::{debug, info, instrument};

use crate::db::{with_busy_retry, DbPool};
use crate::dto::ListRequestsQuery;
use crate::models::{actions, ActivityLog, JsonValue, MaintenanceRequest, RequestPatch, RequestStatus};
use crate::schema::{activity_logs, maintenance_requests};

/// Result of folding one call event into storage
#[derive(Debug, Clone)]
pub struct UpsertOutcome {
    /// The stored request after the merge
    pub request: MaintenanceRequest,
    /// True when this event created the row
    pub created: bool,
    /// True when this event turned a non-emergency (or new) request into an emergency
    pub became_emergency: bool,
}

/// Creates or updates the maintenance request for a call
///
/// The lookup, merge and write happen in one immediate transaction, so two
/// deliveries for the same call never produce two rows. A new row takes
/// `default_workspace_id` when the event did not name a workspace.
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The database read or write fails
#[instrument(skip(pool, patch, raw_payload), fields(call_id = %call_id))]
pub async fn upsert_by_call_id(
    pool: &DbPool,
    call_id: &str,
    patch: RequestPatch,
    raw_payload: &serde_json::Value,
    default_workspace_id: Option<&str>,
) -> Result<UpsertOutcome> {
    debug!("Upserting maintenance request");

    let mut conn = pool.get()?;

    let outcome = with_busy_retry(&mut conn, |conn| {
        conn.immediate_transaction::<_, diesel::result::Error, _>(|conn| {
            let existing = maintenance_requests::table
                .filter(maintenance_requests::call_id.eq(call_id))
                .select(MaintenanceRequest::as_select())
                .first(conn)
                .optional()?;

            match existing {
                Some(mut request) => {
                    let was_emergency = request.is_emergency;
                    request.merge(patch.clone());
                    request.raw_payload = JsonValue(raw_payload.clone());

                    diesel::update(maintenance_requests::table.find(&request.id))
                        .set(&request)
                        .execute(conn)?;

                    Ok(UpsertOutcome {
                        became_emergency: !was_emergency && request.is_emergency,
                        created: false,
                        request,
                    })
                }
                None => {
                    let mut request =
                        MaintenanceRequest::from_patch(call_id.to_string(), patch.clone(), raw_payload.clone());
                    if request.workspace_id.is_none() {
                        request.workspace_id = default_workspace_id.map(str::to_string);
                    }

                    diesel::insert_into(maintenance_requests::table)
                        .values(&request)
                        .execute(conn)?;

                    Ok(UpsertOutcome {
                        became_emergency: request.is_emergency,
                        created: true,
                        request,
                    })
                }
            }
        })
    })
    .await?;

    info!(
        request_id = %outcome.request.id,
        created = outcome.created,
        is_emergency = outcome.request.is_emergency,
        "Stored maintenance request"
    );

    Ok(outcome)
}

/// Retrieves a maintenance request by its ID
#[instrument(skip(pool), fields(request_id = %request_id))]
pub fn get_maintenance_request(pool: &DbPool, request_id: &str) -> Result<Option<MaintenanceRequest>> {
    let conn = &mut pool.get()?;

    let result = maintenance_requests::table
        .find(request_id)
        .select(MaintenanceRequest::as_select())
        .first(conn)
        .optional()?;

    if result.is_none() {
        debug!("Maintenance request not found");
    }

    Ok(result)
}

/// Retrieves the maintenance request created for a call
#[instrument(skip(pool), fields(call_id = %call_id))]
pub fn get_maintenance_request_by_call_id(pool: &DbPool, call_id: &str) -> Result<Option<MaintenanceRequest>> {
    let conn = &mut pool.get()?;

    let result = maintenance_requests::table
        .filter(maintenance_requests::call_id.eq(call_id))
        .select(MaintenanceRequest::as_select())
        .first(conn)
        .optional()?;

    Ok(result)
}

/// Lists maintenance requests, newest first
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `query` - Optional filters on status, emergency flag and workspace, and a row limit
#[instrument(skip(pool))]
pub fn list_maintenance_requests(pool: &DbPool, query: &ListRequestsQuery) -> Result<Vec<MaintenanceRequest>> {
    let conn = &mut pool.get()?;

    let mut statement = maintenance_requests::table
        .select(MaintenanceRequest::as_select())
        .order(maintenance_requests::created_at.desc())
        .into_boxed();

    if let Some(status) = query.status {
        statement = statement.filter(maintenance_requests::status.eq(status));
    }
    if let Some(emergency) = query.emergency {
        statement = statement.filter(maintenance_requests::is_emergency.eq(emergency));
    }
    if let Some(workspace_id) = &query.workspace_id {
        statement = statement.filter(maintenance_requests::workspace_id.eq(workspace_id.clone()));
    }
    if let Some(limit) = query.limit {
        statement = statement.limit(limit.max(0));
    }

    let results = statement.load(conn)?;
    debug!("Found {} maintenance requests", results.len());

    Ok(results)
}

/// Moves a maintenance request to a new workflow status
///
/// Writes a `status_changed` activity entry in the same transaction.
/// Returns `None` when no request has the given ID.
#[instrument(skip(pool), fields(request_id = %request_id, status = %status))]
pub async fn update_maintenance_request_status(
    pool: &DbPool,
    request_id: &str,
    status: RequestStatus,
) -> Result<Option<MaintenanceRequest>> {
    let mut conn = pool.get()?;

    let updated = with_busy_retry(&mut conn, |conn| {
        conn.immediate_transaction::<_, diesel::result::Error, _>(|conn| {
            let Some(mut request) = maintenance_requests::table
                .find(request_id)
                .select(MaintenanceRequest::as_select())
                .first(conn)
                .optional()?
            else {
                return Ok(None);
            };

            let previous = request.status;
            request.status = status;
            request.updated_at = Utc::now().naive_utc();

            diesel::update(maintenance_requests::table.find(request_id))
                .set((
                    maintenance_requests::status.eq(request.status),
                    maintenance_requests::updated_at.eq(request.updated_at),
                ))
                .execute(conn)?;

            let entry = ActivityLog::new(
                request.id.clone(),
                actions::STATUS_CHANGED,
                serde_json::json!({ "from": previous, "to": status }),
            );
            diesel::insert_into(activity_logs::table).values(&entry).execute(conn)?;

            Ok(Some(request))
        })
    })
    .await?;

    if updated.is_some() {
        info!("Updated maintenance request status");
    }

    Ok(updated)
}
