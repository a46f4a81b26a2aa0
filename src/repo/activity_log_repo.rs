use anyhow::Result;
use diesel::prelude::*;
use tracing::{debug, instrument};

use crate::db::{with_busy_retry, DbPool};
use crate::models::ActivityLog;
use crate::schema::activity_logs;

/// Appends an entry to a maintenance request's activity log
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `maintenance_request_id` - The request the entry belongs to
/// * `action` - What happened, see [`crate::models::actions`]
/// * `details` - Structured context stored as JSON
///
/// ### Errors
///
/// Returns an error if the request does not exist (foreign key) or the insert fails.
#[instrument(skip(pool, details), fields(maintenance_request_id = %maintenance_request_id, action = %action))]
pub async fn record_activity(
    pool: &DbPool,
    maintenance_request_id: &str,
    action: &str,
    details: serde_json::Value,
) -> Result<ActivityLog> {
    let entry = ActivityLog::new(maintenance_request_id.to_string(), action, details);

    let mut conn = pool.get()?;
    with_busy_retry(&mut conn, |conn| {
        diesel::insert_into(activity_logs::table).values(&entry).execute(conn)
    })
    .await?;

    debug!("Recorded activity with id: {}", entry.get_id());
    Ok(entry)
}

/// Lists the activity log of a maintenance request, oldest first
#[instrument(skip(pool), fields(maintenance_request_id = %maintenance_request_id))]
pub fn list_activity_for_request(pool: &DbPool, maintenance_request_id: &str) -> Result<Vec<ActivityLog>> {
    let conn = &mut pool.get()?;

    let entries = activity_logs::table
        .filter(activity_logs::maintenance_request_id.eq(maintenance_request_id))
        .order(activity_logs::created_at.asc())
        .select(ActivityLog::as_select())
        .load(conn)?;

    Ok(entries)
}

#[cfg(test)]
mod tests;
