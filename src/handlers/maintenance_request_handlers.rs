use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::{Query, WithRejection};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::db::DbPool;
use crate::dto::{ListRequestsQuery, UpdateStatusDto};
use crate::errors::ApiError;
use crate::models::{ActivityLog, MaintenanceRequest, RequestStatus};
use crate::repo;

/// Handler for listing maintenance requests
///
/// This function handles GET requests to `/maintenance_requests`.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `query` - Optional `status`, `emergency`, `workspace_id` and `limit` filters
///
/// ### Returns
///
/// The matching requests as JSON, newest first
#[instrument(skip(pool))]
pub async fn list_maintenance_requests_handler(
    State(pool): State<Arc<DbPool>>,
    WithRejection(Query(query), _): WithRejection<Query<ListRequestsQuery>, ApiError>,
) -> Result<Json<Vec<MaintenanceRequest>>, ApiError> {
    let requests = repo::list_maintenance_requests(&pool, &query).map_err(ApiError::Database)?;

    debug!("Retrieved {} maintenance requests", requests.len());
    Ok(Json(requests))
}

/// Handler for retrieving a specific maintenance request
///
/// This function handles GET requests to `/maintenance_requests/{id}`.
///
/// ### Returns
///
/// The requested maintenance request as JSON, or null if not found
#[instrument(skip(pool), fields(request_id = %request_id))]
pub async fn get_maintenance_request_handler(
    State(pool): State<Arc<DbPool>>,
    Path(request_id): Path<String>,
) -> Result<Json<Option<MaintenanceRequest>>, ApiError> {
    let request = repo::get_maintenance_request(&pool, &request_id).map_err(ApiError::Database)?;
    Ok(Json(request))
}

/// Handler for moving a maintenance request through its workflow
///
/// This function handles PATCH requests to `/maintenance_requests/{id}/status`.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `request_id` - The ID of the request, extracted from the URL path
/// * `payload` - `{"status": "<label>"}`
///
/// ### Returns
///
/// The updated maintenance request as JSON
///
/// ### Errors
///
/// - 400 if the body is not `{"status": ...}` or the label is not a known status
/// - 404 if no request has the given ID
#[instrument(skip(pool, payload), fields(request_id = %request_id, status = %payload.status))]
pub async fn update_maintenance_request_status_handler(
    State(pool): State<Arc<DbPool>>,
    Path(request_id): Path<String>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateStatusDto>, ApiError>,
) -> Result<Json<MaintenanceRequest>, ApiError> {
    let status: RequestStatus = payload.status.trim().parse()?;

    let request = repo::update_maintenance_request_status(&pool, &request_id, status)
        .await
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    info!("Maintenance request moved to {}", request.status);
    Ok(Json(request))
}

/// Handler for a maintenance request's activity log
///
/// This function handles GET requests to `/maintenance_requests/{id}/activity`.
///
/// ### Returns
///
/// The request's activity entries as JSON, oldest first
#[instrument(skip(pool), fields(request_id = %request_id))]
pub async fn list_activity_handler(
    State(pool): State<Arc<DbPool>>,
    Path(request_id): Path<String>,
) -> Result<Json<Vec<ActivityLog>>, ApiError> {
    repo::get_maintenance_request(&pool, &request_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    let entries = repo::list_activity_for_request(&pool, &request_id).map_err(ApiError::Database)?;
    Ok(Json(entries))
}
