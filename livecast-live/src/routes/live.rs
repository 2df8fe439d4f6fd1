use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use livecast_shared::errors::{AppError, AppResult, ErrorCode};
use livecast_shared::types::api::ApiResponse;
use livecast_shared::types::pagination::{Paginated, PaginationParams};

use crate::models::{LiveSession, SessionStatus};
use crate::AppState;

// --- Request types ---

/// Body shared by create and update: the admin-editable metadata.
#[derive(Debug, Deserialize, Validate)]
pub struct SessionPayload {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    pub cover_image: Option<String>,
    /// Absolute timestamp, `YYYY-MM-DD HH:MM:SS`.
    pub planned_start_time: String,
}

#[derive(Debug, Deserialize)]
pub struct ForceStatusRequest {
    pub status: SessionStatus,
}

fn validate_payload(payload: &SessionPayload) -> AppResult<()> {
    payload.validate().map_err(|e| {
        let details = serde_json::to_value(&e).unwrap_or(serde_json::Value::Null);
        AppError::with_details(ErrorCode::ValidationError, "invalid request body", details)
    })
}

// --- GET /live ---

pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<LiveSession>>>> {
    let page = state.service.paginate(&params)?;
    Ok(Json(ApiResponse::ok(page)))
}

// --- POST /live ---

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SessionPayload>,
) -> AppResult<Json<ApiResponse<LiveSession>>> {
    validate_payload(&payload)?;

    let session = state.service.create(
        &payload.title,
        &payload.description,
        payload.cover_image,
        &payload.planned_start_time,
    )?;

    Ok(Json(ApiResponse::ok_with_message(session, "live session created")))
}

// --- GET /live/:id ---

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<LiveSession>>> {
    let session = state.service.get(id)?;
    Ok(Json(ApiResponse::ok(session)))
}

// --- PUT /live/:id ---

pub async fn update_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<SessionPayload>,
) -> AppResult<Json<ApiResponse<LiveSession>>> {
    validate_payload(&payload)?;

    let session = state.service.update(
        id,
        &payload.title,
        &payload.description,
        payload.cover_image,
        &payload.planned_start_time,
    )?;

    Ok(Json(ApiResponse::ok_with_message(session, "live session updated")))
}

// --- POST /live/:id/status ---

pub async fn force_session_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<ForceStatusRequest>,
) -> AppResult<Json<ApiResponse<LiveSession>>> {
    let session = state.service.force_status(id, payload.status)?;
    Ok(Json(ApiResponse::ok_with_message(session, "session status overridden")))
}

// --- DELETE /live/:id ---

pub async fn destroy_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.service.destroy(id)?;
    Ok(Json(ApiResponse::ok_with_message((), "live session deleted")))
}

// --- POST /live/:id/start ---

pub async fn start_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<LiveSession>>> {
    let session = state.service.start(id)?;
    Ok(Json(ApiResponse::ok_with_message(session, "live session started")))
}

// --- POST /live/:id/end ---

pub async fn end_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<LiveSession>>> {
    let session = state.service.end(id)?;
    Ok(Json(ApiResponse::ok_with_message(session, "live session ended")))
}
