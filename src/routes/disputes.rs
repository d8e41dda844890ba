//! Dispute routes — customer opens, vendor responds, admin resolves.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::routes::auth::{AdminUser, AuthUser};
use crate::services::dispute::{self, DisputeError, DisputeRow, Resolution};
use crate::state::AppState;

pub(crate) fn dispute_error_to_status(err: &DisputeError) -> StatusCode {
    match err {
        DisputeError::NotFound(_) | DisputeError::BookingNotFound(_) => StatusCode::NOT_FOUND,
        DisputeError::NotYourBooking | DisputeError::NotYourVenue => StatusCode::FORBIDDEN,
        DisputeError::AlreadyOpen => StatusCode::CONFLICT,
        DisputeError::AlreadyResolved | DisputeError::InvalidResolution(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DisputeError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Deserialize)]
pub struct OpenDisputeBody {
    pub reason: String,
}

/// `POST /api/bookings/{id}/disputes` — open a dispute on my booking.
pub async fn open_dispute(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(booking_id): Path<Uuid>,
    Json(body): Json<OpenDisputeBody>,
) -> Result<(StatusCode, Json<DisputeRow>), StatusCode> {
    let reason = body.reason.trim();
    if reason.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let row = dispute::open_dispute(&state.pool, &auth.user, booking_id, reason)
        .await
        .map_err(|e| dispute_error_to_status(&e))?;
    Ok((StatusCode::CREATED, Json(row)))
}

#[derive(Deserialize)]
pub struct RespondBody {
    pub response: String,
}

/// `POST /api/disputes/{id}/respond` — vendor's side of the story.
pub async fn respond(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(dispute_id): Path<Uuid>,
    Json(body): Json<RespondBody>,
) -> Result<Json<DisputeRow>, StatusCode> {
    let response = body.response.trim();
    if response.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let row = dispute::respond(&state.pool, &auth.user, dispute_id, response)
        .await
        .map_err(|e| dispute_error_to_status(&e))?;
    Ok(Json(row))
}

#[derive(Deserialize)]
pub struct ListDisputesQuery {
    pub status: Option<String>,
}

/// `GET /api/disputes` — all disputes (admin), optionally by status.
pub async fn list_disputes(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<ListDisputesQuery>,
) -> Result<Json<Vec<DisputeRow>>, StatusCode> {
    let rows = dispute::list_disputes(&state.pool, query.status.as_deref())
        .await
        .map_err(|e| dispute_error_to_status(&e))?;
    Ok(Json(rows))
}

/// `POST /api/disputes/{id}/resolve` — admin ruling.
pub async fn resolve(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(dispute_id): Path<Uuid>,
    Json(resolution): Json<Resolution>,
) -> Result<Json<DisputeRow>, StatusCode> {
    let row = dispute::resolve(&state.pool, dispute_id, resolution, OffsetDateTime::now_utc())
        .await
        .map_err(|e| dispute_error_to_status(&e))?;
    Ok(Json(row))
}
