//! Venue and vendor routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::routes::auth::AuthUser;
use crate::services::booking::{self, BookingError};
use crate::services::venue::{self, NewVenue, VenueError, VenueFilters, VenuePatch, VenueRow};
use crate::state::AppState;

#[derive(serde::Serialize)]
pub struct VenueDetailResponse {
    #[serde(flatten)]
    pub venue: VenueRow,
    pub rating: venue::RatingSummary,
}

pub(crate) fn venue_error_to_status(err: &VenueError) -> StatusCode {
    match err {
        VenueError::NotFound(_) => StatusCode::NOT_FOUND,
        VenueError::NotAVendor(_) | VenueError::Forbidden(_) => StatusCode::FORBIDDEN,
        VenueError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// =============================================================================
// VENDOR ONBOARDING
// =============================================================================

#[derive(Deserialize)]
pub struct RegisterVendorBody {
    pub display_name: String,
    pub bio: Option<String>,
}

/// `POST /api/vendors` — register the current user as a vendor.
pub async fn register_vendor(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<RegisterVendorBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), StatusCode> {
    if body.display_name.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let vendor_id =
        venue::register_vendor(&state.pool, auth.user.id, body.display_name.trim(), body.bio.as_deref().unwrap_or(""))
            .await
            .map_err(|e| venue_error_to_status(&e))?;
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "vendor_id": vendor_id }))))
}

/// `GET /api/vendors/me/venues` — the vendor's own listings, drafts included.
pub async fn list_my_venues(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<VenueRow>>, StatusCode> {
    let rows = venue::list_vendor_venues(&state.pool, auth.user.id)
        .await
        .map_err(|e| venue_error_to_status(&e))?;
    Ok(Json(rows))
}

// =============================================================================
// PUBLIC CATALOG
// =============================================================================

/// `GET /api/venues` — search published venues.
pub async fn list_venues(
    State(state): State<AppState>,
    Query(filters): Query<VenueFilters>,
) -> Result<Json<Vec<VenueRow>>, StatusCode> {
    let rows = venue::search_venues(&state.pool, &filters)
        .await
        .map_err(|e| venue_error_to_status(&e))?;
    Ok(Json(rows))
}

/// `GET /api/venues/{id}` — one venue with its rating aggregate.
pub async fn get_venue(
    State(state): State<AppState>,
    Path(venue_id): Path<Uuid>,
) -> Result<Json<VenueDetailResponse>, StatusCode> {
    let venue_row = venue::get_venue(&state.pool, venue_id)
        .await
        .map_err(|e| venue_error_to_status(&e))?;
    let rating = venue::rating_summary(&state.pool, venue_id)
        .await
        .map_err(|e| venue_error_to_status(&e))?;
    Ok(Json(VenueDetailResponse { venue: venue_row, rating }))
}

#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub date: String,
}

/// `GET /api/venues/{id}/availability?date=YYYY-MM-DD` — occupied slots for
/// a day. Advisory only; creation re-checks atomically.
pub async fn availability(
    State(state): State<AppState>,
    Path(venue_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Vec<booking::OccupiedSlot>>, StatusCode> {
    let date = booking::parse_event_date(&query.date).map_err(|_| StatusCode::BAD_REQUEST)?;
    let slots = booking::list_day_bookings(&state.pool, venue_id, date)
        .await
        .map_err(|e| match e {
            BookingError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        })?;
    Ok(Json(slots))
}

// =============================================================================
// VENDOR CRUD
// =============================================================================

/// `POST /api/venues` — create a listing (vendor).
pub async fn create_venue(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<NewVenue>,
) -> Result<(StatusCode, Json<VenueRow>), StatusCode> {
    if body.title.trim().is_empty() || body.capacity <= 0 || body.hourly_rate < 0.0 {
        return Err(StatusCode::BAD_REQUEST);
    }
    let row = venue::create_venue(&state.pool, auth.user.id, body)
        .await
        .map_err(|e| venue_error_to_status(&e))?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// `PATCH /api/venues/{id}` — update an owned listing.
pub async fn update_venue(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(venue_id): Path<Uuid>,
    Json(body): Json<VenuePatch>,
) -> Result<Json<VenueRow>, StatusCode> {
    if body.capacity.is_some_and(|c| c <= 0) || body.hourly_rate.is_some_and(|r| r < 0.0) {
        return Err(StatusCode::BAD_REQUEST);
    }
    let row = venue::update_venue(&state.pool, venue_id, auth.user.id, body)
        .await
        .map_err(|e| venue_error_to_status(&e))?;
    Ok(Json(row))
}

/// `DELETE /api/venues/{id}` — remove an owned listing.
pub async fn delete_venue(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(venue_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    venue::delete_venue(&state.pool, venue_id, auth.user.id)
        .await
        .map_err(|e| venue_error_to_status(&e))?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

#[derive(Deserialize)]
pub struct AddPhotoBody {
    pub url: String,
}

/// `POST /api/venues/{id}/photos` — attach an uploaded photo to a listing.
pub async fn add_photo(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(venue_id): Path<Uuid>,
    Json(body): Json<AddPhotoBody>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    if body.url.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    venue::add_photo(&state.pool, venue_id, auth.user.id, body.url.trim())
        .await
        .map_err(|e| venue_error_to_status(&e))?;
    Ok(Json(serde_json::json!({ "ok": true })))
}
