//! Review routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::routes::auth::AuthUser;
use crate::services::review::{self, ReviewError, ReviewRow};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateReviewBody {
    pub booking_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
}

pub(crate) fn review_error_to_status(err: &ReviewError) -> StatusCode {
    match err {
        ReviewError::BookingNotFound(_) => StatusCode::NOT_FOUND,
        ReviewError::NotYourBooking => StatusCode::FORBIDDEN,
        ReviewError::BookingNotCompleted | ReviewError::VenueMismatch | ReviewError::InvalidRating => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ReviewError::AlreadyReviewed => StatusCode::CONFLICT,
        ReviewError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `POST /api/venues/{id}/reviews` — review a completed stay.
pub async fn create_review(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(venue_id): Path<Uuid>,
    Json(body): Json<CreateReviewBody>,
) -> Result<(StatusCode, Json<ReviewRow>), StatusCode> {
    let row = review::create_review(
        &state.pool,
        auth.user.id,
        venue_id,
        body.booking_id,
        body.rating,
        body.comment.as_deref().unwrap_or(""),
    )
    .await
    .map_err(|e| review_error_to_status(&e))?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// `GET /api/venues/{id}/reviews` — a venue's reviews.
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(venue_id): Path<Uuid>,
) -> Result<Json<Vec<ReviewRow>>, StatusCode> {
    let rows = review::list_reviews(&state.pool, venue_id)
        .await
        .map_err(|e| review_error_to_status(&e))?;
    Ok(Json(rows))
}
