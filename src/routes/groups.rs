//! Group booking routes — split-payment collection.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::routes::auth::AuthUser;
use crate::routes::bookings::{booking_error_to_status, SlotBody};
use crate::services::group::{self, ContributionRow, GroupError, GroupRow};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateGroupBody {
    #[serde(flatten)]
    pub slot: SlotBody,
    /// Emails invited to hold a share, besides the organizer.
    pub contributor_emails: Vec<String>,
}

#[derive(serde::Serialize)]
pub struct GroupResponse {
    #[serde(flatten)]
    pub group: GroupRow,
    pub contributions: Vec<ContributionRow>,
}

pub(crate) fn group_error_to_status(err: &GroupError) -> StatusCode {
    match err {
        GroupError::NotFound(_) | GroupError::ContributionNotFound(_) => StatusCode::NOT_FOUND,
        GroupError::Forbidden(_) => StatusCode::FORBIDDEN,
        GroupError::InvalidContributors(_) => StatusCode::BAD_REQUEST,
        GroupError::AlreadyPaid | GroupError::NotCollecting => StatusCode::UNPROCESSABLE_ENTITY,
        GroupError::Booking(e) => booking_error_to_status(e),
        GroupError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `POST /api/groups` — create a group booking and invite contributors.
pub async fn create_group(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateGroupBody>,
) -> Result<(StatusCode, Json<GroupResponse>), StatusCode> {
    let request = body.slot.into_request().map_err(|e| booking_error_to_status(&e))?;
    let (group, contributions) = group::create_group(
        &state.pool,
        &auth.user,
        &request,
        &body.contributor_emails,
        OffsetDateTime::now_utc(),
    )
    .await
    .map_err(|e| group_error_to_status(&e))?;
    Ok((StatusCode::CREATED, Json(GroupResponse { group, contributions })))
}

/// `GET /api/groups/{id}` — group status and shares. Capability URL, shared
/// with contributors by invite.
pub async fn get_group(
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<GroupResponse>, StatusCode> {
    let (group, contributions) = group::get_group(&state.pool, group_id)
        .await
        .map_err(|e| group_error_to_status(&e))?;
    Ok(Json(GroupResponse { group, contributions }))
}

/// `POST /api/groups/{id}/contributions/{contribution_id}/pay` — pay one
/// share; the last share finalizes the underlying booking.
pub async fn pay_contribution(
    State(state): State<AppState>,
    Path((group_id, contribution_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<group::PaymentOutcome>, StatusCode> {
    let outcome = group::pay_contribution(&state.pool, group_id, contribution_id, OffsetDateTime::now_utc())
        .await
        .map_err(|e| group_error_to_status(&e))?;
    Ok(Json(outcome))
}

/// `POST /api/groups/{id}/cancel` — organizer abandons collection.
pub async fn cancel_group(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(group_id): Path<Uuid>,
) -> Result<Json<GroupRow>, StatusCode> {
    let group = group::cancel_group(&state.pool, group_id, &auth.user)
        .await
        .map_err(|e| group_error_to_status(&e))?;
    Ok(Json(group))
}
