//! Marketing routes — AI copywriting and image generation for vendors.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::routes::auth::AuthUser;
use crate::routes::venues::venue_error_to_status;
use crate::services::marketing::{self, CampaignBrief, MarketingError};
use crate::state::AppState;

pub(crate) fn marketing_error_to_status(err: &MarketingError) -> StatusCode {
    match err {
        MarketingError::LlmNotConfigured | MarketingError::ImageGenNotConfigured => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        MarketingError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        MarketingError::Llm(_) | MarketingError::ImageGen(_) | MarketingError::Upload(_) => {
            StatusCode::BAD_GATEWAY
        }
        MarketingError::Venue(e) => venue_error_to_status(e),
    }
}

#[derive(Deserialize)]
pub struct DescriptionBody {
    pub venue_id: Uuid,
    pub tone: Option<String>,
}

/// `POST /api/marketing/venue-description` — draft listing copy for an
/// owned venue.
pub async fn venue_description(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<DescriptionBody>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let description =
        marketing::draft_venue_description(&state, auth.user.id, body.venue_id, body.tone.as_deref())
            .await
            .map_err(|e| marketing_error_to_status(&e))?;
    Ok(Json(serde_json::json!({ "description": description })))
}

/// `POST /api/marketing/campaign` — draft a campaign email.
pub async fn campaign(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(brief): Json<CampaignBrief>,
) -> Result<Json<marketing::CampaignDraft>, StatusCode> {
    if brief.theme.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let draft = marketing::draft_campaign(&state, auth.user.id, &brief)
        .await
        .map_err(|e| marketing_error_to_status(&e))?;
    Ok(Json(draft))
}

#[derive(Deserialize)]
pub struct VenueImageBody {
    pub style: Option<String>,
}

/// `POST /api/marketing/venues/{id}/image` — generate and attach a hero
/// image to an owned venue.
pub async fn venue_image(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(venue_id): Path<Uuid>,
    Json(body): Json<VenueImageBody>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let photo_url = marketing::generate_venue_image(&state, auth.user.id, venue_id, body.style.as_deref())
        .await
        .map_err(|e| marketing_error_to_status(&e))?;
    Ok(Json(serde_json::json!({ "photo_url": photo_url })))
}

#[cfg(test)]
#[path = "marketing_test.rs"]
mod tests;
