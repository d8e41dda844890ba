//! Admin routes — revenue reports, payouts, discount codes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::pricing::Discount;
use crate::routes::auth::AdminUser;
use crate::services::discount::{self, DiscountCodeRow, DiscountError};
use crate::services::payout::{self, PayoutError, PayoutRow};
use crate::services::report::{self, ReportError};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct PeriodQuery {
    /// RFC 3339 timestamps, e.g. `2026-06-01T00:00:00Z`.
    pub from: String,
    pub to: String,
    pub limit: Option<i64>,
}

fn parse_period(query: &PeriodQuery) -> Result<(OffsetDateTime, OffsetDateTime), StatusCode> {
    let from = OffsetDateTime::parse(&query.from, &Rfc3339).map_err(|_| StatusCode::BAD_REQUEST)?;
    let to = OffsetDateTime::parse(&query.to, &Rfc3339).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((from, to))
}

fn report_error_to_status(err: &ReportError) -> StatusCode {
    match err {
        ReportError::InvalidPeriod(_) => StatusCode::BAD_REQUEST,
        ReportError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn payout_error_to_status(err: &PayoutError) -> StatusCode {
    match err {
        PayoutError::NotFound(_) => StatusCode::NOT_FOUND,
        PayoutError::AlreadyPaid => StatusCode::CONFLICT,
        PayoutError::InvalidPeriod(_) => StatusCode::BAD_REQUEST,
        PayoutError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// =============================================================================
// REPORTS
// =============================================================================

/// `GET /api/admin/reports/revenue?from=&to=` — platform revenue rollup.
pub async fn revenue_report(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<report::RevenueSummary>, StatusCode> {
    let (from, to) = parse_period(&query)?;
    let summary = report::revenue_summary(&state.pool, from, to)
        .await
        .map_err(|e| report_error_to_status(&e))?;
    Ok(Json(summary))
}

/// `GET /api/admin/reports/top-venues?from=&to=&limit=` — venue leaderboard.
pub async fn top_venues_report(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<Vec<report::TopVenue>>, StatusCode> {
    let (from, to) = parse_period(&query)?;
    let rows = report::top_venues(&state.pool, from, to, query.limit.unwrap_or(10))
        .await
        .map_err(|e| report_error_to_status(&e))?;
    Ok(Json(rows))
}

// =============================================================================
// PAYOUTS
// =============================================================================

/// `POST /api/admin/payouts/generate?from=&to=` — settle a period.
pub async fn generate_payouts(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<Vec<PayoutRow>>, StatusCode> {
    let (from, to) = parse_period(&query)?;
    let rows = payout::generate_payouts(&state.pool, from, to)
        .await
        .map_err(|e| payout_error_to_status(&e))?;
    Ok(Json(rows))
}

/// `GET /api/admin/payouts` — all payouts.
pub async fn list_payouts(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<PayoutRow>>, StatusCode> {
    let rows = payout::list_payouts(&state.pool)
        .await
        .map_err(|e| payout_error_to_status(&e))?;
    Ok(Json(rows))
}

/// `POST /api/admin/payouts/{id}/mark-paid` — record settlement.
pub async fn mark_payout_paid(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(payout_id): Path<Uuid>,
) -> Result<Json<PayoutRow>, StatusCode> {
    let row = payout::mark_paid(&state.pool, payout_id, OffsetDateTime::now_utc())
        .await
        .map_err(|e| payout_error_to_status(&e))?;
    Ok(Json(row))
}

// =============================================================================
// DISCOUNT CODES
// =============================================================================

#[derive(Deserialize)]
pub struct CreateDiscountBody {
    pub code: String,
    pub discount: Discount,
    pub expires_at: Option<String>,
    pub max_redemptions: Option<i32>,
}

/// `POST /api/admin/discount-codes` — mint a code.
pub async fn create_discount_code(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(body): Json<CreateDiscountBody>,
) -> Result<(StatusCode, Json<DiscountCodeRow>), StatusCode> {
    if body.code.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let expires_at = match &body.expires_at {
        Some(raw) => {
            Some(OffsetDateTime::parse(raw, &Rfc3339).map_err(|_| StatusCode::BAD_REQUEST)?)
        }
        None => None,
    };

    let row = discount::create_code(&state.pool, &body.code, body.discount, expires_at, body.max_redemptions)
        .await
        .map_err(|e| match e {
            DiscountError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        })?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// `GET /api/admin/discount-codes` — all codes.
pub async fn list_discount_codes(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<DiscountCodeRow>>, StatusCode> {
    let rows = discount::list_codes(&state.pool)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(rows))
}
