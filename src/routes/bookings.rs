//! Booking routes — quotes, creation (member + guest checkout), cancellation.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::localization::Currency;
use crate::pricing::Quote;
use crate::routes::auth::AuthUser;
use crate::services::booking::{self, BookingError, BookingRow, Customer, SlotRequest};
use crate::services::discount::DiscountError;
use crate::services::email_auth::normalize_email;
use crate::state::AppState;

// =============================================================================
// REQUEST / RESPONSE SHAPES
// =============================================================================

/// Slot fields shared by quote, member booking, and guest checkout bodies.
#[derive(Debug, Clone, Deserialize)]
pub struct SlotBody {
    pub venue_id: Uuid,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`; an end at or before the start means an overnight booking.
    pub start_time: String,
    pub end_time: String,
    #[serde(default = "default_guest_count")]
    pub guest_count: i32,
    pub discount_code: Option<String>,
}

fn default_guest_count() -> i32 {
    1
}

impl SlotBody {
    pub(crate) fn into_request(self) -> Result<SlotRequest, BookingError> {
        Ok(SlotRequest {
            venue_id: self.venue_id,
            date: booking::parse_event_date(&self.date)?,
            start: booking::parse_clock_time(&self.start_time)?,
            end: booking::parse_clock_time(&self.end_time)?,
            guest_count: self.guest_count,
            discount_code: self.discount_code.clone().filter(|c| !c.trim().is_empty()),
        })
    }
}

#[derive(Deserialize)]
pub struct GuestCheckoutBody {
    #[serde(flatten)]
    pub slot: SlotBody,
    pub name: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct QuoteBody {
    #[serde(flatten)]
    pub slot: SlotBody,
    /// Optional display currency; the charge itself stays in the venue's.
    pub display_currency: Option<String>,
}

#[derive(serde::Serialize)]
pub struct QuoteResponse {
    pub quote: Quote,
    pub currency: String,
    pub formatted_total: String,
    /// Total converted for display, when a different currency was asked for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_total: Option<String>,
}

pub(crate) fn booking_error_to_status(err: &BookingError) -> StatusCode {
    match err {
        BookingError::NotFound(_) | BookingError::VenueNotFound(_) => StatusCode::NOT_FOUND,
        BookingError::SlotTaken => StatusCode::CONFLICT,
        BookingError::VenueUnpublished
        | BookingError::InvalidWindow(_)
        | BookingError::NotCancellable(_) => StatusCode::UNPROCESSABLE_ENTITY,
        BookingError::Forbidden(_) => StatusCode::FORBIDDEN,
        BookingError::Discount(e) => discount_error_to_status(e),
        BookingError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn discount_error_to_status(err: &DiscountError) -> StatusCode {
    match err {
        DiscountError::Unknown => StatusCode::NOT_FOUND,
        DiscountError::Inactive | DiscountError::Expired | DiscountError::Exhausted => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        DiscountError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// =============================================================================
// QUOTE
// =============================================================================

/// `POST /api/bookings/quote` — price a slot without writing anything.
pub async fn quote(
    State(state): State<AppState>,
    Json(body): Json<QuoteBody>,
) -> Result<Json<QuoteResponse>, StatusCode> {
    let display_currency = body
        .display_currency
        .as_deref()
        .map(|code| Currency::from_code(code).ok_or(StatusCode::BAD_REQUEST))
        .transpose()?;

    let request = body.slot.into_request().map_err(|e| booking_error_to_status(&e))?;
    let priced = booking::price_slot(&state.pool, &request, OffsetDateTime::now_utc())
        .await
        .map_err(|e| booking_error_to_status(&e))?;

    let currency = Currency::from_code(&priced.venue.currency).unwrap_or(Currency::Usd);
    let display_total = display_currency.filter(|c| *c != currency).map(|target| {
        crate::localization::format_amount(
            crate::localization::convert(priced.quote.total, currency, target),
            target,
        )
    });

    Ok(Json(QuoteResponse {
        quote: priced.quote,
        currency: priced.venue.currency.clone(),
        formatted_total: crate::localization::format_amount(priced.quote.total, currency),
        display_total,
    }))
}

// =============================================================================
// CREATE
// =============================================================================

/// `POST /api/bookings` — book a slot as the signed-in user.
pub async fn create_booking(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<SlotBody>,
) -> Result<(StatusCode, Json<BookingRow>), StatusCode> {
    let request = body.into_request().map_err(|e| booking_error_to_status(&e))?;
    let row = booking::create_booking(&state.pool, &request, Customer::User(auth.user.id), OffsetDateTime::now_utc())
        .await
        .map_err(|e| booking_error_to_status(&e))?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// `POST /api/bookings/guest` — guest checkout: book with just a name and
/// email, no account.
pub async fn create_guest_booking(
    State(state): State<AppState>,
    Json(body): Json<GuestCheckoutBody>,
) -> Result<(StatusCode, Json<BookingRow>), StatusCode> {
    let Some(email) = normalize_email(&body.email) else {
        return Err(StatusCode::BAD_REQUEST);
    };
    let name = body.name.trim();
    if name.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let request = body.slot.into_request().map_err(|e| booking_error_to_status(&e))?;
    let customer = Customer::Guest { name: name.to_owned(), email };
    let row = booking::create_booking(&state.pool, &request, customer, OffsetDateTime::now_utc())
        .await
        .map_err(|e| booking_error_to_status(&e))?;
    Ok((StatusCode::CREATED, Json(row)))
}

// =============================================================================
// READS
// =============================================================================

#[derive(Deserialize)]
pub struct ListBookingsQuery {
    /// `customer` (default) or `vendor`.
    pub role: Option<String>,
}

/// `GET /api/bookings` — bookings I made, or bookings at my venues.
pub async fn list_bookings(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListBookingsQuery>,
) -> Result<Json<Vec<BookingRow>>, StatusCode> {
    let rows = match query.role.as_deref() {
        Some("vendor") => booking::list_vendor_bookings(&state.pool, auth.user.id).await,
        None | Some("customer") => booking::list_customer_bookings(&state.pool, auth.user.id).await,
        Some(_) => return Err(StatusCode::BAD_REQUEST),
    }
    .map_err(|e| booking_error_to_status(&e))?;
    Ok(Json(rows))
}

/// `GET /api/bookings/{id}` — one booking, visible to its customer, the
/// venue's vendor, or an admin.
pub async fn get_booking(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingRow>, StatusCode> {
    let row = booking::get_booking_for(&state.pool, booking_id, &auth.user)
        .await
        .map_err(|e| booking_error_to_status(&e))?;
    Ok(Json(row))
}

// =============================================================================
// CANCEL
// =============================================================================

/// `POST /api/bookings/{id}/cancel` — cancel with a tiered refund.
pub async fn cancel_booking(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<booking::CancellationOutcome>, StatusCode> {
    let outcome = booking::cancel_booking(&state.pool, booking_id, &auth.user, OffsetDateTime::now_utc())
        .await
        .map_err(|e| booking_error_to_status(&e))?;
    Ok(Json(outcome))
}

#[cfg(test)]
#[path = "bookings_test.rs"]
mod tests;
