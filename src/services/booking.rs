//! Booking service — quoting, conflict-safe creation, cancellation.
//!
//! DESIGN
//! ======
//! Prices are always computed server-side from the venue's stored rate; a
//! client never submits an amount. Slot conflicts are handled twice: an
//! advisory overlap query inside the booking transaction produces the
//! friendly 409, and the `bookings_no_overlap` exclusion constraint is the
//! authoritative check that holds under any interleaving.
//!
//! ERROR HANDLING
//! ==============
//! A constraint violation after the advisory check passed means another
//! booking won the race; it maps to the same `SlotTaken` error, not a 500.

use sqlx::{PgPool, Row};
use time::macros::format_description;
use time::{Date, OffsetDateTime, Time};
use uuid::Uuid;

use crate::pricing::{self, Quote};
use crate::services::discount::{self, DiscountError};
use crate::services::notify;
use crate::services::session::{SessionUser, UserRole};
use crate::services::venue::{self, VenueError};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("booking not found: {0}")]
    NotFound(Uuid),
    #[error("venue not found: {0}")]
    VenueNotFound(Uuid),
    #[error("venue is not open for bookings")]
    VenueUnpublished,
    #[error("requested slot is no longer available")]
    SlotTaken,
    #[error("invalid booking window: {0}")]
    InvalidWindow(&'static str),
    #[error("booking cannot be cancelled: {0}")]
    NotCancellable(&'static str),
    #[error("user {0} cannot access this booking")]
    Forbidden(Uuid),
    #[error(transparent)]
    Discount(#[from] DiscountError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<VenueError> for BookingError {
    fn from(err: VenueError) -> Self {
        match err {
            VenueError::NotFound(id) => Self::VenueNotFound(id),
            VenueError::Forbidden(id) | VenueError::NotAVendor(id) => Self::Forbidden(id),
            VenueError::Database(e) => Self::Database(e),
        }
    }
}

/// Booking status lifecycle: pending → confirmed → completed | cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Row returned from booking queries.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct BookingRow {
    pub id: Uuid,
    pub venue_id: Uuid,
    pub user_id: Option<Uuid>,
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub starts_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub ends_at: OffsetDateTime,
    pub guest_count: i32,
    pub status: String,
    pub base_price: f64,
    pub discount_amount: f64,
    pub discount_code: Option<String>,
    pub subtotal: f64,
    pub platform_fee: f64,
    pub total: f64,
    pub currency: String,
    pub refund_amount: Option<f64>,
}

/// Who the booking is for.
#[derive(Debug, Clone)]
pub enum Customer {
    User(Uuid),
    Guest { name: String, email: String },
}

/// A requested slot, as submitted by the booking form.
#[derive(Debug, Clone)]
pub struct SlotRequest {
    pub venue_id: Uuid,
    pub date: Date,
    pub start: Time,
    pub end: Time,
    pub guest_count: i32,
    pub discount_code: Option<String>,
}

/// A priced slot, ready for display or insertion.
#[derive(Debug, Clone)]
pub struct PricedSlot {
    pub venue: venue::VenueRow,
    pub quote: Quote,
    pub starts_at: OffsetDateTime,
    pub ends_at: OffsetDateTime,
}

const BOOKING_COLUMNS: &str = "id, venue_id, user_id, guest_name, guest_email, starts_at, ends_at, \
                               guest_count, status, base_price, discount_amount, discount_code, \
                               subtotal, platform_fee, total, currency, refund_amount";

// =============================================================================
// FORM PARSING
// =============================================================================

/// Parse a `YYYY-MM-DD` event date.
pub fn parse_event_date(raw: &str) -> Result<Date, BookingError> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| BookingError::InvalidWindow("date must be YYYY-MM-DD"))
}

/// Parse an `HH:MM` (or `HH:MM:SS`) clock time.
pub fn parse_clock_time(raw: &str) -> Result<Time, BookingError> {
    let raw = raw.trim();
    Time::parse(raw, format_description!("[hour]:[minute]"))
        .or_else(|_| Time::parse(raw, format_description!("[hour]:[minute]:[second]")))
        .map_err(|_| BookingError::InvalidWindow("time must be HH:MM"))
}

// =============================================================================
// QUOTING
// =============================================================================

/// Price a slot without writing anything. Validates the venue, the window,
/// and any discount code.
pub async fn price_slot(pool: &PgPool, request: &SlotRequest, now: OffsetDateTime) -> Result<PricedSlot, BookingError> {
    let venue = venue::get_venue(pool, request.venue_id).await?;
    if !venue.published {
        return Err(BookingError::VenueUnpublished);
    }
    if request.guest_count <= 0 {
        return Err(BookingError::InvalidWindow("guest count must be positive"));
    }

    let (starts_at, ends_at) = pricing::event_window(request.date, request.start, request.end);
    if starts_at <= now {
        return Err(BookingError::InvalidWindow("event must start in the future"));
    }

    let discount = match request.discount_code.as_deref() {
        Some(code) => Some(discount::validate(pool, code, now).await?),
        None => None,
    };

    let hours = pricing::billable_hours(starts_at, ends_at);
    let quote = pricing::quote(venue.hourly_rate, hours, discount);
    Ok(PricedSlot { venue, quote, starts_at, ends_at })
}

// =============================================================================
// CREATION
// =============================================================================

/// Create a booking for a user or guest. The insert and the discount
/// redemption commit atomically; any slot conflict surfaces as `SlotTaken`.
pub async fn create_booking(
    pool: &PgPool,
    request: &SlotRequest,
    customer: Customer,
    now: OffsetDateTime,
) -> Result<BookingRow, BookingError> {
    let priced = price_slot(pool, request, now).await?;

    let (user_id, guest_name, guest_email) = match &customer {
        Customer::User(id) => (Some(*id), None, None),
        Customer::Guest { name, email } => (None, Some(name.clone()), Some(email.clone())),
    };

    let mut tx = pool.begin().await.map_err(BookingError::Database)?;

    // Advisory overlap check for a friendly error; the exclusion constraint
    // below still decides the race.
    let taken: bool = sqlx::query_scalar(
        "SELECT EXISTS(
            SELECT 1 FROM bookings
            WHERE venue_id = $1
              AND status <> 'cancelled'
              AND starts_at < $3
              AND ends_at > $2
        )",
    )
    .bind(request.venue_id)
    .bind(priced.starts_at)
    .bind(priced.ends_at)
    .fetch_one(tx.as_mut())
    .await?;
    if taken {
        return Err(BookingError::SlotTaken);
    }

    let redeemed_code = match request.discount_code.as_deref() {
        Some(code) => {
            discount::redeem(&mut tx, code).await?;
            Some(code.trim().to_ascii_uppercase())
        }
        None => None,
    };

    let id = Uuid::new_v4();
    let inserted = sqlx::query_as::<_, BookingRow>(&format!(
        "INSERT INTO bookings (id, venue_id, user_id, guest_name, guest_email, starts_at, ends_at,
                               guest_count, status, base_price, discount_amount, discount_code,
                               subtotal, platform_fee, total, currency)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
         RETURNING {BOOKING_COLUMNS}"
    ))
    .bind(id)
    .bind(request.venue_id)
    .bind(user_id)
    .bind(&guest_name)
    .bind(&guest_email)
    .bind(priced.starts_at)
    .bind(priced.ends_at)
    .bind(request.guest_count)
    .bind(BookingStatus::Confirmed.as_str())
    .bind(priced.quote.base)
    .bind(priced.quote.discount)
    .bind(&redeemed_code)
    .bind(priced.quote.subtotal)
    .bind(priced.quote.platform_fee)
    .bind(priced.quote.total)
    .bind(&priced.venue.currency)
    .fetch_one(tx.as_mut())
    .await
    .map_err(|e| {
        if is_overlap_violation(&e) {
            BookingError::SlotTaken
        } else {
            BookingError::Database(e)
        }
    })?;

    tx.commit().await?;

    tracing::info!(booking_id = %id, venue_id = %request.venue_id, total = inserted.total, "booking created");

    if let Some(recipient) = booking_recipient(&inserted) {
        if let Err(e) = notify::enqueue_booking_confirmed(pool, &recipient, &inserted, &priced.venue.title).await {
            tracing::warn!(error = %e, booking_id = %id, "failed to enqueue confirmation email");
        }
    }

    Ok(inserted)
}

/// True when the error is the `bookings_no_overlap` exclusion constraint.
fn is_overlap_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("23P01"),
        _ => false,
    }
}

fn booking_recipient(booking: &BookingRow) -> Option<notify::Recipient> {
    match (&booking.guest_email, &booking.guest_name, booking.user_id) {
        (Some(email), name, _) => Some(notify::Recipient {
            email: email.clone(),
            name: name.clone().unwrap_or_else(|| "there".to_owned()),
            user_id: None,
        }),
        (None, _, Some(user_id)) => Some(notify::Recipient {
            // Resolved from the users table at render time.
            email: String::new(),
            name: String::new(),
            user_id: Some(user_id),
        }),
        (None, _, None) => None,
    }
}

// =============================================================================
// AVAILABILITY
// =============================================================================

/// Occupied slots of a venue on one day, for the booking form's advisory
/// availability display.
#[derive(Debug, Clone, serde::Serialize)]
pub struct OccupiedSlot {
    #[serde(with = "time::serde::rfc3339")]
    pub starts_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub ends_at: OffsetDateTime,
}

/// List non-cancelled bookings overlapping the given day.
pub async fn list_day_bookings(pool: &PgPool, venue_id: Uuid, date: Date) -> Result<Vec<OccupiedSlot>, BookingError> {
    let day_start = date.midnight().assume_utc();
    let day_end = day_start + time::Duration::days(1);

    let rows = sqlx::query(
        "SELECT starts_at, ends_at FROM bookings
         WHERE venue_id = $1 AND status <> 'cancelled'
           AND starts_at < $3 AND ends_at > $2
         ORDER BY starts_at ASC",
    )
    .bind(venue_id)
    .bind(day_start)
    .bind(day_end)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| OccupiedSlot { starts_at: r.get("starts_at"), ends_at: r.get("ends_at") })
        .collect())
}

// =============================================================================
// READS
// =============================================================================

/// Fetch one booking if the viewer is its customer, the venue's vendor, or
/// an admin.
pub async fn get_booking_for(pool: &PgPool, booking_id: Uuid, viewer: &SessionUser) -> Result<BookingRow, BookingError> {
    let booking = sqlx::query_as::<_, BookingRow>(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
    ))
    .bind(booking_id)
    .fetch_optional(pool)
    .await?
    .ok_or(BookingError::NotFound(booking_id))?;

    if viewer.role == UserRole::Admin || booking.user_id == Some(viewer.id) {
        return Ok(booking);
    }

    let is_vendor: bool = sqlx::query_scalar(
        "SELECT EXISTS(
            SELECT 1 FROM venues v
            JOIN vendors vd ON vd.id = v.vendor_id
            WHERE v.id = $1 AND vd.user_id = $2
        )",
    )
    .bind(booking.venue_id)
    .bind(viewer.id)
    .fetch_one(pool)
    .await?;

    if is_vendor {
        Ok(booking)
    } else {
        Err(BookingError::Forbidden(viewer.id))
    }
}

/// Bookings made by the user, newest first.
pub async fn list_customer_bookings(pool: &PgPool, user_id: Uuid) -> Result<Vec<BookingRow>, BookingError> {
    let rows = sqlx::query_as::<_, BookingRow>(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_id = $1 ORDER BY starts_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Bookings across every venue of the user's vendor profile.
pub async fn list_vendor_bookings(pool: &PgPool, user_id: Uuid) -> Result<Vec<BookingRow>, BookingError> {
    let rows = sqlx::query_as::<_, BookingRow>(&format!(
        "SELECT b.id, b.venue_id, b.user_id, b.guest_name, b.guest_email, b.starts_at, b.ends_at,
                b.guest_count, b.status, b.base_price, b.discount_amount, b.discount_code,
                b.subtotal, b.platform_fee, b.total, b.currency, b.refund_amount
         FROM bookings b
         JOIN venues v ON v.id = b.venue_id
         JOIN vendors vd ON vd.id = v.vendor_id
         WHERE vd.user_id = $1
         ORDER BY b.starts_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

// =============================================================================
// CANCELLATION
// =============================================================================

/// Outcome of a cancellation, including the tiered refund.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CancellationOutcome {
    pub booking: BookingRow,
    pub refund_percent: f64,
    pub refund_amount: f64,
}

/// Cancel a booking, computing the refund from the time remaining before
/// the event. Only the booking's customer or an admin may cancel.
pub async fn cancel_booking(
    pool: &PgPool,
    booking_id: Uuid,
    viewer: &SessionUser,
    now: OffsetDateTime,
) -> Result<CancellationOutcome, BookingError> {
    let mut tx = pool.begin().await.map_err(BookingError::Database)?;

    let booking = sqlx::query_as::<_, BookingRow>(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1 FOR UPDATE"
    ))
    .bind(booking_id)
    .fetch_optional(tx.as_mut())
    .await?
    .ok_or(BookingError::NotFound(booking_id))?;

    if viewer.role != UserRole::Admin && booking.user_id != Some(viewer.id) {
        return Err(BookingError::Forbidden(viewer.id));
    }
    match booking.status.as_str() {
        "cancelled" => return Err(BookingError::NotCancellable("already cancelled")),
        "completed" => return Err(BookingError::NotCancellable("event already completed")),
        _ => {}
    }

    let days = pricing::days_until(now, booking.starts_at);
    let refund_percent = pricing::refund_percent(days);
    let refund = pricing::refund_amount(booking.total, days);

    let updated = sqlx::query_as::<_, BookingRow>(&format!(
        "UPDATE bookings
         SET status = 'cancelled', cancelled_at = $2, refund_amount = $3
         WHERE id = $1
         RETURNING {BOOKING_COLUMNS}"
    ))
    .bind(booking_id)
    .bind(now)
    .bind(refund)
    .fetch_one(tx.as_mut())
    .await?;

    tx.commit().await?;

    tracing::info!(%booking_id, refund, "booking cancelled");

    if let Some(recipient) = booking_recipient(&updated) {
        if let Err(e) =
            notify::enqueue_booking_cancelled(pool, &recipient, &updated, refund_percent).await
        {
            tracing::warn!(error = %e, %booking_id, "failed to enqueue cancellation email");
        }
    }

    Ok(CancellationOutcome { booking: updated, refund_percent, refund_amount: refund })
}

// =============================================================================
// LIFECYCLE SWEEP
// =============================================================================

/// Flip confirmed bookings whose window has passed to `completed`.
/// Run by the background worker; completion gates review eligibility.
pub async fn complete_finished_bookings(pool: &PgPool, now: OffsetDateTime) -> Result<u64, BookingError> {
    let result = sqlx::query("UPDATE bookings SET status = 'completed' WHERE status = 'confirmed' AND ends_at <= $1")
        .bind(now)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
#[path = "booking_test.rs"]
mod tests;
