//! Dispute service — customer complaints, vendor responses, admin rulings.
//!
//! DESIGN
//! ======
//! Lifecycle: open → under_review (vendor responded) → resolved. Only an
//! admin can resolve, and resolutions that refund do so through the same
//! `refund_amount` column cancellations use, clamped to the booking total.

use sqlx::{PgPool, Row};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::pricing::round_cents;
use crate::services::notify;
use crate::services::session::SessionUser;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DisputeError {
    #[error("dispute not found: {0}")]
    NotFound(Uuid),
    #[error("booking not found: {0}")]
    BookingNotFound(Uuid),
    #[error("only the booking's customer may open a dispute")]
    NotYourBooking,
    #[error("booking already has an open dispute")]
    AlreadyOpen,
    #[error("only the venue's vendor may respond")]
    NotYourVenue,
    #[error("dispute is already resolved")]
    AlreadyResolved,
    #[error("invalid resolution: {0}")]
    InvalidResolution(&'static str),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Admin ruling on a dispute.
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    RefundFull,
    RefundPartial { amount: f64 },
    Denied,
}

impl Resolution {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RefundFull => "refund_full",
            Self::RefundPartial { .. } => "refund_partial",
            Self::Denied => "denied",
        }
    }

    /// Refund owed for a booking total under this ruling, clamped to the
    /// total and rounded to cents.
    #[must_use]
    pub fn refund_for(self, booking_total: f64) -> f64 {
        match self {
            Self::RefundFull => round_cents(booking_total.max(0.0)),
            Self::RefundPartial { amount } => round_cents(amount.clamp(0.0, booking_total.max(0.0))),
            Self::Denied => 0.0,
        }
    }
}

/// Row returned from dispute queries.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct DisputeRow {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub opened_by: Uuid,
    pub reason: String,
    pub vendor_response: Option<String>,
    pub status: String,
    pub resolution: Option<String>,
    pub resolution_amount: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub resolved_at: Option<OffsetDateTime>,
}

const DISPUTE_COLUMNS: &str = "id, booking_id, opened_by, reason, vendor_response, status, \
                               resolution, resolution_amount, created_at, resolved_at";

// =============================================================================
// OPEN / RESPOND
// =============================================================================

/// Open a dispute on the viewer's own booking.
pub async fn open_dispute(
    pool: &PgPool,
    viewer: &SessionUser,
    booking_id: Uuid,
    reason: &str,
) -> Result<DisputeRow, DisputeError> {
    let booking = sqlx::query("SELECT user_id FROM bookings WHERE id = $1")
        .bind(booking_id)
        .fetch_optional(pool)
        .await?
        .ok_or(DisputeError::BookingNotFound(booking_id))?;

    if booking.get::<Option<Uuid>, _>("user_id") != Some(viewer.id) {
        return Err(DisputeError::NotYourBooking);
    }

    let has_open: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM disputes WHERE booking_id = $1 AND status <> 'resolved')",
    )
    .bind(booking_id)
    .fetch_one(pool)
    .await?;
    if has_open {
        return Err(DisputeError::AlreadyOpen);
    }

    let id = Uuid::new_v4();
    let row = sqlx::query_as::<_, DisputeRow>(&format!(
        "INSERT INTO disputes (id, booking_id, opened_by, reason)
         VALUES ($1, $2, $3, $4)
         RETURNING {DISPUTE_COLUMNS}"
    ))
    .bind(id)
    .bind(booking_id)
    .bind(viewer.id)
    .bind(reason)
    .fetch_one(pool)
    .await?;

    tracing::info!(dispute_id = %id, %booking_id, "dispute opened");
    Ok(row)
}

/// Record the vendor's response and move the dispute under review.
pub async fn respond(
    pool: &PgPool,
    viewer: &SessionUser,
    dispute_id: Uuid,
    response: &str,
) -> Result<DisputeRow, DisputeError> {
    let dispute = get_dispute(pool, dispute_id).await?;
    if dispute.status == "resolved" {
        return Err(DisputeError::AlreadyResolved);
    }

    let is_vendor: bool = sqlx::query_scalar(
        "SELECT EXISTS(
            SELECT 1 FROM bookings b
            JOIN venues v ON v.id = b.venue_id
            JOIN vendors vd ON vd.id = v.vendor_id
            WHERE b.id = $1 AND vd.user_id = $2
        )",
    )
    .bind(dispute.booking_id)
    .bind(viewer.id)
    .fetch_one(pool)
    .await?;
    if !is_vendor {
        return Err(DisputeError::NotYourVenue);
    }

    let row = sqlx::query_as::<_, DisputeRow>(&format!(
        "UPDATE disputes SET vendor_response = $2, status = 'under_review'
         WHERE id = $1
         RETURNING {DISPUTE_COLUMNS}"
    ))
    .bind(dispute_id)
    .bind(response)
    .fetch_one(pool)
    .await?;

    notify_customer(pool, &row, "The vendor has responded to your dispute; our team is reviewing it.").await;
    Ok(row)
}

// =============================================================================
// RESOLVE
// =============================================================================

/// Resolve a dispute (admin). Refund rulings write the refund onto the
/// booking atomically with the dispute update.
pub async fn resolve(
    pool: &PgPool,
    dispute_id: Uuid,
    resolution: Resolution,
    now: OffsetDateTime,
) -> Result<DisputeRow, DisputeError> {
    if let Resolution::RefundPartial { amount } = resolution {
        if !amount.is_finite() || amount < 0.0 {
            return Err(DisputeError::InvalidResolution("refund amount must be non-negative"));
        }
    }

    let mut tx = pool.begin().await.map_err(DisputeError::Database)?;

    let dispute = sqlx::query_as::<_, DisputeRow>(&format!(
        "SELECT {DISPUTE_COLUMNS} FROM disputes WHERE id = $1 FOR UPDATE"
    ))
    .bind(dispute_id)
    .fetch_optional(tx.as_mut())
    .await?
    .ok_or(DisputeError::NotFound(dispute_id))?;

    if dispute.status == "resolved" {
        return Err(DisputeError::AlreadyResolved);
    }

    let total: f64 = sqlx::query_scalar("SELECT total FROM bookings WHERE id = $1")
        .bind(dispute.booking_id)
        .fetch_one(tx.as_mut())
        .await?;
    let refund = resolution.refund_for(total);

    if refund > 0.0 {
        sqlx::query(
            "UPDATE bookings SET refund_amount = LEAST(total, COALESCE(refund_amount, 0) + $2) WHERE id = $1",
        )
        .bind(dispute.booking_id)
        .bind(refund)
        .execute(tx.as_mut())
        .await?;
    }

    let row = sqlx::query_as::<_, DisputeRow>(&format!(
        "UPDATE disputes SET status = 'resolved', resolution = $2, resolution_amount = $3, resolved_at = $4
         WHERE id = $1
         RETURNING {DISPUTE_COLUMNS}"
    ))
    .bind(dispute_id)
    .bind(resolution.as_str())
    .bind(refund)
    .bind(now)
    .fetch_one(tx.as_mut())
    .await?;

    tx.commit().await?;

    tracing::info!(%dispute_id, resolution = resolution.as_str(), refund, "dispute resolved");

    let message = match resolution {
        Resolution::RefundFull => "Your dispute was upheld; a full refund has been issued.",
        Resolution::RefundPartial { .. } => "Your dispute was partially upheld; a partial refund has been issued.",
        Resolution::Denied => "After review, your dispute was not upheld.",
    };
    notify_customer(pool, &row, message).await;

    Ok(row)
}

// =============================================================================
// READS
// =============================================================================

/// Fetch one dispute.
pub async fn get_dispute(pool: &PgPool, dispute_id: Uuid) -> Result<DisputeRow, DisputeError> {
    sqlx::query_as::<_, DisputeRow>(&format!("SELECT {DISPUTE_COLUMNS} FROM disputes WHERE id = $1"))
        .bind(dispute_id)
        .fetch_optional(pool)
        .await?
        .ok_or(DisputeError::NotFound(dispute_id))
}

/// List disputes (admin), optionally filtered by status.
pub async fn list_disputes(pool: &PgPool, status: Option<&str>) -> Result<Vec<DisputeRow>, DisputeError> {
    let rows = match status {
        Some(status) => {
            sqlx::query_as::<_, DisputeRow>(&format!(
                "SELECT {DISPUTE_COLUMNS} FROM disputes WHERE status = $1 ORDER BY created_at DESC"
            ))
            .bind(status)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, DisputeRow>(&format!(
                "SELECT {DISPUTE_COLUMNS} FROM disputes ORDER BY created_at DESC"
            ))
            .fetch_all(pool)
            .await?
        }
    };
    Ok(rows)
}

async fn notify_customer(pool: &PgPool, dispute: &DisputeRow, message: &str) {
    let venue_title = sqlx::query_scalar::<_, String>(
        "SELECT v.title FROM bookings b JOIN venues v ON v.id = b.venue_id WHERE b.id = $1",
    )
    .bind(dispute.booking_id)
    .fetch_optional(pool)
    .await
    .ok()
    .flatten()
    .unwrap_or_else(|| "the venue".to_owned());

    let recipient = notify::Recipient { email: String::new(), name: String::new(), user_id: Some(dispute.opened_by) };
    if let Err(e) = notify::enqueue_dispute_update(pool, &recipient, &venue_title, message).await {
        tracing::warn!(error = %e, dispute_id = %dispute.id, "failed to enqueue dispute email");
    }
}

#[cfg(test)]
#[path = "dispute_test.rs"]
mod tests;
