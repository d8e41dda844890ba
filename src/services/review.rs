//! Review service — post-stay reviews gated on completed bookings.

use sqlx::{PgPool, Row};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("booking not found: {0}")]
    BookingNotFound(Uuid),
    #[error("only the booking's customer may review it")]
    NotYourBooking,
    #[error("booking is not completed yet")]
    BookingNotCompleted,
    #[error("booking belongs to a different venue")]
    VenueMismatch,
    #[error("booking already has a review")]
    AlreadyReviewed,
    #[error("rating must be between 1 and 5")]
    InvalidRating,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Row returned from review queries.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct ReviewRow {
    pub id: Uuid,
    pub venue_id: Uuid,
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub author_name: String,
    pub rating: i32,
    pub comment: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Create a review for a completed booking of the venue. One per booking;
/// the unique constraint backs up the pre-check under races.
pub async fn create_review(
    pool: &PgPool,
    user_id: Uuid,
    venue_id: Uuid,
    booking_id: Uuid,
    rating: i32,
    comment: &str,
) -> Result<ReviewRow, ReviewError> {
    if !(1..=5).contains(&rating) {
        return Err(ReviewError::InvalidRating);
    }

    let booking = sqlx::query("SELECT user_id, venue_id, status FROM bookings WHERE id = $1")
        .bind(booking_id)
        .fetch_optional(pool)
        .await?
        .ok_or(ReviewError::BookingNotFound(booking_id))?;

    if booking.get::<Option<Uuid>, _>("user_id") != Some(user_id) {
        return Err(ReviewError::NotYourBooking);
    }
    if booking.get::<Uuid, _>("venue_id") != venue_id {
        return Err(ReviewError::VenueMismatch);
    }
    if booking.get::<String, _>("status") != "completed" {
        return Err(ReviewError::BookingNotCompleted);
    }

    let id = Uuid::new_v4();
    let row = sqlx::query_as::<_, ReviewRow>(
        "WITH inserted AS (
             INSERT INTO reviews (id, venue_id, booking_id, user_id, rating, comment)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, venue_id, booking_id, user_id, rating, comment, created_at
         )
         SELECT i.id, i.venue_id, i.booking_id, i.user_id, u.name AS author_name,
                i.rating, i.comment, i.created_at
         FROM inserted i JOIN users u ON u.id = i.user_id",
    )
    .bind(id)
    .bind(venue_id)
    .bind(booking_id)
    .bind(user_id)
    .bind(rating)
    .bind(comment)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ReviewError::AlreadyReviewed
        } else {
            ReviewError::Database(e)
        }
    })?;

    tracing::info!(review_id = %id, %venue_id, rating, "review created");
    Ok(row)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("23505"),
        _ => false,
    }
}

/// List a venue's reviews, newest first.
pub async fn list_reviews(pool: &PgPool, venue_id: Uuid) -> Result<Vec<ReviewRow>, ReviewError> {
    let rows = sqlx::query_as::<_, ReviewRow>(
        "SELECT r.id, r.venue_id, r.booking_id, r.user_id, u.name AS author_name,
                r.rating, r.comment, r.created_at
         FROM reviews r
         JOIN users u ON u.id = r.user_id
         WHERE r.venue_id = $1
         ORDER BY r.created_at DESC",
    )
    .bind(venue_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
#[path = "review_test.rs"]
mod tests;
