//! Admin reporting — revenue rollups and venue leaderboards.

use sqlx::{PgPool, Row};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("invalid period: {0}")]
    InvalidPeriod(&'static str),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Platform-wide revenue rollup for a period, bucketed by booking creation
/// time. Cancelled bookings contribute their refunds, not their totals.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RevenueSummary {
    pub gross: f64,
    pub discounts: f64,
    pub platform_fees: f64,
    pub refunds: f64,
    pub bookings_total: i64,
    pub bookings_confirmed: i64,
    pub bookings_completed: i64,
    pub bookings_cancelled: i64,
}

/// One row of the top-venues leaderboard.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct TopVenue {
    pub venue_id: Uuid,
    pub title: String,
    pub city: String,
    pub bookings: i64,
    pub revenue: f64,
}

fn check_period(from: OffsetDateTime, to: OffsetDateTime) -> Result<(), ReportError> {
    if to <= from {
        return Err(ReportError::InvalidPeriod("period end must be after start"));
    }
    Ok(())
}

/// Revenue rollup across every booking created in the period.
pub async fn revenue_summary(
    pool: &PgPool,
    from: OffsetDateTime,
    to: OffsetDateTime,
) -> Result<RevenueSummary, ReportError> {
    check_period(from, to)?;

    let row = sqlx::query(
        "SELECT
            COALESCE(SUM(total) FILTER (WHERE status <> 'cancelled'), 0) AS gross,
            COALESCE(SUM(discount_amount) FILTER (WHERE status <> 'cancelled'), 0) AS discounts,
            COALESCE(SUM(platform_fee) FILTER (WHERE status <> 'cancelled'), 0) AS platform_fees,
            COALESCE(SUM(refund_amount), 0) AS refunds,
            COUNT(*) AS bookings_total,
            COUNT(*) FILTER (WHERE status = 'confirmed') AS bookings_confirmed,
            COUNT(*) FILTER (WHERE status = 'completed') AS bookings_completed,
            COUNT(*) FILTER (WHERE status = 'cancelled') AS bookings_cancelled
         FROM bookings
         WHERE created_at >= $1 AND created_at < $2",
    )
    .bind(from)
    .bind(to)
    .fetch_one(pool)
    .await?;

    Ok(RevenueSummary {
        gross: row.get("gross"),
        discounts: row.get("discounts"),
        platform_fees: row.get("platform_fees"),
        refunds: row.get("refunds"),
        bookings_total: row.get("bookings_total"),
        bookings_confirmed: row.get("bookings_confirmed"),
        bookings_completed: row.get("bookings_completed"),
        bookings_cancelled: row.get("bookings_cancelled"),
    })
}

/// Venues ranked by non-cancelled revenue over the period.
pub async fn top_venues(
    pool: &PgPool,
    from: OffsetDateTime,
    to: OffsetDateTime,
    limit: i64,
) -> Result<Vec<TopVenue>, ReportError> {
    check_period(from, to)?;
    let limit = limit.clamp(1, 100);

    let rows = sqlx::query_as::<_, TopVenue>(
        "SELECT v.id AS venue_id, v.title, v.city,
                COUNT(b.id) AS bookings,
                COALESCE(SUM(b.total), 0) AS revenue
         FROM venues v
         JOIN bookings b ON b.venue_id = v.id
         WHERE b.status <> 'cancelled'
           AND b.created_at >= $1 AND b.created_at < $2
         GROUP BY v.id, v.title, v.city
         ORDER BY revenue DESC, bookings DESC
         LIMIT $3",
    )
    .bind(from)
    .bind(to)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
