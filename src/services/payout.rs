//! Payout service — per-vendor settlement over a reporting period.
//!
//! DESIGN
//! ======
//! Vendors earn the subtotal of their completed bookings; the platform
//! keeps the fee. Refunds already granted (cancellations, dispute rulings)
//! come out of the vendor's side. Regenerating a period replaces its
//! pending payouts, so reruns after late refunds are safe; paid payouts
//! are never touched.

use sqlx::{PgPool, Row};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum PayoutError {
    #[error("payout not found: {0}")]
    NotFound(Uuid),
    #[error("payout is already paid")]
    AlreadyPaid,
    #[error("invalid period: {0}")]
    InvalidPeriod(&'static str),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Row returned from payout queries.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct PayoutRow {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub vendor_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub period_start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub period_end: OffsetDateTime,
    pub gross: f64,
    pub platform_fees: f64,
    pub net: f64,
    pub status: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub paid_at: Option<OffsetDateTime>,
}

const PAYOUT_COLUMNS: &str = "p.id, p.vendor_id, vd.display_name AS vendor_name, p.period_start, \
                              p.period_end, p.gross, p.platform_fees, p.net, p.status, p.paid_at";

/// Generate pending payouts for every vendor with completed bookings whose
/// event ended inside the period. Existing pending payouts for the same
/// period are replaced.
pub async fn generate_payouts(
    pool: &PgPool,
    period_start: OffsetDateTime,
    period_end: OffsetDateTime,
) -> Result<Vec<PayoutRow>, PayoutError> {
    if period_end <= period_start {
        return Err(PayoutError::InvalidPeriod("period end must be after start"));
    }

    let mut tx = pool.begin().await.map_err(PayoutError::Database)?;

    sqlx::query("DELETE FROM payouts WHERE period_start = $1 AND period_end = $2 AND status = 'pending'")
        .bind(period_start)
        .bind(period_end)
        .execute(tx.as_mut())
        .await?;

    let aggregates = sqlx::query(
        "SELECT v.vendor_id,
                SUM(b.total) AS gross,
                SUM(b.platform_fee) AS platform_fees,
                SUM(GREATEST(b.subtotal - COALESCE(b.refund_amount, 0), 0)) AS net
         FROM bookings b
         JOIN venues v ON v.id = b.venue_id
         WHERE b.status = 'completed'
           AND b.ends_at >= $1 AND b.ends_at < $2
         GROUP BY v.vendor_id",
    )
    .bind(period_start)
    .bind(period_end)
    .fetch_all(tx.as_mut())
    .await?;

    let mut ids = Vec::with_capacity(aggregates.len());
    for row in &aggregates {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO payouts (id, vendor_id, period_start, period_end, gross, platform_fees, net)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(id)
        .bind(row.get::<Uuid, _>("vendor_id"))
        .bind(period_start)
        .bind(period_end)
        .bind(row.get::<f64, _>("gross"))
        .bind(row.get::<f64, _>("platform_fees"))
        .bind(row.get::<f64, _>("net"))
        .execute(tx.as_mut())
        .await?;
        ids.push(id);
    }

    tx.commit().await?;
    tracing::info!(count = ids.len(), "payouts generated");

    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows = sqlx::query_as::<_, PayoutRow>(&format!(
        "SELECT {PAYOUT_COLUMNS} FROM payouts p
         JOIN vendors vd ON vd.id = p.vendor_id
         WHERE p.id = ANY($1)
         ORDER BY p.net DESC"
    ))
    .bind(&ids)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// List payouts, newest period first (admin).
pub async fn list_payouts(pool: &PgPool) -> Result<Vec<PayoutRow>, PayoutError> {
    let rows = sqlx::query_as::<_, PayoutRow>(&format!(
        "SELECT {PAYOUT_COLUMNS} FROM payouts p
         JOIN vendors vd ON vd.id = p.vendor_id
         ORDER BY p.period_end DESC, p.net DESC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Mark a pending payout as paid.
pub async fn mark_paid(pool: &PgPool, payout_id: Uuid, now: OffsetDateTime) -> Result<PayoutRow, PayoutError> {
    let updated = sqlx::query("UPDATE payouts SET status = 'paid', paid_at = $2 WHERE id = $1 AND status = 'pending'")
        .bind(payout_id)
        .bind(now)
        .execute(pool)
        .await?;

    if updated.rows_affected() == 0 {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM payouts WHERE id = $1)")
            .bind(payout_id)
            .fetch_one(pool)
            .await?;
        return Err(if exists { PayoutError::AlreadyPaid } else { PayoutError::NotFound(payout_id) });
    }

    let row = sqlx::query_as::<_, PayoutRow>(&format!(
        "SELECT {PAYOUT_COLUMNS} FROM payouts p
         JOIN vendors vd ON vd.id = p.vendor_id
         WHERE p.id = $1"
    ))
    .bind(payout_id)
    .fetch_one(pool)
    .await?;
    Ok(row)
}
