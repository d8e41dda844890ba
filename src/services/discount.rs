//! Discount code service — validation, atomic redemption, admin management.
//!
//! DESIGN
//! ======
//! Validation is read-only and used for quotes; redemption happens inside
//! the booking transaction with a guarded UPDATE so a code can never exceed
//! its redemption cap under concurrent bookings.

use sqlx::{PgPool, Postgres, Row, Transaction};
use time::OffsetDateTime;

use crate::pricing::Discount;

#[derive(Debug, thiserror::Error)]
pub enum DiscountError {
    #[error("unknown discount code")]
    Unknown,
    #[error("discount code is not active")]
    Inactive,
    #[error("discount code has expired")]
    Expired,
    #[error("discount code has no redemptions left")]
    Exhausted,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A discount code row, as managed by admins.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct DiscountCodeRow {
    pub code: String,
    pub kind: String,
    pub value: f64,
    pub active: bool,
    pub expires_at: Option<OffsetDateTime>,
    pub max_redemptions: Option<i32>,
    pub redemptions: i32,
}

fn normalize(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

fn to_discount(kind: &str, value: f64) -> Discount {
    if kind == "percent" {
        Discount::Percent(value)
    } else {
        Discount::Flat(value)
    }
}

/// Validate a code without consuming a redemption. Returns the discount to
/// feed into the pricing engine.
pub async fn validate(pool: &PgPool, code: &str, now: OffsetDateTime) -> Result<Discount, DiscountError> {
    let normalized = normalize(code);
    let row = sqlx::query(
        "SELECT kind, value, active, expires_at, max_redemptions, redemptions
         FROM discount_codes WHERE code = $1",
    )
    .bind(&normalized)
    .fetch_optional(pool)
    .await?
    .ok_or(DiscountError::Unknown)?;

    if !row.get::<bool, _>("active") {
        return Err(DiscountError::Inactive);
    }
    if let Some(expires_at) = row.get::<Option<OffsetDateTime>, _>("expires_at") {
        if expires_at <= now {
            return Err(DiscountError::Expired);
        }
    }
    if let Some(max) = row.get::<Option<i32>, _>("max_redemptions") {
        if row.get::<i32, _>("redemptions") >= max {
            return Err(DiscountError::Exhausted);
        }
    }

    Ok(to_discount(row.get("kind"), row.get("value")))
}

/// Consume one redemption inside the booking transaction. The guarded
/// UPDATE re-checks every condition so two racing bookings cannot both
/// take the last redemption.
pub async fn redeem(tx: &mut Transaction<'_, Postgres>, code: &str) -> Result<Discount, DiscountError> {
    let normalized = normalize(code);
    let row = sqlx::query(
        "UPDATE discount_codes
         SET redemptions = redemptions + 1
         WHERE code = $1
           AND active = TRUE
           AND (expires_at IS NULL OR expires_at > now())
           AND (max_redemptions IS NULL OR redemptions < max_redemptions)
         RETURNING kind, value",
    )
    .bind(&normalized)
    .fetch_optional(tx.as_mut())
    .await?;

    match row {
        Some(row) => Ok(to_discount(row.get("kind"), row.get("value"))),
        // Distinguishing the exact failure needs a second read; the booking
        // flow re-runs `validate` for a precise error message.
        None => Err(DiscountError::Exhausted),
    }
}

/// Create a discount code (admin).
pub async fn create_code(
    pool: &PgPool,
    code: &str,
    discount: Discount,
    expires_at: Option<OffsetDateTime>,
    max_redemptions: Option<i32>,
) -> Result<DiscountCodeRow, DiscountError> {
    let normalized = normalize(code);
    let (kind, value) = match discount {
        Discount::Flat(v) => ("flat", v),
        Discount::Percent(v) => ("percent", v),
    };

    let row = sqlx::query_as::<_, DiscountCodeRow>(
        "INSERT INTO discount_codes (code, kind, value, expires_at, max_redemptions)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING code, kind, value, active, expires_at, max_redemptions, redemptions",
    )
    .bind(&normalized)
    .bind(kind)
    .bind(value)
    .bind(expires_at)
    .bind(max_redemptions)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// List all codes, newest first (admin).
pub async fn list_codes(pool: &PgPool) -> Result<Vec<DiscountCodeRow>, DiscountError> {
    let rows = sqlx::query_as::<_, DiscountCodeRow>(
        "SELECT code, kind, value, active, expires_at, max_redemptions, redemptions
         FROM discount_codes ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
#[path = "discount_test.rs"]
mod tests;
