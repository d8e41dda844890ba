//! Group booking service — split payment collection and finalization.
//!
//! DESIGN
//! ======
//! A group booking is a priced slot plus a set of contribution shares. The
//! venue slot is NOT reserved while shares are being collected; the real
//! booking row is only inserted when the last share is paid, inside the
//! same transaction that flips the group to `finalized`. If the slot was
//! taken in the meantime the exclusion constraint fires, the group is
//! cancelled, and contributors are told instead of silently double-booking.
//!
//! Contribution links are capability URLs: knowing the group and
//! contribution ids is what authorizes a payment, mirroring guest checkout.

use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::pricing;
use crate::services::booking::{self, BookingError, SlotRequest};
use crate::services::email_auth::normalize_email;
use crate::services::notify;
use crate::services::session::{SessionUser, UserRole};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GroupError {
    #[error("group booking not found: {0}")]
    NotFound(Uuid),
    #[error("contribution not found: {0}")]
    ContributionNotFound(Uuid),
    #[error("user {0} cannot modify this group booking")]
    Forbidden(Uuid),
    #[error("invalid contributors: {0}")]
    InvalidContributors(&'static str),
    #[error("contribution was already paid")]
    AlreadyPaid,
    #[error("group booking is not collecting payments")]
    NotCollecting,
    #[error(transparent)]
    Booking(#[from] BookingError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Row returned from group booking queries.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct GroupRow {
    pub id: Uuid,
    pub venue_id: Uuid,
    pub organizer_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub starts_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub ends_at: OffsetDateTime,
    pub guest_count: i32,
    pub base_price: f64,
    pub discount_amount: f64,
    pub subtotal: f64,
    pub platform_fee: f64,
    pub total: f64,
    pub currency: String,
    pub status: String,
    pub booking_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

/// One contributor's share.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct ContributionRow {
    pub id: Uuid,
    pub group_id: Uuid,
    pub email: String,
    pub share_amount: f64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub paid_at: Option<OffsetDateTime>,
}

/// Outcome of paying one share.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PaymentOutcome {
    pub group: GroupRow,
    pub remaining_unpaid: i64,
    pub finalized: bool,
}

const GROUP_COLUMNS: &str = "id, venue_id, organizer_id, starts_at, ends_at, guest_count, base_price, \
                             discount_amount, subtotal, platform_fee, total, currency, status, \
                             booking_id, expires_at";

const CONTRIBUTION_COLUMNS: &str = "id, group_id, email, share_amount, paid_at";

/// Dedup and validate the contributor list. The organizer always holds a
/// share; invitees are deduped against them and each other.
fn collect_contributor_emails(organizer_email: &str, invites: &[String]) -> Result<Vec<String>, GroupError> {
    let mut emails = vec![organizer_email.to_owned()];
    for raw in invites {
        let Some(email) = normalize_email(raw) else {
            return Err(GroupError::InvalidContributors("invalid contributor email"));
        };
        if !emails.contains(&email) {
            emails.push(email);
        }
    }
    if emails.len() < 2 {
        return Err(GroupError::InvalidContributors("at least one other contributor is required"));
    }
    Ok(emails)
}

// =============================================================================
// CREATION
// =============================================================================

/// Create a group booking: price the slot once, split the total across the
/// organizer plus the invited emails, and queue the invites.
pub async fn create_group(
    pool: &PgPool,
    organizer: &SessionUser,
    request: &SlotRequest,
    invite_emails: &[String],
    now: OffsetDateTime,
) -> Result<(GroupRow, Vec<ContributionRow>), GroupError> {
    if request.discount_code.is_some() {
        return Err(GroupError::InvalidContributors("discount codes cannot be used on group bookings"));
    }

    let organizer_email = organizer.email.to_ascii_lowercase();
    let emails = collect_contributor_emails(&organizer_email, invite_emails)?;

    let priced = booking::price_slot(pool, request, now).await?;
    let shares = pricing::split_shares(priced.quote.total, emails.len());

    let group_id = Uuid::new_v4();
    let mut tx = pool.begin().await.map_err(GroupError::Database)?;

    let group = sqlx::query_as::<_, GroupRow>(&format!(
        "INSERT INTO group_bookings (id, venue_id, organizer_id, starts_at, ends_at, guest_count,
                                     base_price, discount_amount, subtotal, platform_fee, total, currency)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
         RETURNING {GROUP_COLUMNS}"
    ))
    .bind(group_id)
    .bind(request.venue_id)
    .bind(organizer.id)
    .bind(priced.starts_at)
    .bind(priced.ends_at)
    .bind(request.guest_count)
    .bind(priced.quote.base)
    .bind(priced.quote.discount)
    .bind(priced.quote.subtotal)
    .bind(priced.quote.platform_fee)
    .bind(priced.quote.total)
    .bind(&priced.venue.currency)
    .fetch_one(tx.as_mut())
    .await?;

    let mut contributions = Vec::with_capacity(emails.len());
    for (email, share) in emails.iter().zip(&shares) {
        let row = sqlx::query_as::<_, ContributionRow>(&format!(
            "INSERT INTO group_contributions (id, group_id, email, share_amount)
             VALUES ($1, $2, $3, $4)
             RETURNING {CONTRIBUTION_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(group_id)
        .bind(email)
        .bind(share)
        .fetch_one(tx.as_mut())
        .await?;
        contributions.push(row);
    }

    tx.commit().await?;

    tracing::info!(%group_id, contributors = contributions.len(), total = group.total, "group booking created");

    for contribution in &contributions {
        if contribution.email == organizer_email {
            continue;
        }
        if let Err(e) = notify::enqueue_group_invite(
            pool,
            &contribution.email,
            &organizer.name,
            &priced.venue.title,
            group.starts_at,
            group.ends_at,
            contribution.share_amount,
            &group.currency,
        )
        .await
        {
            tracing::warn!(error = %e, %group_id, "failed to enqueue group invite");
        }
    }

    Ok((group, contributions))
}

// =============================================================================
// READS
// =============================================================================

/// Fetch a group with its contributions. Access is by capability: callers
/// hold the group id from an invite or the organizer's dashboard.
pub async fn get_group(pool: &PgPool, group_id: Uuid) -> Result<(GroupRow, Vec<ContributionRow>), GroupError> {
    let group = sqlx::query_as::<_, GroupRow>(&format!(
        "SELECT {GROUP_COLUMNS} FROM group_bookings WHERE id = $1"
    ))
    .bind(group_id)
    .fetch_optional(pool)
    .await?
    .ok_or(GroupError::NotFound(group_id))?;

    let contributions = sqlx::query_as::<_, ContributionRow>(&format!(
        "SELECT {CONTRIBUTION_COLUMNS} FROM group_contributions WHERE group_id = $1 ORDER BY share_amount DESC, email ASC"
    ))
    .bind(group_id)
    .fetch_all(pool)
    .await?;

    Ok((group, contributions))
}

// =============================================================================
// PAYMENT / FINALIZATION
// =============================================================================

/// Record one share as paid. When the last share lands, the underlying
/// booking is created in the same transaction and the group finalizes.
pub async fn pay_contribution(
    pool: &PgPool,
    group_id: Uuid,
    contribution_id: Uuid,
    now: OffsetDateTime,
) -> Result<PaymentOutcome, GroupError> {
    let mut tx = pool.begin().await.map_err(GroupError::Database)?;

    let group = sqlx::query_as::<_, GroupRow>(&format!(
        "SELECT {GROUP_COLUMNS} FROM group_bookings WHERE id = $1 FOR UPDATE"
    ))
    .bind(group_id)
    .fetch_optional(tx.as_mut())
    .await?
    .ok_or(GroupError::NotFound(group_id))?;

    if group.status != "collecting" || group.expires_at <= now {
        return Err(GroupError::NotCollecting);
    }

    let marked = sqlx::query(
        "UPDATE group_contributions SET paid_at = $3 WHERE id = $1 AND group_id = $2 AND paid_at IS NULL",
    )
    .bind(contribution_id)
    .bind(group_id)
    .bind(now)
    .execute(tx.as_mut())
    .await?;

    if marked.rows_affected() == 0 {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM group_contributions WHERE id = $1 AND group_id = $2)")
                .bind(contribution_id)
                .bind(group_id)
                .fetch_one(tx.as_mut())
                .await?;
        return Err(if exists {
            GroupError::AlreadyPaid
        } else {
            GroupError::ContributionNotFound(contribution_id)
        });
    }

    let remaining_unpaid: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM group_contributions WHERE group_id = $1 AND paid_at IS NULL",
    )
    .bind(group_id)
    .fetch_one(tx.as_mut())
    .await?;

    if remaining_unpaid > 0 {
        tx.commit().await?;
        return Ok(PaymentOutcome { group, remaining_unpaid, finalized: false });
    }

    // Last share paid: place the real booking. The exclusion constraint is
    // the arbiter if the slot was taken while shares were collecting.
    let booking_id = Uuid::new_v4();
    let insert = sqlx::query(
        "INSERT INTO bookings (id, venue_id, user_id, starts_at, ends_at, guest_count, status,
                               base_price, discount_amount, subtotal, platform_fee, total, currency)
         VALUES ($1, $2, $3, $4, $5, $6, 'confirmed', $7, $8, $9, $10, $11, $12)",
    )
    .bind(booking_id)
    .bind(group.venue_id)
    .bind(group.organizer_id)
    .bind(group.starts_at)
    .bind(group.ends_at)
    .bind(group.guest_count)
    .bind(group.base_price)
    .bind(group.discount_amount)
    .bind(group.subtotal)
    .bind(group.platform_fee)
    .bind(group.total)
    .bind(&group.currency)
    .execute(tx.as_mut())
    .await;

    if let Err(e) = insert {
        drop(tx);
        if is_overlap_violation(&e) {
            mark_group_cancelled(pool, group_id).await?;
            return Err(GroupError::Booking(BookingError::SlotTaken));
        }
        return Err(GroupError::Database(e));
    }

    let finalized = sqlx::query_as::<_, GroupRow>(&format!(
        "UPDATE group_bookings SET status = 'finalized', booking_id = $2 WHERE id = $1 RETURNING {GROUP_COLUMNS}"
    ))
    .bind(group_id)
    .bind(booking_id)
    .fetch_one(tx.as_mut())
    .await?;

    tx.commit().await?;

    tracing::info!(%group_id, %booking_id, "group booking finalized");

    let emails: Vec<String> = match sqlx::query_scalar::<_, String>(
        "SELECT email FROM group_contributions WHERE group_id = $1",
    )
    .bind(group_id)
    .fetch_all(pool)
    .await
    {
        Ok(emails) => emails,
        Err(e) => {
            tracing::warn!(error = %e, %group_id, "failed to load contributor emails");
            Vec::new()
        }
    };
    let venue_title = venue_title_for(pool, finalized.venue_id).await;
    if let Err(e) = notify::enqueue_group_finalized(
        pool,
        &emails,
        &venue_title,
        finalized.starts_at,
        finalized.ends_at,
        finalized.total,
        &finalized.currency,
    )
    .await
    {
        tracing::warn!(error = %e, %group_id, "failed to enqueue finalization emails");
    }

    Ok(PaymentOutcome { group: finalized, remaining_unpaid: 0, finalized: true })
}

async fn venue_title_for(pool: &PgPool, venue_id: Uuid) -> String {
    sqlx::query_scalar::<_, String>("SELECT title FROM venues WHERE id = $1")
        .bind(venue_id)
        .fetch_optional(pool)
        .await
        .ok()
        .flatten()
        .unwrap_or_else(|| "the venue".to_owned())
}

fn is_overlap_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("23P01"),
        _ => false,
    }
}

async fn mark_group_cancelled(pool: &PgPool, group_id: Uuid) -> Result<(), GroupError> {
    sqlx::query("UPDATE group_bookings SET status = 'cancelled' WHERE id = $1 AND status = 'collecting'")
        .bind(group_id)
        .execute(pool)
        .await?;
    tracing::warn!(%group_id, "group cancelled: venue slot was taken before finalization");
    Ok(())
}

// =============================================================================
// CANCELLATION / EXPIRY
// =============================================================================

/// Cancel a collecting group. Only the organizer or an admin may cancel.
pub async fn cancel_group(pool: &PgPool, group_id: Uuid, viewer: &SessionUser) -> Result<GroupRow, GroupError> {
    let (group, _) = get_group(pool, group_id).await?;
    if viewer.role != UserRole::Admin && group.organizer_id != viewer.id {
        return Err(GroupError::Forbidden(viewer.id));
    }
    if group.status != "collecting" {
        return Err(GroupError::NotCollecting);
    }

    let updated = sqlx::query_as::<_, GroupRow>(&format!(
        "UPDATE group_bookings SET status = 'cancelled' WHERE id = $1 AND status = 'collecting' RETURNING {GROUP_COLUMNS}"
    ))
    .bind(group_id)
    .fetch_optional(pool)
    .await?
    .ok_or(GroupError::NotCollecting)?;

    tracing::info!(%group_id, "group booking cancelled");
    Ok(updated)
}

/// Expire collecting groups past their deadline. Run by the worker.
pub async fn expire_stale_groups(pool: &PgPool, now: OffsetDateTime) -> Result<u64, GroupError> {
    let result = sqlx::query(
        "UPDATE group_bookings SET status = 'cancelled' WHERE status = 'collecting' AND expires_at <= $1",
    )
    .bind(now)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
#[path = "group_test.rs"]
mod tests;
