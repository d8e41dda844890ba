//! Notification service — outbox rows and the background delivery worker.
//!
//! DESIGN
//! ======
//! Request paths never call the mail provider directly. They render the
//! email up front and insert a `notifications` row; the worker drains
//! pending rows on an interval and delivers them. A send failure leaves the
//! row pending (with an attempt cap), so a mail outage delays email instead
//! of losing it.
//!
//! The same worker tick also advances time-driven state: finished bookings
//! flip to `completed` and stale collecting groups expire.

use sqlx::{PgPool, Row};
use time::OffsetDateTime;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::localization::{self, Currency, Language};
use crate::mailer::Mailer;
use crate::services::booking::BookingRow;
use crate::state::AppState;

const BOOKING_CONFIRMATION_TEMPLATE: &str = include_str!("../../templates/booking_confirmation.html");
const BOOKING_CANCELLED_TEMPLATE: &str = include_str!("../../templates/booking_cancelled.html");
const GROUP_INVITE_TEMPLATE: &str = include_str!("../../templates/group_invite.html");
const GROUP_FINALIZED_TEMPLATE: &str = include_str!("../../templates/group_finalized.html");
const DISPUTE_UPDATE_TEMPLATE: &str = include_str!("../../templates/dispute_update.html");

const DEFAULT_OUTBOX_INTERVAL_SECS: u64 = 30;
const DEFAULT_OUTBOX_BATCH_SIZE: i64 = 50;
const MAX_SEND_ATTEMPTS: i32 = 5;

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Where a notification goes. `user_id` recipients are resolved against the
/// users table so profile edits win over whatever the caller had in hand.
#[derive(Debug, Clone)]
pub struct Recipient {
    pub email: String,
    pub name: String,
    pub user_id: Option<Uuid>,
}

struct ResolvedRecipient {
    email: String,
    name: String,
    language: Language,
}

async fn resolve(pool: &PgPool, recipient: &Recipient) -> Result<Option<ResolvedRecipient>, NotifyError> {
    if let Some(user_id) = recipient.user_id {
        let row = sqlx::query("SELECT email, name, language FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
        return Ok(row.map(|r| ResolvedRecipient {
            email: r.get("email"),
            name: r.get("name"),
            language: Language::from_tag(r.get::<String, _>("language").as_str()),
        }));
    }
    if recipient.email.is_empty() {
        return Ok(None);
    }
    Ok(Some(ResolvedRecipient {
        email: recipient.email.clone(),
        name: recipient.name.clone(),
        language: Language::En,
    }))
}

// =============================================================================
// RENDERING
// =============================================================================

/// Substitute `{{KEY}}` placeholders.
#[must_use]
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = template.to_owned();
    for (key, value) in values {
        out = out.replace(&format!("{{{{{key}}}}}"), value);
    }
    out
}

/// Human-readable UTC event window, e.g. `2026-06-20 14:00–18:30 UTC`.
#[must_use]
pub fn format_window(starts_at: OffsetDateTime, ends_at: OffsetDateTime) -> String {
    let date = starts_at.date();
    format!(
        "{date} {:02}:{:02}–{:02}:{:02} UTC",
        starts_at.hour(),
        starts_at.minute(),
        ends_at.hour(),
        ends_at.minute()
    )
}

fn money(amount: f64, currency_code: &str) -> String {
    let currency = Currency::from_code(currency_code).unwrap_or(Currency::Usd);
    localization::format_amount(amount, currency)
}

#[must_use]
#[allow(clippy::cast_possible_truncation)]
fn percent_label(fraction: f64) -> String {
    format!("{}%", (fraction * 100.0).round() as i64)
}

// =============================================================================
// ENQUEUE
// =============================================================================

async fn enqueue(
    pool: &PgPool,
    recipient_email: &str,
    kind: &str,
    subject: &str,
    body_html: &str,
) -> Result<(), NotifyError> {
    sqlx::query(
        "INSERT INTO notifications (id, recipient, kind, subject, body_html) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(Uuid::new_v4())
    .bind(recipient_email)
    .bind(kind)
    .bind(subject)
    .bind(body_html)
    .execute(pool)
    .await?;
    Ok(())
}

/// Queue the booking confirmation email.
pub async fn enqueue_booking_confirmed(
    pool: &PgPool,
    recipient: &Recipient,
    booking: &BookingRow,
    venue_title: &str,
) -> Result<(), NotifyError> {
    let Some(resolved) = resolve(pool, recipient).await? else {
        return Ok(());
    };
    let body = fill_template(
        BOOKING_CONFIRMATION_TEMPLATE,
        &[
            ("NAME", resolved.name.as_str()),
            ("VENUE", venue_title),
            ("WHEN", &format_window(booking.starts_at, booking.ends_at)),
            ("GUESTS", &booking.guest_count.to_string()),
            ("SUBTOTAL", &money(booking.subtotal, &booking.currency)),
            ("FEE", &money(booking.platform_fee, &booking.currency)),
            ("TOTAL", &money(booking.total, &booking.currency)),
        ],
    );
    enqueue(pool, &resolved.email, "booking_confirmed", "Your booking is confirmed", &body).await
}

/// Queue the cancellation + refund notice.
pub async fn enqueue_booking_cancelled(
    pool: &PgPool,
    recipient: &Recipient,
    booking: &BookingRow,
    refund_percent: f64,
) -> Result<(), NotifyError> {
    let Some(resolved) = resolve(pool, recipient).await? else {
        return Ok(());
    };
    let venue_title = venue_title_for(pool, booking.venue_id).await?;
    let body = fill_template(
        BOOKING_CANCELLED_TEMPLATE,
        &[
            ("NAME", resolved.name.as_str()),
            ("VENUE", &venue_title),
            ("WHEN", &format_window(booking.starts_at, booking.ends_at)),
            ("REFUND", &money(booking.refund_amount.unwrap_or(0.0), &booking.currency)),
            ("REFUND_PERCENT", &percent_label(refund_percent)),
            ("TOTAL", &money(booking.total, &booking.currency)),
        ],
    );
    enqueue(pool, &resolved.email, "booking_cancelled", "Your booking was cancelled", &body).await
}

/// Queue a contribution invite for one group member.
pub async fn enqueue_group_invite(
    pool: &PgPool,
    email: &str,
    organizer_name: &str,
    venue_title: &str,
    starts_at: OffsetDateTime,
    ends_at: OffsetDateTime,
    share: f64,
    currency: &str,
) -> Result<(), NotifyError> {
    let body = fill_template(
        GROUP_INVITE_TEMPLATE,
        &[
            ("ORGANIZER", organizer_name),
            ("VENUE", venue_title),
            ("WHEN", &format_window(starts_at, ends_at)),
            ("SHARE", &money(share, currency)),
        ],
    );
    enqueue(pool, email, "group_invite", "You're invited to chip in", &body).await
}

/// Queue the all-shares-paid confirmation for every contributor.
pub async fn enqueue_group_finalized(
    pool: &PgPool,
    emails: &[String],
    venue_title: &str,
    starts_at: OffsetDateTime,
    ends_at: OffsetDateTime,
    total: f64,
    currency: &str,
) -> Result<(), NotifyError> {
    let body = fill_template(
        GROUP_FINALIZED_TEMPLATE,
        &[
            ("VENUE", venue_title),
            ("WHEN", &format_window(starts_at, ends_at)),
            ("TOTAL", &money(total, currency)),
        ],
    );
    let inserts = emails
        .iter()
        .map(|email| enqueue(pool, email, "group_finalized", "Your group booking is confirmed", &body));
    futures::future::join_all(inserts)
        .await
        .into_iter()
        .collect::<Result<(), _>>()
}

/// Queue a dispute status update for the customer.
pub async fn enqueue_dispute_update(
    pool: &PgPool,
    recipient: &Recipient,
    venue_title: &str,
    message: &str,
) -> Result<(), NotifyError> {
    let Some(resolved) = resolve(pool, recipient).await? else {
        return Ok(());
    };
    let body = fill_template(
        DISPUTE_UPDATE_TEMPLATE,
        &[("NAME", resolved.name.as_str()), ("VENUE", venue_title), ("MESSAGE", message)],
    );
    enqueue(pool, &resolved.email, "dispute_update", "Update on your dispute", &body).await
}

async fn venue_title_for(pool: &PgPool, venue_id: Uuid) -> Result<String, NotifyError> {
    let title = sqlx::query_scalar::<_, String>("SELECT title FROM venues WHERE id = $1")
        .bind(venue_id)
        .fetch_optional(pool)
        .await?;
    Ok(title.unwrap_or_else(|| "the venue".to_owned()))
}

// =============================================================================
// WORKER
// =============================================================================

/// Spawn the background worker: drains the outbox and advances time-driven
/// booking/group state. Returns a handle for shutdown.
pub fn spawn_outbox_worker(state: AppState) -> JoinHandle<()> {
    let interval_secs = env_parse("OUTBOX_INTERVAL_SECS", DEFAULT_OUTBOX_INTERVAL_SECS);
    tracing::info!(interval_secs, "notification worker configured");
    tokio::spawn(async move {
        loop {
            run_tick(&state).await;
            tokio::time::sleep(std::time::Duration::from_secs(interval_secs)).await;
        }
    })
}

async fn run_tick(state: &AppState) {
    let now = OffsetDateTime::now_utc();

    match crate::services::booking::complete_finished_bookings(&state.pool, now).await {
        Ok(0) => {}
        Ok(n) => tracing::info!(completed = n, "bookings marked completed"),
        Err(e) => tracing::error!(error = %e, "booking completion sweep failed"),
    }

    match crate::services::group::expire_stale_groups(&state.pool, now).await {
        Ok(0) => {}
        Ok(n) => tracing::info!(expired = n, "stale group bookings cancelled"),
        Err(e) => tracing::error!(error = %e, "group expiry sweep failed"),
    }

    drain_outbox(state).await;
}

async fn drain_outbox(state: &AppState) {
    let Some(mailer) = &state.mailer else {
        return;
    };
    let batch_size = env_parse("OUTBOX_BATCH_SIZE", DEFAULT_OUTBOX_BATCH_SIZE);

    let rows = match sqlx::query(
        "SELECT id, recipient, subject, body_html, attempts
         FROM notifications
         WHERE status = 'pending'
         ORDER BY created_at ASC
         LIMIT $1",
    )
    .bind(batch_size)
    .fetch_all(&state.pool)
    .await
    {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(error = %e, "outbox fetch failed");
            return;
        }
    };

    for row in rows {
        let id: Uuid = row.get("id");
        let recipient: String = row.get("recipient");
        let subject: String = row.get("subject");
        let body_html: String = row.get("body_html");
        let attempts: i32 = row.get("attempts");

        match mailer.send(&recipient, &subject, &body_html).await {
            Ok(()) => {
                if let Err(e) =
                    sqlx::query("UPDATE notifications SET status = 'sent', sent_at = now() WHERE id = $1")
                        .bind(id)
                        .execute(&state.pool)
                        .await
                {
                    tracing::error!(error = %e, notification_id = %id, "failed to mark notification sent");
                }
            }
            Err(send_err) => {
                let attempts = attempts + 1;
                let status = if attempts >= MAX_SEND_ATTEMPTS { "failed" } else { "pending" };
                tracing::warn!(error = %send_err, notification_id = %id, attempts, status, "notification send failed");
                if let Err(e) = sqlx::query(
                    "UPDATE notifications SET attempts = $2, last_error = $3, status = $4 WHERE id = $1",
                )
                .bind(id)
                .bind(attempts)
                .bind(send_err.to_string())
                .bind(status)
                .execute(&state.pool)
                .await
                {
                    tracing::error!(error = %e, notification_id = %id, "failed to record send failure");
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "notify_test.rs"]
mod tests;
