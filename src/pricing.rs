//! Pricing engine — booking quotes, refund tiers, and share splitting.
//!
//! DESIGN
//! ======
//! All money arithmetic for the marketplace lives here as pure functions so
//! quotes, cancellations, disputes, and group bookings compute identical
//! numbers. Amounts are f64 in the venue's currency, rounded to cents at
//! every boundary that produces a price.

use serde::{Deserialize, Serialize};
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime, Time};

/// Platform surcharge applied to every booking subtotal.
pub const PLATFORM_FEE_RATE: f64 = 0.025;

const MINUTES_PER_HOUR: f64 = 60.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

// =============================================================================
// MONEY HELPERS
// =============================================================================

/// Round an amount to cents (two decimal places, half away from zero).
#[must_use]
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Convert an amount to whole cents.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Convert whole cents back to an amount.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn from_cents(cents: i64) -> f64 {
    cents as f64 / 100.0
}

// =============================================================================
// EVENT WINDOW
// =============================================================================

/// Resolve a booking form's date + start/end clock times into a concrete
/// UTC datetime window. If the end time is at or before the start time the
/// booking runs overnight and the end rolls forward exactly one day.
#[must_use]
pub fn event_window(date: Date, start: Time, end: Time) -> (OffsetDateTime, OffsetDateTime) {
    let starts_at = PrimitiveDateTime::new(date, start);
    let mut ends_at = PrimitiveDateTime::new(date, end);
    if end <= start {
        ends_at += Duration::days(1);
    }
    (starts_at.assume_utc(), ends_at.assume_utc())
}

/// Billable duration of a window in fractional hours.
#[must_use]
pub fn billable_hours(starts_at: OffsetDateTime, ends_at: OffsetDateTime) -> f64 {
    let minutes = (ends_at - starts_at).whole_minutes();
    if minutes <= 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    {
        minutes as f64 / MINUTES_PER_HOUR
    }
}

// =============================================================================
// QUOTE
// =============================================================================

/// A discount applied to a quote's base price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Discount {
    /// Fixed amount off, in the venue's currency.
    Flat(f64),
    /// Percentage of the base price, expressed as 0..=100.
    Percent(f64),
}

impl Discount {
    /// Amount this discount removes from the given base price.
    /// Never negative, never more than the base.
    #[must_use]
    pub fn amount_off(&self, base: f64) -> f64 {
        let raw = match *self {
            Self::Flat(amount) => amount,
            Self::Percent(pct) => base * (pct / 100.0),
        };
        round_cents(raw.clamp(0.0, base))
    }
}

/// Full price breakdown for a booking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub hours: f64,
    pub base: f64,
    pub discount: f64,
    pub subtotal: f64,
    pub platform_fee: f64,
    pub total: f64,
}

/// Price a booking: `base = hours × rate`, discount off the base,
/// subtotal clamped at zero, platform fee on the subtotal.
#[must_use]
pub fn quote(hourly_rate: f64, hours: f64, discount: Option<Discount>) -> Quote {
    let hours = hours.max(0.0);
    let base = round_cents(hours * hourly_rate.max(0.0));
    let discount_amount = discount.map_or(0.0, |d| d.amount_off(base));
    let subtotal = round_cents((base - discount_amount).max(0.0));
    let platform_fee = round_cents(subtotal * PLATFORM_FEE_RATE);
    let total = round_cents(subtotal + platform_fee);
    Quote { hours, base, discount: discount_amount, subtotal, platform_fee, total }
}

// =============================================================================
// REFUND TIERS
// =============================================================================

/// Fractional days between now and the event start. Negative once the
/// event has begun.
#[must_use]
pub fn days_until(now: OffsetDateTime, starts_at: OffsetDateTime) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        (starts_at - now).whole_seconds() as f64 / SECONDS_PER_DAY
    }
}

/// Refund fraction owed for a cancellation, as a step function of the
/// time remaining before the event:
///
/// - 7 or more days out: 90%
/// - 3 up to 7 days: 70%
/// - 1 up to 3 days: 50%
/// - under a day (but not started): 25%
/// - event started or past: 0%
#[must_use]
pub fn refund_percent(days_until_event: f64) -> f64 {
    if days_until_event >= 7.0 {
        0.90
    } else if days_until_event >= 3.0 {
        0.70
    } else if days_until_event >= 1.0 {
        0.50
    } else if days_until_event >= 0.0 {
        0.25
    } else {
        0.0
    }
}

/// Refund amount for a cancellation, rounded to cents.
#[must_use]
pub fn refund_amount(total: f64, days_until_event: f64) -> f64 {
    round_cents(total.max(0.0) * refund_percent(days_until_event))
}

// =============================================================================
// SHARE SPLITTING
// =============================================================================

/// Split a total into `n` shares that differ by at most one cent and sum
/// exactly to the cent-rounded total. Earlier shares absorb the remainder.
#[must_use]
pub fn split_shares(total: f64, n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let total_cents = to_cents(total.max(0.0));
    let n_i64 = i64::try_from(n).unwrap_or(i64::MAX);
    let each = total_cents / n_i64;
    let remainder = total_cents % n_i64;
    (0..n_i64)
        .map(|i| from_cents(each + i64::from(i < remainder)))
        .collect()
}

#[cfg(test)]
#[path = "pricing_test.rs"]
mod tests;
