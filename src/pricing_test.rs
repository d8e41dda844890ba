use super::*;
use time::macros::{date, datetime, time};

#[test]
fn base_price_is_hours_times_rate() {
    let q = quote(150.0, 4.0, None);
    assert!((q.base - 600.0).abs() < f64::EPSILON);
    let q = quote(80.0, 2.5, None);
    assert!((q.base - 200.0).abs() < f64::EPSILON);
    let q = quote(0.0, 10.0, None);
    assert!(q.base.abs() < f64::EPSILON);
}

#[test]
fn flat_discount_reduces_subtotal() {
    let q = quote(100.0, 3.0, Some(Discount::Flat(50.0)));
    assert!((q.discount - 50.0).abs() < f64::EPSILON);
    assert!((q.subtotal - 250.0).abs() < f64::EPSILON);
}

#[test]
fn percent_discount_is_fraction_of_base() {
    let q = quote(100.0, 4.0, Some(Discount::Percent(25.0)));
    assert!((q.discount - 100.0).abs() < f64::EPSILON);
    assert!((q.subtotal - 300.0).abs() < f64::EPSILON);
}

#[test]
fn oversized_discount_never_goes_negative() {
    let q = quote(50.0, 2.0, Some(Discount::Flat(500.0)));
    assert!(q.subtotal.abs() < f64::EPSILON);
    assert!(q.platform_fee.abs() < f64::EPSILON);
    assert!(q.total.abs() < f64::EPSILON);
}

#[test]
fn negative_discount_is_ignored() {
    let q = quote(100.0, 1.0, Some(Discount::Flat(-25.0)));
    assert!(q.discount.abs() < f64::EPSILON);
    assert!((q.subtotal - 100.0).abs() < f64::EPSILON);
}

#[test]
fn platform_fee_is_fixed_rate_on_subtotal() {
    let q = quote(200.0, 5.0, None);
    assert!((q.platform_fee - 25.0).abs() < f64::EPSILON);
    assert!((q.total - 1025.0).abs() < f64::EPSILON);

    let q = quote(100.0, 3.0, Some(Discount::Percent(50.0)));
    assert!((q.platform_fee - round_cents(q.subtotal * PLATFORM_FEE_RATE)).abs() < f64::EPSILON);
}

#[test]
fn quote_rounds_to_cents() {
    // 1.5h × 33.33 = 49.994999… → base 49.99, fee 1.25 (124.975¢ rounds up).
    let q = quote(33.33, 1.5, None);
    assert!((q.base - 49.99).abs() < f64::EPSILON);
    assert!((q.platform_fee - 1.25).abs() < f64::EPSILON);
    assert!((q.total - 51.24).abs() < f64::EPSILON);
}

#[test]
fn event_window_same_day() {
    let (start, end) = event_window(date!(2026 - 06 - 20), time!(14:00), time!(18:30));
    assert_eq!(start, datetime!(2026 - 06 - 20 14:00 UTC));
    assert_eq!(end, datetime!(2026 - 06 - 20 18:30 UTC));
    assert!((billable_hours(start, end) - 4.5).abs() < f64::EPSILON);
}

#[test]
fn event_window_rolls_overnight_end_forward_one_day() {
    let (start, end) = event_window(date!(2026 - 06 - 20), time!(20:00), time!(02:00));
    assert_eq!(end, datetime!(2026 - 06 - 21 02:00 UTC));
    assert!((billable_hours(start, end) - 6.0).abs() < f64::EPSILON);
}

#[test]
fn event_window_equal_times_is_full_day() {
    let (start, end) = event_window(date!(2026 - 06 - 20), time!(09:00), time!(09:00));
    assert_eq!(end, datetime!(2026 - 06 - 21 09:00 UTC));
    assert!((billable_hours(start, end) - 24.0).abs() < f64::EPSILON);
}

#[test]
fn billable_hours_is_zero_for_inverted_window() {
    let a = datetime!(2026 - 06 - 20 10:00 UTC);
    let b = datetime!(2026 - 06 - 20 08:00 UTC);
    assert!(billable_hours(a, b).abs() < f64::EPSILON);
}

#[test]
fn refund_tiers_exact_at_boundaries() {
    assert!((refund_percent(7.0) - 0.90).abs() < f64::EPSILON);
    assert!((refund_percent(6.99) - 0.70).abs() < f64::EPSILON);
    assert!((refund_percent(3.0) - 0.70).abs() < f64::EPSILON);
    assert!((refund_percent(2.99) - 0.50).abs() < f64::EPSILON);
    assert!((refund_percent(1.0) - 0.50).abs() < f64::EPSILON);
    assert!((refund_percent(0.99) - 0.25).abs() < f64::EPSILON);
    assert!((refund_percent(0.0) - 0.25).abs() < f64::EPSILON);
    assert!(refund_percent(-0.01).abs() < f64::EPSILON);
}

#[test]
fn refund_amount_applies_tier_and_rounds() {
    assert!((refund_amount(1025.0, 10.0) - 922.50).abs() < f64::EPSILON);
    assert!((refund_amount(333.33, 4.0) - 233.33).abs() < f64::EPSILON);
    assert!(refund_amount(500.0, -1.0).abs() < f64::EPSILON);
}

#[test]
fn days_until_counts_fractional_days() {
    let now = datetime!(2026 - 06 - 13 12:00 UTC);
    let event = datetime!(2026 - 06 - 20 12:00 UTC);
    assert!((days_until(now, event) - 7.0).abs() < f64::EPSILON);
    let event = datetime!(2026 - 06 - 13 18:00 UTC);
    assert!((days_until(now, event) - 0.25).abs() < f64::EPSILON);
    let past = datetime!(2026 - 06 - 13 11:00 UTC);
    assert!(days_until(now, past) < 0.0);
}

#[test]
fn split_shares_sums_exactly() {
    let shares = split_shares(100.0, 3);
    assert_eq!(shares.len(), 3);
    let sum: f64 = shares.iter().sum();
    assert!((sum - 100.0).abs() < f64::EPSILON);
    // 10000 cents / 3 = 3333 remainder 1; first share takes the extra cent.
    assert!((shares[0] - 33.34).abs() < f64::EPSILON);
    assert!((shares[1] - 33.33).abs() < f64::EPSILON);
    assert!((shares[2] - 33.33).abs() < f64::EPSILON);
}

#[test]
fn split_shares_edge_counts() {
    assert!(split_shares(50.0, 0).is_empty());
    let solo = split_shares(50.0, 1);
    assert_eq!(solo.len(), 1);
    assert!((solo[0] - 50.0).abs() < f64::EPSILON);
    // More shares than cents: some shares are zero.
    let tiny = split_shares(0.02, 3);
    let sum: f64 = tiny.iter().sum();
    assert!((sum - 0.02).abs() < f64::EPSILON);
    assert!(tiny[2].abs() < f64::EPSILON);
}

#[test]
fn cents_round_trip() {
    assert_eq!(to_cents(10.556), 1056);
    assert!((from_cents(1056) - 10.56).abs() < f64::EPSILON);
    assert!((round_cents(10.554) - 10.55).abs() < f64::EPSILON);
}
