use super::*;
use time::macros::datetime;

#[test]
fn fill_template_replaces_all_placeholders() {
    let out = fill_template("Hi {{NAME}}, see you at {{VENUE}}. Bye {{NAME}}.", &[("NAME", "Ada"), ("VENUE", "Loft 9")]);
    assert_eq!(out, "Hi Ada, see you at Loft 9. Bye Ada.");
}

#[test]
fn fill_template_leaves_unknown_placeholders() {
    let out = fill_template("{{KNOWN}} {{UNKNOWN}}", &[("KNOWN", "x")]);
    assert_eq!(out, "x {{UNKNOWN}}");
}

#[test]
fn format_window_same_day() {
    let when = format_window(datetime!(2026 - 06 - 20 14:00 UTC), datetime!(2026 - 06 - 20 18:30 UTC));
    assert_eq!(when, "2026-06-20 14:00–18:30 UTC");
}

#[test]
fn format_window_overnight_shows_start_date() {
    let when = format_window(datetime!(2026 - 06 - 20 20:00 UTC), datetime!(2026 - 06 - 21 02:00 UTC));
    assert_eq!(when, "2026-06-20 20:00–02:00 UTC");
}

#[test]
fn percent_label_rounds() {
    assert_eq!(percent_label(0.90), "90%");
    assert_eq!(percent_label(0.25), "25%");
    assert_eq!(percent_label(0.0), "0%");
}

#[test]
fn money_formats_with_booking_currency() {
    assert_eq!(money(1025.0, "USD"), "$1,025.00");
    assert_eq!(money(50.0, "EUR"), "€50.00");
    // Unknown codes fall back to USD rather than dropping the amount.
    assert_eq!(money(10.0, "???"), "$10.00");
}

#[test]
fn booking_confirmation_template_has_expected_placeholders() {
    for key in ["{{NAME}}", "{{VENUE}}", "{{WHEN}}", "{{GUESTS}}", "{{SUBTOTAL}}", "{{FEE}}", "{{TOTAL}}"] {
        assert!(BOOKING_CONFIRMATION_TEMPLATE.contains(key), "missing {key}");
    }
}

#[test]
fn cancellation_template_has_expected_placeholders() {
    for key in ["{{NAME}}", "{{VENUE}}", "{{WHEN}}", "{{REFUND}}", "{{REFUND_PERCENT}}", "{{TOTAL}}"] {
        assert!(BOOKING_CANCELLED_TEMPLATE.contains(key), "missing {key}");
    }
}
