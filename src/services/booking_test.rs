use super::*;

#[test]
fn parse_event_date_accepts_iso() {
    let date = parse_event_date("2026-06-20").unwrap();
    assert_eq!(date, time::macros::date!(2026 - 06 - 20));
    assert!(parse_event_date(" 2026-06-20 ").is_ok());
}

#[test]
fn parse_event_date_rejects_garbage() {
    for raw in ["", "06/20/2026", "2026-13-01", "yesterday"] {
        assert!(matches!(parse_event_date(raw), Err(BookingError::InvalidWindow(_))), "{raw} should fail");
    }
}

#[test]
fn parse_clock_time_accepts_hm_and_hms() {
    assert_eq!(parse_clock_time("14:30").unwrap(), time::macros::time!(14:30));
    assert_eq!(parse_clock_time("09:05:30").unwrap(), time::macros::time!(09:05:30));
}

#[test]
fn parse_clock_time_rejects_garbage() {
    for raw in ["", "25:00", "2pm", "14"] {
        assert!(matches!(parse_clock_time(raw), Err(BookingError::InvalidWindow(_))), "{raw} should fail");
    }
}

#[test]
fn booking_status_labels_match_schema() {
    assert_eq!(BookingStatus::Pending.as_str(), "pending");
    assert_eq!(BookingStatus::Confirmed.as_str(), "confirmed");
    assert_eq!(BookingStatus::Completed.as_str(), "completed");
    assert_eq!(BookingStatus::Cancelled.as_str(), "cancelled");
}

fn sample_booking(user_id: Option<Uuid>, guest_email: Option<&str>) -> BookingRow {
    BookingRow {
        id: Uuid::new_v4(),
        venue_id: Uuid::new_v4(),
        user_id,
        guest_name: guest_email.map(|_| "Guest".to_owned()),
        guest_email: guest_email.map(str::to_owned),
        starts_at: time::macros::datetime!(2026 - 06 - 20 14:00 UTC),
        ends_at: time::macros::datetime!(2026 - 06 - 20 18:00 UTC),
        guest_count: 10,
        status: "confirmed".into(),
        base_price: 400.0,
        discount_amount: 0.0,
        discount_code: None,
        subtotal: 400.0,
        platform_fee: 10.0,
        total: 410.0,
        currency: "USD".into(),
        refund_amount: None,
    }
}

#[test]
fn recipient_prefers_guest_email() {
    let booking = sample_booking(None, Some("guest@example.com"));
    let recipient = booking_recipient(&booking).expect("guest recipient");
    assert_eq!(recipient.email, "guest@example.com");
    assert!(recipient.user_id.is_none());
}

#[test]
fn recipient_defers_to_user_lookup_for_account_bookings() {
    let user_id = Uuid::new_v4();
    let booking = sample_booking(Some(user_id), None);
    let recipient = booking_recipient(&booking).expect("user recipient");
    assert_eq!(recipient.user_id, Some(user_id));
}

#[test]
fn recipient_absent_when_no_contact() {
    let booking = sample_booking(None, None);
    assert!(booking_recipient(&booking).is_none());
}

#[test]
fn booking_row_serializes_timestamps_as_rfc3339() {
    let booking = sample_booking(None, Some("guest@example.com"));
    let json = serde_json::to_value(&booking).unwrap();
    assert_eq!(json["starts_at"], "2026-06-20T14:00:00Z");
    assert_eq!(json["total"], 410.0);
}
