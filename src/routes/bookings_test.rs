use super::*;

fn slot_body(date: &str, start: &str, end: &str) -> SlotBody {
    SlotBody {
        venue_id: Uuid::new_v4(),
        date: date.into(),
        start_time: start.into(),
        end_time: end.into(),
        guest_count: 25,
        discount_code: None,
    }
}

#[test]
fn slot_body_parses_into_request() {
    let request = slot_body("2026-06-20", "14:00", "18:30").into_request().unwrap();
    assert_eq!(request.date, time::macros::date!(2026 - 06 - 20));
    assert_eq!(request.start, time::macros::time!(14:00));
    assert_eq!(request.end, time::macros::time!(18:30));
    assert_eq!(request.guest_count, 25);
}

#[test]
fn slot_body_blank_discount_code_is_dropped() {
    let mut body = slot_body("2026-06-20", "14:00", "18:30");
    body.discount_code = Some("   ".into());
    let request = body.into_request().unwrap();
    assert!(request.discount_code.is_none());
}

#[test]
fn slot_body_rejects_bad_date_and_time() {
    assert!(slot_body("junk", "14:00", "18:00").into_request().is_err());
    assert!(slot_body("2026-06-20", "2pm", "18:00").into_request().is_err());
    assert!(slot_body("2026-06-20", "14:00", "late").into_request().is_err());
}

#[test]
fn slot_body_defaults_guest_count() {
    let body: SlotBody = serde_json::from_value(serde_json::json!({
        "venue_id": Uuid::new_v4(),
        "date": "2026-06-20",
        "start_time": "14:00",
        "end_time": "18:00"
    }))
    .unwrap();
    assert_eq!(body.guest_count, 1);
}

#[test]
fn guest_checkout_body_flattens_slot() {
    let body: GuestCheckoutBody = serde_json::from_value(serde_json::json!({
        "venue_id": Uuid::new_v4(),
        "date": "2026-06-20",
        "start_time": "20:00",
        "end_time": "02:00",
        "name": "Sam",
        "email": "sam@example.com"
    }))
    .unwrap();
    assert_eq!(body.name, "Sam");
    assert_eq!(body.slot.start_time, "20:00");
}

#[test]
fn booking_errors_map_to_statuses() {
    assert_eq!(booking_error_to_status(&BookingError::SlotTaken), StatusCode::CONFLICT);
    assert_eq!(booking_error_to_status(&BookingError::NotFound(Uuid::new_v4())), StatusCode::NOT_FOUND);
    assert_eq!(
        booking_error_to_status(&BookingError::InvalidWindow("bad")),
        StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(
        booking_error_to_status(&BookingError::Forbidden(Uuid::new_v4())),
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        booking_error_to_status(&BookingError::Discount(DiscountError::Unknown)),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        booking_error_to_status(&BookingError::Discount(DiscountError::Expired)),
        StatusCode::UNPROCESSABLE_ENTITY
    );
}
