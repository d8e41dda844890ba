use super::*;

#[test]
fn full_refund_returns_total() {
    assert!((Resolution::RefundFull.refund_for(1025.0) - 1025.0).abs() < f64::EPSILON);
    assert!(Resolution::RefundFull.refund_for(-5.0).abs() < f64::EPSILON);
}

#[test]
fn partial_refund_clamps_to_total() {
    let r = Resolution::RefundPartial { amount: 2000.0 };
    assert!((r.refund_for(500.0) - 500.0).abs() < f64::EPSILON);

    let r = Resolution::RefundPartial { amount: 120.555 };
    assert!((r.refund_for(500.0) - 120.55).abs() < f64::EPSILON);

    let r = Resolution::RefundPartial { amount: -50.0 };
    assert!(r.refund_for(500.0).abs() < f64::EPSILON);
}

#[test]
fn denied_refunds_nothing() {
    assert!(Resolution::Denied.refund_for(500.0).abs() < f64::EPSILON);
}

#[test]
fn resolution_labels_match_schema() {
    assert_eq!(Resolution::RefundFull.as_str(), "refund_full");
    assert_eq!(Resolution::RefundPartial { amount: 1.0 }.as_str(), "refund_partial");
    assert_eq!(Resolution::Denied.as_str(), "denied");
}

#[test]
fn resolution_deserializes_from_tagged_json() {
    let r: Resolution = serde_json::from_str(r#"{"kind": "refund_partial", "amount": 25.0}"#).unwrap();
    assert_eq!(r, Resolution::RefundPartial { amount: 25.0 });
    let r: Resolution = serde_json::from_str(r#"{"kind": "denied"}"#).unwrap();
    assert_eq!(r, Resolution::Denied);
}
