use super::*;

#[test]
fn normalize_trims_and_uppercases() {
    assert_eq!(normalize("  summer10 "), "SUMMER10");
    assert_eq!(normalize("WELCOME"), "WELCOME");
}

#[test]
fn to_discount_maps_kinds() {
    assert_eq!(to_discount("percent", 15.0), Discount::Percent(15.0));
    assert_eq!(to_discount("flat", 25.0), Discount::Flat(25.0));
    // Unknown kinds degrade to flat; the CHECK constraint makes this unreachable in practice.
    assert_eq!(to_discount("mystery", 5.0), Discount::Flat(5.0));
}
