use super::*;

#[test]
fn currency_codes_round_trip() {
    for c in [Currency::Usd, Currency::Eur, Currency::Gbp] {
        assert_eq!(Currency::from_code(c.code()), Some(c));
    }
    assert_eq!(Currency::from_code(" eur "), Some(Currency::Eur));
    assert_eq!(Currency::from_code("JPY"), None);
    assert_eq!(Currency::from_code(""), None);
}

#[test]
fn convert_same_currency_is_identity_rounded() {
    assert!((convert(10.004, Currency::Usd, Currency::Usd) - 10.0).abs() < f64::EPSILON);
}

#[test]
fn convert_uses_usd_cross_rates() {
    // Default rates: 1 EUR = 1.09 USD, 1 GBP = 1.27 USD.
    assert!((convert(100.0, Currency::Eur, Currency::Usd) - 109.0).abs() < f64::EPSILON);
    assert!((convert(127.0, Currency::Usd, Currency::Gbp) - 100.0).abs() < f64::EPSILON);
}

#[test]
fn format_groups_thousands() {
    assert_eq!(format_amount(1_234.5, Currency::Usd), "$1,234.50");
    assert_eq!(format_amount(0.99, Currency::Eur), "€0.99");
    assert_eq!(format_amount(1_000_000.0, Currency::Gbp), "£1,000,000.00");
}

#[test]
fn format_negative_amounts() {
    assert_eq!(format_amount(-42.5, Currency::Usd), "-$42.50");
    assert_eq!(format_amount(-0.001, Currency::Usd), "$0.00");
}

#[test]
fn language_from_tag_handles_regions_and_unknowns() {
    assert_eq!(Language::from_tag("en"), Language::En);
    assert_eq!(Language::from_tag("es-MX"), Language::Es);
    assert_eq!(Language::from_tag("fr_FR"), Language::Fr);
    assert_eq!(Language::from_tag("de"), Language::En);
    assert_eq!(Language::from_tag(""), Language::En);
}

#[test]
fn locale_from_profile_tolerates_bad_data() {
    let locale = Locale::from_profile("es", "EUR");
    assert_eq!(locale.language, Language::Es);
    assert_eq!(locale.currency, Currency::Eur);

    let fallback = Locale::from_profile("??", "???");
    assert_eq!(fallback, Locale::default());
}
