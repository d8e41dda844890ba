use super::*;

#[test]
fn generate_token_is_64_hex_chars() {
    let token = generate_token();
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn generate_token_is_unique_enough() {
    assert_ne!(generate_token(), generate_token());
}

#[test]
fn bytes_to_hex_lowercase() {
    assert_eq!(bytes_to_hex(&[0x00, 0xff, 0x0a]), "00ff0a");
}

#[test]
fn user_role_round_trip() {
    for role in [UserRole::Customer, UserRole::Vendor, UserRole::Admin] {
        assert_eq!(UserRole::from_str(role.as_str()), Some(role));
    }
    assert_eq!(UserRole::from_str("superuser"), None);
}

#[test]
fn session_user_locale_resolution() {
    let user = SessionUser {
        id: uuid::Uuid::new_v4(),
        email: "a@b.c".into(),
        name: "A".into(),
        role: UserRole::Customer,
        language: "fr-CA".into(),
        currency: "GBP".into(),
    };
    let locale = user.locale();
    assert_eq!(locale.language, crate::localization::Language::Fr);
    assert_eq!(locale.currency, crate::localization::Currency::Gbp);
}
