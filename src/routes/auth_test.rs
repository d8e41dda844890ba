use super::*;

#[test]
fn email_auth_errors_map_to_statuses() {
    assert_eq!(email_auth_error_to_status(EmailAuthError::InvalidEmail), StatusCode::BAD_REQUEST);
    assert_eq!(email_auth_error_to_status(EmailAuthError::InvalidCode), StatusCode::BAD_REQUEST);
    assert_eq!(email_auth_error_to_status(EmailAuthError::VerificationFailed), StatusCode::UNAUTHORIZED);
    assert_eq!(
        email_auth_error_to_status(EmailAuthError::EmailDelivery(crate::mailer::MailError::NotConfigured)),
        StatusCode::BAD_GATEWAY
    );
}

#[test]
fn parse_bool_accepts_common_spellings() {
    for raw in ["1", "true", " YES ", "on"] {
        assert_eq!(parse_bool(raw), Some(true), "{raw}");
    }
    for raw in ["0", "false", "No", "off"] {
        assert_eq!(parse_bool(raw), Some(false), "{raw}");
    }
    assert_eq!(parse_bool("maybe"), None);
    assert_eq!(env_bool("PARTY2BOOK_TEST_UNSET_FLAG"), None);
}
