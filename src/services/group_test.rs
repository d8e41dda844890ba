use super::*;

#[test]
fn contributor_emails_include_organizer_first() {
    let emails =
        collect_contributor_emails("organizer@example.com", &["friend@example.com".into()]).unwrap();
    assert_eq!(emails, vec!["organizer@example.com", "friend@example.com"]);
}

#[test]
fn contributor_emails_dedupe_case_insensitively() {
    let emails = collect_contributor_emails(
        "organizer@example.com",
        &["Friend@Example.com".into(), "friend@example.com".into(), "ORGANIZER@example.com".into()],
    )
    .unwrap();
    assert_eq!(emails, vec!["organizer@example.com", "friend@example.com"]);
}

#[test]
fn contributor_emails_require_a_second_person() {
    let err = collect_contributor_emails("organizer@example.com", &[]).unwrap_err();
    assert!(matches!(err, GroupError::InvalidContributors(_)));

    let err =
        collect_contributor_emails("organizer@example.com", &["organizer@example.com".into()]).unwrap_err();
    assert!(matches!(err, GroupError::InvalidContributors(_)));
}

#[test]
fn contributor_emails_reject_malformed_entries() {
    let err = collect_contributor_emails("organizer@example.com", &["not-an-email".into()]).unwrap_err();
    assert!(matches!(err, GroupError::InvalidContributors("invalid contributor email")));
}
