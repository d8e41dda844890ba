use super::*;

#[tokio::test]
async fn new_state_has_no_integrations_by_default() {
    let state = test_helpers::test_app_state();
    assert!(state.llm.is_none());
    assert!(state.imagegen.is_none());
    assert!(state.mailer.is_none());
}

#[tokio::test]
async fn uploads_dir_defaults_when_env_absent() {
    let state = test_helpers::test_app_state();
    // UPLOADS_DIR is unset in tests; the relative default applies.
    assert!(state.uploads_dir.ends_with("uploads"));
}

#[tokio::test]
async fn mock_mailer_is_wired_through_state() {
    let mailer = Arc::new(crate::mailer::mock::MockMailer::default());
    let state = test_helpers::test_app_state_with_mailer(mailer.clone());

    state
        .mailer
        .as_ref()
        .expect("mailer set")
        .send("user@example.com", "hi", "<p>hi</p>")
        .await
        .expect("mock send succeeds");

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "user@example.com");
}
