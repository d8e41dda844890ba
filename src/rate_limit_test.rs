use super::*;

#[test]
fn per_user_allows_up_to_limit() {
    let rl = RateLimiter::new();
    let user = Uuid::new_v4();
    let now = Instant::now();

    for i in 0..DEFAULT_PER_USER_LIMIT {
        assert!(rl.check_and_record_at(user, now).is_ok(), "request {i} should succeed");
    }
    assert!(matches!(
        rl.check_and_record_at(user, now),
        Err(RateLimitError::PerUserExceeded { .. })
    ));
}

#[test]
fn global_allows_up_to_limit() {
    let rl = RateLimiter::new();
    let now = Instant::now();

    // Use distinct users to avoid hitting the per-user limit first.
    for i in 0..DEFAULT_GLOBAL_LIMIT {
        let user = Uuid::new_v4();
        assert!(rl.check_and_record_at(user, now).is_ok(), "request {i} should succeed");
    }
    let user = Uuid::new_v4();
    assert!(matches!(
        rl.check_and_record_at(user, now),
        Err(RateLimitError::GlobalExceeded { .. })
    ));
}

#[test]
fn token_budget_blocks_next_request() {
    let rl = RateLimiter::new();
    let user = Uuid::new_v4();
    let now = Instant::now();

    rl.record_tokens_at(user, DEFAULT_TOKEN_BUDGET, now);

    assert!(matches!(
        rl.check_and_record_at(user, now),
        Err(RateLimitError::TokenBudgetExceeded { .. })
    ));
}

#[test]
fn token_usage_below_budget_passes() {
    let rl = RateLimiter::new();
    let user = Uuid::new_v4();
    let now = Instant::now();

    rl.record_tokens_at(user, DEFAULT_TOKEN_BUDGET - 1, now);
    assert!(rl.check_and_record_at(user, now).is_ok());
}

#[test]
fn window_expiry_allows_new_requests() {
    let rl = RateLimiter::new();
    let user = Uuid::new_v4();
    let start = Instant::now();

    for _ in 0..DEFAULT_PER_USER_LIMIT {
        rl.check_and_record_at(user, start).unwrap();
    }
    assert!(rl.check_and_record_at(user, start).is_err());

    // After the window passes, requests should succeed again.
    let after_window = start + Duration::from_secs(DEFAULT_PER_USER_WINDOW_SECS) + Duration::from_millis(1);
    assert!(rl.check_and_record_at(user, after_window).is_ok());
}

#[test]
fn token_window_expiry_restores_budget() {
    let rl = RateLimiter::new();
    let user = Uuid::new_v4();
    let start = Instant::now();

    rl.record_tokens_at(user, DEFAULT_TOKEN_BUDGET, start);
    assert!(rl.check_and_record_at(user, start).is_err());

    let after_window = start + Duration::from_secs(DEFAULT_TOKEN_WINDOW_SECS) + Duration::from_millis(1);
    assert!(rl.check_and_record_at(user, after_window).is_ok());
}

#[test]
fn distinct_users_do_not_interfere() {
    let rl = RateLimiter::new();
    let user_a = Uuid::new_v4();
    let user_b = Uuid::new_v4();
    let now = Instant::now();

    for _ in 0..DEFAULT_PER_USER_LIMIT {
        rl.check_and_record_at(user_a, now).unwrap();
    }
    assert!(rl.check_and_record_at(user_a, now).is_err());
    assert!(rl.check_and_record_at(user_b, now).is_ok());
}
