use super::*;

#[tokio::test]
async fn create_review_rejects_out_of_range_ratings() {
    let state = crate::state::test_helpers::test_app_state();
    for rating in [0, 6, -1] {
        let err = create_review(&state.pool, Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), rating, "nope")
            .await
            .unwrap_err();
        assert!(matches!(err, ReviewError::InvalidRating), "rating {rating} should be rejected");
    }
}
