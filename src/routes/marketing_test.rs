use super::*;
use crate::imagegen::ImageGenError;
use crate::llm::types::LlmError;
use crate::services::venue::VenueError;

#[test]
fn marketing_errors_map_to_statuses() {
    assert_eq!(
        marketing_error_to_status(&MarketingError::LlmNotConfigured),
        StatusCode::SERVICE_UNAVAILABLE
    );
    assert_eq!(
        marketing_error_to_status(&MarketingError::ImageGenNotConfigured),
        StatusCode::SERVICE_UNAVAILABLE
    );
    assert_eq!(
        marketing_error_to_status(&MarketingError::RateLimited("slow down".into())),
        StatusCode::TOO_MANY_REQUESTS
    );
    assert_eq!(
        marketing_error_to_status(&MarketingError::Llm(LlmError::ApiRequest("timeout".into()))),
        StatusCode::BAD_GATEWAY
    );
    assert_eq!(
        marketing_error_to_status(&MarketingError::ImageGen(ImageGenError::ApiParse("bad".into()))),
        StatusCode::BAD_GATEWAY
    );
    assert_eq!(
        marketing_error_to_status(&MarketingError::Venue(VenueError::NotFound(Uuid::new_v4()))),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        marketing_error_to_status(&MarketingError::Venue(VenueError::Forbidden(Uuid::new_v4()))),
        StatusCode::FORBIDDEN
    );
}
