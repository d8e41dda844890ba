use super::*;

#[test]
fn retryable_errors() {
    assert!(LlmError::ApiRequest("timeout".into()).retryable());
    assert!(LlmError::ApiResponse { status: 429, body: String::new() }.retryable());
    assert!(LlmError::ApiResponse { status: 503, body: String::new() }.retryable());
}

#[test]
fn non_retryable_errors() {
    assert!(!LlmError::ApiResponse { status: 400, body: String::new() }.retryable());
    assert!(!LlmError::MissingApiKey { var: "X".into() }.retryable());
    assert!(!LlmError::ApiParse("bad json".into()).retryable());
    assert!(!LlmError::ConfigParse("bad".into()).retryable());
}

#[test]
fn message_user_helper() {
    let m = Message::user("hello");
    assert_eq!(m.role, "user");
    assert_eq!(m.content, "hello");
}

#[test]
fn chat_response_total_tokens_saturates() {
    let r = ChatResponse {
        text: String::new(),
        model: "m".into(),
        stop_reason: "end_turn".into(),
        input_tokens: u64::MAX,
        output_tokens: 10,
    };
    assert_eq!(r.total_tokens(), u64::MAX);
}
