use super::*;

#[test]
fn parse_response_takes_first_choice() {
    let json = r#"{
        "choices": [
            {"message": {"content": "A stunning rooftop venue."}, "finish_reason": "stop"}
        ],
        "model": "gpt-4o",
        "usage": {"prompt_tokens": 80, "completion_tokens": 25}
    }"#;

    let resp = parse_response(json).unwrap();
    assert_eq!(resp.text, "A stunning rooftop venue.");
    assert_eq!(resp.stop_reason, "stop");
    assert_eq!(resp.input_tokens, 80);
    assert_eq!(resp.output_tokens, 25);
}

#[test]
fn parse_response_tolerates_null_content() {
    let json = r#"{
        "choices": [{"message": {"content": null}, "finish_reason": "length"}],
        "model": "gpt-4o",
        "usage": {"prompt_tokens": 1, "completion_tokens": 0}
    }"#;

    let resp = parse_response(json).unwrap();
    assert!(resp.text.is_empty());
    assert_eq!(resp.stop_reason, "length");
}

#[test]
fn parse_response_errors_on_empty_choices() {
    let json = r#"{"choices": [], "model": "gpt-4o", "usage": {"prompt_tokens": 0, "completion_tokens": 0}}"#;
    let err = parse_response(json).unwrap_err();
    assert!(matches!(err, LlmError::ApiParse(_)));
}

#[test]
fn client_build_succeeds() {
    let timeouts = super::super::config::LlmTimeouts { request_secs: 5, connect_secs: 1 };
    assert!(OpenAiClient::new("key".into(), "https://example.test/v1".into(), timeouts).is_ok());
}
