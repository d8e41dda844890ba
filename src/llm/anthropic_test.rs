use super::*;

#[test]
fn parse_response_concatenates_text_blocks() {
    let json = r#"{
        "content": [
            {"type": "text", "text": "Sunlit loft"},
            {"type": "thinking", "thinking": "ignored"},
            {"type": "text", "text": "with river views."}
        ],
        "model": "claude-sonnet-4-5-20250929",
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 120, "output_tokens": 48}
    }"#;

    let resp = parse_response(json).unwrap();
    assert_eq!(resp.text, "Sunlit loft\nwith river views.");
    assert_eq!(resp.stop_reason, "end_turn");
    assert_eq!(resp.input_tokens, 120);
    assert_eq!(resp.output_tokens, 48);
}

#[test]
fn parse_response_unknown_blocks_only_yields_empty_text() {
    let json = r#"{
        "content": [{"type": "tool_use", "id": "t1", "name": "x", "input": {}}],
        "model": "m",
        "stop_reason": "tool_use",
        "usage": {"input_tokens": 1, "output_tokens": 2}
    }"#;

    let resp = parse_response(json).unwrap();
    assert!(resp.text.is_empty());
}

#[test]
fn parse_response_rejects_malformed_json() {
    let err = parse_response("{not json").unwrap_err();
    assert!(matches!(err, LlmError::ApiParse(_)));
}

#[test]
fn client_build_succeeds() {
    let timeouts = super::super::config::LlmTimeouts { request_secs: 5, connect_secs: 1 };
    assert!(AnthropicClient::new("key".into(), timeouts).is_ok());
}
