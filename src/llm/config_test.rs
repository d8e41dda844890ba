use super::*;

#[test]
fn parse_provider_defaults_to_anthropic() {
    assert_eq!(parse_provider(None).unwrap(), LlmProviderKind::Anthropic);
    assert_eq!(parse_provider(Some("anthropic")).unwrap(), LlmProviderKind::Anthropic);
    assert_eq!(parse_provider(Some("openai")).unwrap(), LlmProviderKind::OpenAi);
}

#[test]
fn parse_provider_rejects_unknown() {
    let err = parse_provider(Some("bard")).unwrap_err().to_string();
    assert!(err.contains("unknown LLM_PROVIDER"));
}

#[test]
fn default_models_per_provider() {
    assert!(default_model(LlmProviderKind::Anthropic).starts_with("claude"));
    assert!(default_model(LlmProviderKind::OpenAi).starts_with("gpt"));
}

#[test]
fn env_parse_u64_falls_back_on_missing_key() {
    assert_eq!(env_parse_u64("PARTY2BOOK_TEST_UNSET_TIMEOUT", 17), 17);
}
