use super::*;

#[test]
fn parse_response_takes_first_url() {
    let json = r#"{"data": [{"url": "https://img.example/a.png"}, {"url": "https://img.example/b.png"}]}"#;
    let img = parse_response(json).unwrap();
    assert_eq!(img.url, "https://img.example/a.png");
}

#[test]
fn parse_response_skips_null_urls() {
    let json = r#"{"data": [{"url": null}, {"url": "https://img.example/b.png"}]}"#;
    let img = parse_response(json).unwrap();
    assert_eq!(img.url, "https://img.example/b.png");
}

#[test]
fn parse_response_errors_when_no_image() {
    let err = parse_response(r#"{"data": []}"#).unwrap_err();
    assert!(matches!(err, ImageGenError::ApiParse(_)));
    let err = parse_response(r#"{"data": [{"url": null}]}"#).unwrap_err();
    assert!(matches!(err, ImageGenError::ApiParse(_)));
}

#[test]
fn parse_response_rejects_malformed_json() {
    let err = parse_response("nope").unwrap_err();
    assert!(matches!(err, ImageGenError::ApiParse(_)));
}
