use super::*;

fn sample_venue() -> VenueRow {
    VenueRow {
        id: Uuid::new_v4(),
        vendor_id: Uuid::new_v4(),
        title: "The Glasshouse".into(),
        description: String::new(),
        city: "Portland".into(),
        category: "rooftop".into(),
        capacity: 120,
        hourly_rate: 250.0,
        currency: "USD".into(),
        amenities: serde_json::json!(["sound system", "bar"]),
        photo_urls: serde_json::json!([]),
        published: true,
    }
}

#[test]
fn parse_campaign_draft_splits_subject_and_body() {
    let draft = parse_campaign_draft("Subject: Summer at the Glasshouse\n\nBook your rooftop party now.");
    assert_eq!(draft.subject, "Summer at the Glasshouse");
    assert_eq!(draft.body, "Book your rooftop party now.");
}

#[test]
fn parse_campaign_draft_without_marker_falls_back() {
    let draft = parse_campaign_draft("Just a body with no subject line.");
    assert_eq!(draft.subject, "News from Party2Book");
    assert_eq!(draft.body, "Just a body with no subject line.");
}

#[test]
fn parse_campaign_draft_empty_subject_falls_back() {
    let draft = parse_campaign_draft("Subject:\n\nBody text.");
    assert_eq!(draft.subject, "News from Party2Book");
}

#[test]
fn description_prompt_includes_facts_and_amenities() {
    let venue = sample_venue();
    let prompt = description_prompt(&venue, Some("playful"));
    assert!(prompt.contains("The Glasshouse"));
    assert!(prompt.contains("Portland"));
    assert!(prompt.contains("120 guests"));
    assert!(prompt.contains("sound system, bar"));
    assert!(prompt.contains("Tone: playful"));
}

#[test]
fn description_prompt_omits_empty_sections() {
    let mut venue = sample_venue();
    venue.amenities = serde_json::json!([]);
    let prompt = description_prompt(&venue, None);
    assert!(!prompt.contains("Amenities"));
    assert!(!prompt.contains("Tone:"));
}

#[test]
fn image_prompt_defaults_style() {
    let venue = sample_venue();
    let prompt = image_prompt(&venue, None);
    assert!(prompt.contains("editorial interior photography"));
    assert!(prompt.contains("The Glasshouse"));

    let styled = image_prompt(&venue, Some("moody candlelit"));
    assert!(styled.contains("moody candlelit"));
}

#[tokio::test]
async fn fixed_llm_round_trips_through_trait() {
    let llm = FixedLlm { reply: "Subject: Hi\n\nBody".into() };
    let response = llm.complete(64, "system", &[Message::user("x")]).await.unwrap();
    let draft = parse_campaign_draft(&response.text);
    assert_eq!(draft.subject, "Hi");
    assert_eq!(draft.body, "Body");
}
