//! Marketing service — LLM copywriting and image generation for vendors.
//!
//! DESIGN
//! ======
//! Every call is vendor-gated, rate-limited, and priced into the token
//! budget before the provider is hit. The LLM only ever receives structured
//! venue facts the vendor already owns; prompts are assembled server-side.

use tracing::info;
use uuid::Uuid;

use crate::imagegen::{ImageGen, ImageGenError};
use crate::llm::types::{LlmError, Message};
use crate::llm::LlmChat;
use crate::rate_limit::RateLimitError;
use crate::services::upload::{self, UploadError};
use crate::services::venue::{self, VenueError, VenueRow};
use crate::state::AppState;

const DEFAULT_MARKETING_MAX_TOKENS: u32 = 1024;

const DESCRIPTION_SYSTEM_PROMPT: &str = "You write listing descriptions for an event-venue marketplace. \
     Write 2-3 short paragraphs of warm, concrete copy. No headings, no bullet points, \
     no invented amenities; only use the facts provided.";

const CAMPAIGN_SYSTEM_PROMPT: &str = "You write marketing emails for an event-venue marketplace. \
     Reply with a subject line on the first line in the form 'Subject: ...', then a blank \
     line, then the email body in plain text.";

fn marketing_max_tokens() -> u32 {
    std::env::var("MARKETING_MAX_TOKENS")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(DEFAULT_MARKETING_MAX_TOKENS)
}

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum MarketingError {
    #[error("LLM not configured")]
    LlmNotConfigured,
    #[error("image generation not configured")]
    ImageGenNotConfigured,
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error(transparent)]
    ImageGen(#[from] ImageGenError),
    #[error(transparent)]
    Venue(#[from] VenueError),
    #[error(transparent)]
    Upload(#[from] UploadError),
}

impl From<RateLimitError> for MarketingError {
    fn from(e: RateLimitError) -> Self {
        Self::RateLimited(e.to_string())
    }
}

/// Inputs for a campaign email draft.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CampaignBrief {
    pub theme: String,
    pub audience: Option<String>,
    pub promo_code: Option<String>,
}

/// A drafted campaign email.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CampaignDraft {
    pub subject: String,
    pub body: String,
}

// =============================================================================
// COPYWRITING
// =============================================================================

/// Draft a listing description for an owned venue.
pub async fn draft_venue_description(
    state: &AppState,
    user_id: Uuid,
    venue_id: Uuid,
    tone: Option<&str>,
) -> Result<String, MarketingError> {
    let venue = venue::ensure_owner(&state.pool, venue_id, user_id).await?;
    let llm = state.llm.as_ref().ok_or(MarketingError::LlmNotConfigured)?;

    state.rate_limiter.check_and_record(user_id)?;

    let prompt = description_prompt(&venue, tone);
    let response = llm
        .complete(marketing_max_tokens(), DESCRIPTION_SYSTEM_PROMPT, &[Message::user(prompt)])
        .await?;
    state.rate_limiter.record_tokens(user_id, response.total_tokens());

    info!(%venue_id, tokens = response.total_tokens(), "venue description drafted");
    Ok(response.text.trim().to_owned())
}

fn description_prompt(venue: &VenueRow, tone: Option<&str>) -> String {
    let amenities = venue
        .amenities
        .as_array()
        .map(|a| {
            a.iter()
                .filter_map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();

    let mut prompt = format!(
        "Venue facts:\n- Name: {}\n- City: {}\n- Category: {}\n- Capacity: {} guests\n- Hourly rate: {} {}",
        venue.title, venue.city, venue.category, venue.capacity, venue.hourly_rate, venue.currency
    );
    if !amenities.is_empty() {
        prompt.push_str(&format!("\n- Amenities: {amenities}"));
    }
    if let Some(tone) = tone.filter(|t| !t.trim().is_empty()) {
        prompt.push_str(&format!("\n\nTone: {tone}"));
    }
    prompt
}

/// Draft a campaign email from a vendor's brief.
pub async fn draft_campaign(
    state: &AppState,
    user_id: Uuid,
    brief: &CampaignBrief,
) -> Result<CampaignDraft, MarketingError> {
    venue::require_vendor(&state.pool, user_id).await?;
    let llm = state.llm.as_ref().ok_or(MarketingError::LlmNotConfigured)?;

    state.rate_limiter.check_and_record(user_id)?;

    let mut prompt = format!("Campaign theme: {}", brief.theme);
    if let Some(audience) = brief.audience.as_deref().filter(|a| !a.trim().is_empty()) {
        prompt.push_str(&format!("\nAudience: {audience}"));
    }
    if let Some(code) = brief.promo_code.as_deref().filter(|c| !c.trim().is_empty()) {
        prompt.push_str(&format!("\nMention the promo code {code} prominently."));
    }

    let response = llm
        .complete(marketing_max_tokens(), CAMPAIGN_SYSTEM_PROMPT, &[Message::user(prompt)])
        .await?;
    state.rate_limiter.record_tokens(user_id, response.total_tokens());

    Ok(parse_campaign_draft(&response.text))
}

/// Split a `Subject: ...` first line from the body; drafts without the
/// marker become body-only with a fallback subject.
#[must_use]
pub fn parse_campaign_draft(text: &str) -> CampaignDraft {
    let trimmed = text.trim();
    if let Some(rest) = trimmed.strip_prefix("Subject:") {
        let mut lines = rest.splitn(2, '\n');
        let subject = lines.next().unwrap_or_default().trim().to_owned();
        let body = lines.next().unwrap_or_default().trim().to_owned();
        if !subject.is_empty() {
            return CampaignDraft { subject, body };
        }
    }
    CampaignDraft { subject: "News from Party2Book".to_owned(), body: trimmed.to_owned() }
}

// =============================================================================
// IMAGE GENERATION
// =============================================================================

/// Generate a hero image for an owned venue, store it locally, and attach
/// it to the venue's gallery. Returns the public photo path.
pub async fn generate_venue_image(
    state: &AppState,
    user_id: Uuid,
    venue_id: Uuid,
    style: Option<&str>,
) -> Result<String, MarketingError> {
    let venue = venue::ensure_owner(&state.pool, venue_id, user_id).await?;
    let imagegen = state
        .imagegen
        .as_ref()
        .ok_or(MarketingError::ImageGenNotConfigured)?;

    state.rate_limiter.check_and_record(user_id)?;

    let prompt = image_prompt(&venue, style);
    let generated = imagegen.generate(&prompt).await?;
    let stored = upload::store_remote_image(&state.uploads_dir, &generated.url).await?;
    venue::add_photo(&state.pool, venue_id, user_id, &stored.url_path).await?;

    info!(%venue_id, photo = %stored.url_path, "generated venue image attached");
    Ok(stored.url_path)
}

fn image_prompt(venue: &VenueRow, style: Option<&str>) -> String {
    let style = style
        .filter(|s| !s.trim().is_empty())
        .unwrap_or("bright, editorial interior photography");
    format!(
        "A {style} photo of \"{}\", a {} venue in {} that hosts up to {} guests. No people, no text overlays.",
        venue.title, venue.category, venue.city, venue.capacity
    )
}

// =============================================================================
// TEST SUPPORT
// =============================================================================

/// Mock LLM returning a fixed response; shared by marketing tests.
#[cfg(test)]
pub struct FixedLlm {
    pub reply: String,
}

#[cfg(test)]
#[async_trait::async_trait]
impl LlmChat for FixedLlm {
    async fn complete(
        &self,
        _max_tokens: u32,
        _system: &str,
        _messages: &[Message],
    ) -> Result<crate::llm::types::ChatResponse, LlmError> {
        Ok(crate::llm::types::ChatResponse {
            text: self.reply.clone(),
            model: "mock".into(),
            stop_reason: "end_turn".into(),
            input_tokens: 10,
            output_tokens: 20,
        })
    }
}

#[cfg(test)]
#[path = "marketing_test.rs"]
mod tests;
