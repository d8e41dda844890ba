//! Image generation — venue hero images via the OpenAI Images API.
//!
//! DESIGN
//! ======
//! Same shape as the LLM adapter: typed env config, a thin HTTP wrapper,
//! pure response parsing, and a trait so the marketing service can be
//! tested against a mock. The provider is asked for a hosted URL; the
//! upload service downloads and stores the bytes itself.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_IMAGE_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";
pub const DEFAULT_IMAGE_SIZE: &str = "1024x1024";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 180;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ImageGenError {
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },
    #[error("API request failed: {0}")]
    ApiRequest(String),
    #[error("API response error: status {status}")]
    ApiResponse { status: u16, body: String },
    #[error("API response parse failed: {0}")]
    ApiParse(String),
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

// =============================================================================
// TRAIT
// =============================================================================

/// A generated image, referenced by provider-hosted URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub url: String,
}

/// Provider-neutral async trait for image generation. Enables mocking.
#[async_trait::async_trait]
pub trait ImageGen: Send + Sync {
    /// Generate one image for the prompt.
    ///
    /// # Errors
    ///
    /// Returns an [`ImageGenError`] if the request fails or the response
    /// carries no image.
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, ImageGenError>;
}

// =============================================================================
// OPENAI CLIENT
// =============================================================================

pub struct OpenAiImageClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    size: String,
}

impl OpenAiImageClient {
    /// Build an image client from environment variables.
    ///
    /// Required:
    /// - `IMAGEGEN_API_KEY_ENV` (names the env var containing the key)
    ///
    /// Optional:
    /// - `IMAGEGEN_BASE_URL`, `IMAGEGEN_MODEL`, `IMAGEGEN_SIZE`
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing or the HTTP client fails.
    pub fn from_env() -> Result<Self, ImageGenError> {
        let key_var = std::env::var("IMAGEGEN_API_KEY_ENV")
            .map_err(|_| ImageGenError::MissingApiKey { var: "IMAGEGEN_API_KEY_ENV".into() })?;
        let api_key = std::env::var(&key_var).map_err(|_| ImageGenError::MissingApiKey { var: key_var.clone() })?;

        let base_url = std::env::var("IMAGEGEN_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_IMAGE_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let model = std::env::var("IMAGEGEN_MODEL").unwrap_or_else(|_| DEFAULT_IMAGE_MODEL.to_string());
        let size = std::env::var("IMAGEGEN_SIZE").unwrap_or_else(|_| DEFAULT_IMAGE_SIZE.to_string());

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ImageGenError::HttpClientBuild(e.to_string()))?;

        Ok(Self { http, api_key, base_url, model, size })
    }
}

#[async_trait::async_trait]
impl ImageGen for OpenAiImageClient {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, ImageGenError> {
        let body = ApiRequest {
            model: &self.model,
            prompt,
            n: 1,
            size: &self.size,
            response_format: "url",
        };

        let response = self
            .http
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ImageGenError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ImageGenError::ApiRequest(e.to_string()))?;

        if status != 200 {
            return Err(ImageGenError::ApiResponse { status, body: text });
        }

        parse_response(&text)
    }
}

// =============================================================================
// WIRE TYPES / PARSING
// =============================================================================

#[derive(serde::Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,
    response_format: &'a str,
}

#[derive(serde::Deserialize)]
struct ApiResponse {
    data: Vec<ImageDatum>,
}

#[derive(serde::Deserialize)]
struct ImageDatum {
    url: Option<String>,
}

fn parse_response(json: &str) -> Result<GeneratedImage, ImageGenError> {
    let api: ApiResponse = serde_json::from_str(json).map_err(|e| ImageGenError::ApiParse(e.to_string()))?;

    api.data
        .into_iter()
        .find_map(|d| d.url)
        .map(|url| GeneratedImage { url })
        .ok_or_else(|| ImageGenError::ApiParse("response contained no image url".into()))
}

#[cfg(test)]
#[path = "imagegen_test.rs"]
mod tests;
