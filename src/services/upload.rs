//! Upload service — stores files on local disk, served back at `/uploads`.
//!
//! DESIGN
//! ======
//! Stored names are fresh UUIDs plus a whitelisted extension; the original
//! filename never touches the filesystem. The same storage path handles
//! direct multipart uploads and images fetched back from the generation
//! provider.

use std::path::{Path, PathBuf};
use std::time::Duration;

use uuid::Uuid;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];
const FETCH_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("file exceeds the {limit} byte upload limit")]
    TooLarge { limit: usize },
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A stored file and the public path it is served from.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StoredFile {
    pub file_name: String,
    pub url_path: String,
}

pub(crate) fn max_upload_bytes() -> usize {
    std::env::var("UPLOAD_MAX_BYTES")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
}

/// Lowercased extension of a client-supplied filename, if it has one.
#[must_use]
pub fn file_extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// Extension for an image content type, e.g. `image/png` → `png`.
#[must_use]
pub fn ext_for_content_type(content_type: &str) -> Option<&'static str> {
    match content_type.split(';').next().unwrap_or("").trim() {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

fn check_bytes(bytes: &[u8]) -> Result<(), UploadError> {
    let limit = max_upload_bytes();
    if bytes.len() > limit {
        return Err(UploadError::TooLarge { limit });
    }
    Ok(())
}

/// Persist an uploaded file under a fresh UUID name.
pub async fn save_bytes(uploads_dir: &Path, original_name: &str, bytes: &[u8]) -> Result<StoredFile, UploadError> {
    check_bytes(bytes)?;
    let ext = file_extension(original_name)
        .filter(|e| ALLOWED_EXTENSIONS.contains(&e.as_str()))
        .ok_or_else(|| UploadError::UnsupportedType(original_name.to_owned()))?;

    save_with_extension(uploads_dir, &ext, bytes).await
}

async fn save_with_extension(uploads_dir: &Path, ext: &str, bytes: &[u8]) -> Result<StoredFile, UploadError> {
    tokio::fs::create_dir_all(uploads_dir).await?;
    let file_name = format!("{}.{ext}", Uuid::new_v4());
    let path: PathBuf = uploads_dir.join(&file_name);
    tokio::fs::write(&path, bytes).await?;

    tracing::info!(%file_name, size = bytes.len(), "file stored");
    Ok(StoredFile { url_path: format!("/uploads/{file_name}"), file_name })
}

/// Download a provider-hosted image and store it locally so the listing
/// keeps working after the provider URL expires.
pub async fn store_remote_image(uploads_dir: &Path, url: &str) -> Result<StoredFile, UploadError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .build()
        .map_err(|e| UploadError::Fetch(e.to_string()))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| UploadError::Fetch(e.to_string()))?;
    if !response.status().is_success() {
        return Err(UploadError::Fetch(format!("status {}", response.status())));
    }

    let ext = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(ext_for_content_type)
        .unwrap_or("png");

    let bytes = response
        .bytes()
        .await
        .map_err(|e| UploadError::Fetch(e.to_string()))?;
    check_bytes(&bytes)?;

    save_with_extension(uploads_dir, ext, &bytes).await
}

#[cfg(test)]
#[path = "upload_test.rs"]
mod tests;
