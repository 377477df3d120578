use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::Path;

use crate::models::{AnalysisResult, UploadedImage};

pub const GENERIC_ANALYSIS_ERROR: &str = "Analysis failed. Please try again.";

/// Why a submit failed. `Display` is the text shown to the user.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ClientError {
    #[error("Could not reach the server: {0}")]
    Unreachable(String),

    /// The server's own `{ error }` message, passed through untouched.
    #[error("{0}")]
    Server(String),

    #[error("{}", GENERIC_ANALYSIS_ERROR)]
    UnexpectedResponse,

    #[error("Could not prepare the upload: {0}")]
    InvalidUpload(String),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Talks to a running NutriSnap server.
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn analyze_url(&self) -> String {
        format!("{}/api/analyze", self.base_url)
    }

    /// Posts the image as multipart field `image`.
    pub async fn submit(&self, image: &UploadedImage) -> Result<AnalysisResult, ClientError> {
        let part = Part::bytes(image.bytes.clone())
            .file_name("upload")
            .mime_str(image.mime_or_default())
            .map_err(|e| ClientError::InvalidUpload(e.to_string()))?;
        let form = Form::new().part("image", part);

        let response = self
            .client
            .post(self.analyze_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                log::error!("❌ Request to {} failed: {}", self.base_url, e);
                ClientError::Unreachable(e.to_string())
            })?;

        let status = response.status();
        log::debug!("📥 Analyze response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(serde_json::from_str::<ErrorBody>(&body)
                .map(|b| ClientError::Server(b.error))
                .unwrap_or(ClientError::UnexpectedResponse));
        }

        response.json::<AnalysisResult>().await.map_err(|e| {
            log::warn!("⚠️ Unreadable analyze response: {}", e);
            ClientError::UnexpectedResponse
        })
    }
}

/// Reads a picture from disk, guessing its type from the extension.
pub fn read_image_file(path: &Path) -> Result<UploadedImage> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let mime_type = match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    };

    Ok(UploadedImage::new(bytes, Some(mime_type.to_string())))
}
