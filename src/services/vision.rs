use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::models::{CandidateLabel, UploadedImage};

/// How many labels we ask the identifier for.
pub const MAX_LABELS: u32 = 5;

/// Anything that can turn image bytes into ranked text labels.
#[async_trait::async_trait]
pub trait LabelIdentifier: Send + Sync {
    /// Returns up to `max_results` labels, best first.
    async fn identify(&self, image: &UploadedImage, max_results: u32) -> Result<Vec<CandidateLabel>>;
}

#[derive(Debug, Serialize)]
struct AnnotateRequest {
    requests: Vec<ImageRequest>,
}

#[derive(Debug, Serialize)]
struct ImageRequest {
    image: ImageContent,
    features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Debug, Serialize)]
struct Feature {
    #[serde(rename = "type")]
    feature_type: String,
    #[serde(rename = "maxResults")]
    max_results: u32,
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageResponse>,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(rename = "labelAnnotations", default)]
    label_annotations: Vec<LabelAnnotation>,
    error: Option<ApiStatus>,
}

/// Vision may omit `description`; such an entry becomes a blank label.
#[derive(Debug, Deserialize)]
struct LabelAnnotation {
    #[serde(default)]
    description: String,
    #[serde(default)]
    score: f64,
}

impl From<LabelAnnotation> for CandidateLabel {
    fn from(annotation: LabelAnnotation) -> Self {
        CandidateLabel::new(annotation.description, annotation.score)
    }
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// Google Cloud Vision `images:annotate` client, label detection only.
pub struct GoogleVisionClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl GoogleVisionClient {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn annotate_url(&self) -> String {
        format!("{}/v1/images:annotate", self.base_url)
    }
}

#[async_trait::async_trait]
impl LabelIdentifier for GoogleVisionClient {
    async fn identify(&self, image: &UploadedImage, max_results: u32) -> Result<Vec<CandidateLabel>> {
        let content = image.to_base64();
        log::debug!(
            "📊 Image size: {} bytes, base64 payload: {} bytes",
            image.bytes.len(),
            content.len()
        );

        let request = AnnotateRequest {
            requests: vec![ImageRequest {
                image: ImageContent { content },
                features: vec![Feature {
                    feature_type: "LABEL_DETECTION".to_string(),
                    max_results,
                }],
            }],
        };

        log::info!("🔎 Sending label detection request to Vision API");

        let response = self
            .client
            .post(self.annotate_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        log::debug!("📥 Vision API response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await?;
            anyhow::bail!("Vision API error ({}): {}", status, error_text);
        }

        let body: AnnotateResponse = response.json().await?;
        let first = body
            .responses
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Vision API returned no responses"))?;

        if let Some(err) = first.error {
            anyhow::bail!("Vision API image error ({}): {}", err.code, err.message);
        }

        let mut labels: Vec<CandidateLabel> = first
            .label_annotations
            .into_iter()
            .map(CandidateLabel::from)
            .collect();
        labels.sort_by(|a, b| b.score.total_cmp(&a.score));
        labels.truncate(max_results as usize);

        log::info!(
            "🏷️ Vision API labels: {:?}",
            labels.iter().map(|l| l.description.as_str()).collect::<Vec<_>>()
        );

        Ok(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> GoogleVisionClient {
        GoogleVisionClient::new(
            "test_key".to_string(),
            server.base_url(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn jpeg() -> UploadedImage {
        UploadedImage::new(vec![0xFF, 0xD8, 0xFF], Some("image/jpeg".to_string()))
    }

    #[tokio::test]
    async fn test_identify_sends_base64_and_sorts_by_score() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/images:annotate")
                    .query_param("key", "test_key")
                    .json_body(json!({
                        "requests": [{
                            "image": { "content": "/9j/" },
                            "features": [{ "type": "LABEL_DETECTION", "maxResults": 5 }]
                        }]
                    }));
                then.status(200).json_body(json!({
                    "responses": [{
                        "labelAnnotations": [
                            { "description": "fruit", "score": 0.8 },
                            { "description": "banana", "score": 0.98, "mid": "/m/09qck" }
                        ]
                    }]
                }));
            })
            .await;

        let labels = client_for(&server).identify(&jpeg(), MAX_LABELS).await.unwrap();

        mock.assert_async().await;
        assert_eq!(
            labels,
            vec![
                CandidateLabel::new("banana", 0.98),
                CandidateLabel::new("fruit", 0.8)
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_annotations_means_no_labels() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/images:annotate");
                then.status(200).json_body(json!({ "responses": [{}] }));
            })
            .await;

        let labels = client_for(&server).identify(&jpeg(), MAX_LABELS).await.unwrap();
        assert!(labels.is_empty());
    }

    #[tokio::test]
    async fn test_per_image_error_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/images:annotate");
                then.status(200).json_body(json!({
                    "responses": [{ "error": { "code": 3, "message": "Bad image data." } }]
                }));
            })
            .await;

        let err = client_for(&server).identify(&jpeg(), MAX_LABELS).await.unwrap_err();
        assert!(err.to_string().contains("Bad image data."));
    }

    #[tokio::test]
    async fn test_http_failure_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/images:annotate");
                then.status(403).body("API key not valid");
            })
            .await;

        let err = client_for(&server).identify(&jpeg(), MAX_LABELS).await.unwrap_err();
        assert!(err.to_string().contains("403"));
    }

    #[tokio::test]
    async fn test_empty_responses_array_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/images:annotate");
                then.status(200).json_body(json!({ "responses": [] }));
            })
            .await;

        assert!(client_for(&server).identify(&jpeg(), MAX_LABELS).await.is_err());
    }

    #[tokio::test]
    async fn test_annotation_without_description_is_kept_as_blank_label() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/images:annotate");
                then.status(200).json_body(json!({
                    "responses": [{
                        "labelAnnotations": [
                            { "description": "banana", "score": 0.98 },
                            { "mid": "/m/x", "score": 0.5 }
                        ]
                    }]
                }));
            })
            .await;

        let labels = client_for(&server).identify(&jpeg(), MAX_LABELS).await.unwrap();

        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].query(), Some("banana"));
        assert_eq!(labels[1].query(), None);
    }

    #[tokio::test]
    async fn test_top_annotation_without_description_has_no_query() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/images:annotate");
                then.status(200).json_body(json!({
                    "responses": [{
                        "labelAnnotations": [
                            { "description": "banana", "score": 0.6 },
                            { "mid": "/m/x", "score": 0.9 }
                        ]
                    }]
                }));
            })
            .await;

        let labels = client_for(&server).identify(&jpeg(), MAX_LABELS).await.unwrap();

        assert_eq!(labels[0], CandidateLabel::new("", 0.9));
        assert_eq!(labels[0].query(), None);
    }
}
