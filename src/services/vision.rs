use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;

use crate::models::face::FaceAnnotation;
use crate::services::provider::{FaceDetectionProvider, ProviderError};

/// Faces requested per image.
const MAX_FACES: u32 = 10;

/// Client for the Google Cloud Vision `images:annotate` REST endpoint.
pub struct VisionClient {
    http: Client,
    endpoint: String,
    api_key: String,
}

#[derive(Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    #[serde(default)]
    face_annotations: Vec<FaceAnnotation>,
    error: Option<AnnotateStatus>,
}

#[derive(Deserialize)]
struct AnnotateStatus {
    #[serde(default)]
    message: String,
}

impl VisionClient {
    pub fn new(http: Client, endpoint: String, api_key: String) -> Self {
        Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl FaceDetectionProvider for VisionClient {
    /// Send an image to Cloud Vision and return its face annotations.
    async fn detect(&self, image: &[u8]) -> Result<Vec<FaceAnnotation>, ProviderError> {
        let url = format!("{}/v1/images:annotate", self.endpoint);

        let request_body = serde_json::json!({
            "requests": [{
                "image": { "content": base64::engine::general_purpose::STANDARD.encode(image) },
                "features": [{ "type": "FACE_DETECTION", "maxResults": MAX_FACES }]
            }]
        });

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::from_response(response).await);
        }

        let body = response.text().await?;
        parse_annotate_response(&body)
    }
}

fn parse_annotate_response(body: &str) -> Result<Vec<FaceAnnotation>, ProviderError> {
    let annotate: AnnotateResponse = serde_json::from_str(body)?;

    match annotate.responses.into_iter().next() {
        Some(AnnotateImageResponse {
            error: Some(status), ..
        }) => Err(ProviderError::Rejected(status.message)),
        Some(image_response) => Ok(image_response.face_annotations),
        None => Ok(Vec::new()),
    }
}
