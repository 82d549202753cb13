use async_trait::async_trait;
use reqwest::{multipart, Client};
use serde::Deserialize;
use serde_json::Value;

use crate::models::person::PersonRecord;
use crate::services::provider::{IdentityGraphProvider, ProviderError};

/// Literal the recognition endpoint prepends to its JSON to stop it being
/// executed as a script.
pub const ANTI_HIJACK_PREFIX: &str = "for (;;);";

/// Client for the social-graph photo and recognition endpoints.
pub struct GraphClient {
    http: Client,
    base_url: String,
    recognition_url: String,
    access_token: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    id: Value,
}

#[derive(Deserialize)]
struct DeleteResponse {
    success: Option<bool>,
}

#[derive(Deserialize)]
struct RecognitionEnvelope {
    #[serde(default)]
    payload: Value,
}

impl GraphClient {
    pub fn new(
        http: Client,
        base_url: String,
        recognition_url: String,
        access_token: String,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            recognition_url,
            access_token,
        }
    }
}

#[async_trait]
impl IdentityGraphProvider for GraphClient {
    async fn upload(&self, image: &[u8]) -> Result<String, ProviderError> {
        let url = format!("{}/me/photos", self.base_url);

        let part = multipart::Part::bytes(image.to_vec())
            .file_name("upload.jpg")
            .mime_str("image/jpeg")?;
        let form = multipart::Form::new()
            .part("source", part)
            .text("published", "false");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::from_response(response).await);
        }

        let upload: UploadResponse = serde_json::from_str(&response.text().await?)?;
        id_to_string(upload.id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ProviderError::Rejected("upload response carried no photo id".into()))
    }

    async fn query(&self, photo_id: &str) -> Result<String, ProviderError> {
        let response = self
            .http
            .get(&self.recognition_url)
            .bearer_auth(&self.access_token)
            .query(&[("photo_id", photo_id)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::from_response(response).await);
        }

        Ok(response.text().await?)
    }

    async fn delete(&self, photo_id: &str) -> Result<bool, ProviderError> {
        let url = format!("{}/{}", self.base_url, photo_id);

        let response = self
            .http
            .delete(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::from_response(response).await);
        }

        let body = response.text().await?;
        Ok(parse_delete_response(&body))
    }
}

/// Remove the anti-hijacking prefix, if present.
pub fn strip_hijack_prefix(body: &str) -> &str {
    let trimmed = body.trim_start();
    trimmed.strip_prefix(ANTI_HIJACK_PREFIX).unwrap_or(trimmed)
}

/// Extract the recognised person from a raw recognition response.
///
/// `Ok(None)` while the pipeline has produced no face boxes yet. Once a face
/// box exists the person is resolved; any nested field that is missing,
/// null or of the wrong type reads as an empty string.
pub fn parse_recognition(body: &str) -> Result<Option<PersonRecord>, serde_json::Error> {
    let envelope: RecognitionEnvelope = serde_json::from_str(strip_hijack_prefix(body))?;

    // `payload` is normally a list, but single objects show up too.
    let payload = match &envelope.payload {
        Value::Array(payloads) => payloads.first(),
        object @ Value::Object(_) => Some(object),
        _ => None,
    };

    let Some(facebox) = payload
        .and_then(|p| p.get("faceboxes"))
        .and_then(Value::as_array)
        .and_then(|boxes| boxes.first())
    else {
        return Ok(None);
    };

    let user = facebox.pointer("/recognitions/0/user");
    let name = user
        .and_then(|u| u.get("name"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let external_id = user
        .and_then(|u| u.get("fbid"))
        .cloned()
        .and_then(id_to_string)
        .unwrap_or_default();

    Ok(Some(PersonRecord { name, external_id }))
}

fn parse_delete_response(body: &str) -> bool {
    match serde_json::from_str::<DeleteResponse>(body) {
        Ok(DeleteResponse { success: Some(success) }) => success,
        // Non-JSON or success-less body on a 2xx status
        _ => true,
    }
}

/// Identifiers arrive as strings or bare numbers.
fn id_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
