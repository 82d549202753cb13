//! Seams to the external vision providers.
//!
//! Production clients live in [`super::vision`] and [`super::graph`]; tests
//! substitute in-memory fakes.

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::models::face::FaceAnnotation;

/// Face-detection service returning per-face expression likelihoods.
#[async_trait]
pub trait FaceDetectionProvider: Send + Sync {
    /// Annotations ordered by prominence; empty when no face was found.
    async fn detect(&self, image: &[u8]) -> Result<Vec<FaceAnnotation>, ProviderError>;
}

/// Social-graph service hosting the asynchronous recognition pipeline.
#[async_trait]
pub trait IdentityGraphProvider: Send + Sync {
    /// Upload a photo and return its provider-side identifier.
    async fn upload(&self, image: &[u8]) -> Result<String, ProviderError>;

    /// Raw recognition response body for the photo, anti-hijacking prefix
    /// included.
    async fn query(&self, photo_id: &str) -> Result<String, ProviderError>;

    /// Delete the uploaded photo. `Ok(false)` means the provider answered but
    /// refused.
    async fn delete(&self, photo_id: &str) -> Result<bool, ProviderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to parse provider response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("provider rejected the request: {0}")]
    Rejected(String),
}

impl ProviderError {
    /// Errors that retrying cannot fix (bad credentials, explicit rejection).
    pub fn is_fatal(&self) -> bool {
        match self {
            ProviderError::Status { status, .. } => {
                *status == StatusCode::UNAUTHORIZED || *status == StatusCode::FORBIDDEN
            }
            ProviderError::Rejected(_) => true,
            ProviderError::Http(_) | ProviderError::Parse(_) => false,
        }
    }

    /// Turn a non-success response into a `Status` error, keeping the body
    /// for the log.
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        ProviderError::Status { status, body }
    }
}
