use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use garde::Validate;

use crate::app_state::AppState;
use crate::models::api::{EmotionResponse, EmotionUrlRequest};
use crate::routes::read_image_field;
use crate::services::image_source::{self, FetchError};

/// POST /api/v1/emotion — Classify the primary face in an uploaded image.
pub async fn detect_emotion(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<EmotionResponse>, StatusCode> {
    let image = read_image_field(&mut multipart).await?;
    classify_image(&state, &image).await
}

/// POST /api/v1/emotion/url — Fetch an image by URL and classify it.
pub async fn detect_emotion_from_url(
    State(state): State<AppState>,
    Json(request): Json<EmotionUrlRequest>,
) -> Result<Json<EmotionResponse>, StatusCode> {
    request.validate().map_err(|_| StatusCode::BAD_REQUEST)?;

    let image = image_source::fetch_image(&state.http, &request.url, state.settings.max_upload_bytes)
        .await
        .map_err(|e| {
            tracing::warn!(url = %request.url, error = %e, "Image fetch failed");
            match e {
                FetchError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
                FetchError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                FetchError::UnsupportedFormat => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                FetchError::Http(_) => StatusCode::BAD_GATEWAY,
            }
        })?;

    classify_image(&state, &image).await
}

async fn classify_image(state: &AppState, image: &[u8]) -> Result<Json<EmotionResponse>, StatusCode> {
    match state.emotion.detect_emotion(image).await {
        Ok(outcome) => Ok(Json(outcome.into())),
        Err(e) => {
            tracing::error!(error = %e, "Emotion detection failed");
            Err(StatusCode::BAD_GATEWAY)
        }
    }
}
