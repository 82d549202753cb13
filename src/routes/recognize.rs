use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::models::api::RecognizeResponse;
use crate::routes::read_image_field;

/// POST /api/v1/recognize — Identify the person in an uploaded image.
///
/// The uploaded photo is deleted from the provider before responding. When
/// polling times out, the delete still runs in the background.
pub async fn recognize_person(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<RecognizeResponse>, StatusCode> {
    let image = read_image_field(&mut multipart).await?;
    let request_id = Uuid::new_v4();

    tracing::info!(request_id = %request_id, bytes = image.len(), "Recognition requested");

    // The workflow timeout covers polling only; upload is bounded by the
    // HTTP client timeout.
    let photo_id = match state.recognition.upload(&image).await {
        Ok(photo_id) => photo_id,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Recognition failed");
            return Err(StatusCode::BAD_GATEWAY);
        }
    };

    let recognition = state.recognition.recognize_uploaded(photo_id.clone());
    let report = match tokio::time::timeout(state.settings.recognition_timeout, recognition).await {
        Ok(report) => report,
        Err(_) => {
            tracing::warn!(
                request_id = %request_id,
                photo_id = %photo_id,
                timeout_secs = state.settings.recognition_timeout.as_secs(),
                "Recognition timed out"
            );
            return Err(StatusCode::GATEWAY_TIMEOUT);
        }
    };

    Ok(Json(RecognizeResponse::from_report(request_id, report)))
}
