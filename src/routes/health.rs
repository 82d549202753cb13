use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::app_state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub recognition: RecognitionSettings,
}

#[derive(Serialize)]
pub struct RecognitionSettings {
    pub max_attempts: u32,
    pub interval_ms: u64,
    pub timeout_secs: u64,
}

/// GET /health — liveness and active recognition settings.
///
/// Providers are not pinged.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let policy = state.recognition.policy();

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        recognition: RecognitionSettings {
            max_attempts: policy.max_attempts,
            interval_ms: policy.inter_attempt_delay.as_millis() as u64,
            timeout_secs: state.settings.recognition_timeout.as_secs(),
        },
    })
}
