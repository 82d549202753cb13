use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::face::EmotionLabel;
use crate::models::person::{PersonRecord, Resolution};
use crate::services::emotion::EmotionOutcome;
use crate::services::poller::{CleanupStatus, RecognitionReport};

/// Request to classify an image fetched from a URL.
#[derive(Debug, Deserialize, Validate)]
pub struct EmotionUrlRequest {
    #[garde(length(min = 1, max = 2048))]
    pub url: String,
}

/// Response for the emotion endpoints.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct EmotionResponse {
    pub face_detected: bool,
    pub faces: usize,
    pub emotion: Option<EmotionLabel>,
    /// Primary face detection confidence, 0–100.
    pub confidence: Option<f64>,
}

impl From<EmotionOutcome> for EmotionResponse {
    fn from(outcome: EmotionOutcome) -> Self {
        match outcome {
            EmotionOutcome::Detected {
                label,
                faces,
                confidence,
            } => Self {
                face_detected: true,
                faces,
                emotion: Some(label),
                confidence: Some(confidence),
            },
            EmotionOutcome::NoFaceDetected => Self {
                face_detected: false,
                faces: 0,
                emotion: None,
                confidence: None,
            },
        }
    }
}

/// Response for the recognition endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct RecognizeResponse {
    pub request_id: Uuid,
    pub photo_id: String,
    /// "resolved", "unresolved" or "failed"
    pub status: String,
    pub person: Option<PersonRecord>,
    pub attempts: u32,
    pub error: Option<String>,
    pub cleanup: CleanupResponse,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CleanupResponse {
    pub deleted: bool,
    pub error: Option<String>,
}

impl RecognizeResponse {
    pub fn from_report(request_id: Uuid, report: RecognitionReport) -> Self {
        let status = report.status().to_string();

        let (person, error) = match report.outcome {
            Ok(Resolution::Resolved(person)) => (Some(person), None),
            Ok(Resolution::Unresolved) => (None, None),
            Err(e) => (None, Some(e.to_string())),
        };

        let cleanup = match report.cleanup {
            CleanupStatus::Deleted => CleanupResponse {
                deleted: true,
                error: None,
            },
            CleanupStatus::Failed { reason } => CleanupResponse {
                deleted: false,
                error: Some(reason),
            },
        };

        Self {
            request_id,
            photo_id: report.photo_id,
            status,
            person,
            attempts: report.attempts,
            error,
            cleanup,
            completed_at: Utc::now(),
        }
    }
}
