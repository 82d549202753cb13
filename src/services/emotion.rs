use std::sync::Arc;

use tracing::info;

use crate::models::face::EmotionLabel;
use crate::services::classifier::{self, ClassifyError};
use crate::services::provider::{FaceDetectionProvider, ProviderError};

/// What the classification flow tells its caller.
#[derive(Debug, Clone, PartialEq)]
pub enum EmotionOutcome {
    Detected {
        label: EmotionLabel,
        faces: usize,
        /// Primary face detection confidence, 0–100.
        confidence: f64,
    },
    NoFaceDetected,
}

/// Face detection followed by classification of the primary face.
pub struct EmotionService {
    detector: Arc<dyn FaceDetectionProvider>,
}

impl EmotionService {
    pub fn new(detector: Arc<dyn FaceDetectionProvider>) -> Self {
        Self { detector }
    }

    pub async fn detect_emotion(&self, image: &[u8]) -> Result<EmotionOutcome, EmotionError> {
        let start = std::time::Instant::now();
        let annotations = self.detector.detect(image).await?;

        let Some(primary) = annotations.first() else {
            info!(detect_ms = start.elapsed().as_millis(), "No faces found");
            metrics::counter!("emotion_no_face_total").increment(1);
            return Ok(EmotionOutcome::NoFaceDetected);
        };

        let confidence = primary.confidence_percent();
        let label = classifier::classify(&annotations)?;

        info!(
            detect_ms = start.elapsed().as_millis(),
            faces = annotations.len(),
            confidence,
            label = %label,
            "Emotion classified"
        );
        metrics::counter!("emotion_classifications_total", "label" => label.to_string()).increment(1);

        Ok(EmotionOutcome::Detected {
            label,
            faces: annotations.len(),
            confidence,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EmotionError {
    #[error("face detection failed: {0}")]
    Detection(#[from] ProviderError),

    #[error("provider returned an unusable annotation: {0}")]
    Classify(#[from] ClassifyError),
}
