use garde::Validate;

use crate::models::face::{EmotionLabel, FaceAnnotation};

/// Confidence (0–100, exclusive) above which the threshold drops to 2.
const MID_CONFIDENCE: f64 = 65.0;

/// Confidence (0–100, inclusive) from which the threshold drops to 1.
const HIGH_CONFIDENCE: f64 = 80.0;

/// Minimum ordinal a likelihood must reach to win a label.
///
/// Confident detections lower the bar. Otherwise the bar sits one rank above
/// the truncated mean of the three scores.
pub fn threshold(joy: u8, anger: u8, sorrow: u8, confidence_percent: f64) -> u8 {
    if confidence_percent > MID_CONFIDENCE && confidence_percent < HIGH_CONFIDENCE {
        2
    } else if confidence_percent >= HIGH_CONFIDENCE {
        1
    } else {
        // Integer division truncates.
        (joy + anger + sorrow) / 3 + 1
    }
}

/// Pick a label for ordinal scores against a threshold.
///
/// Candidates are checked joy, anger, sorrow; the first one at or above the
/// threshold and not below either other score wins, so ties go to the
/// earlier candidate.
pub fn select_label(joy: u8, anger: u8, sorrow: u8, threshold: u8) -> EmotionLabel {
    if joy >= threshold && joy >= anger && joy >= sorrow {
        EmotionLabel::Happy
    } else if anger >= threshold && anger >= joy && anger >= sorrow {
        EmotionLabel::Angry
    } else if sorrow >= threshold && sorrow >= joy && sorrow >= anger {
        EmotionLabel::Sad
    } else {
        EmotionLabel::Neutral
    }
}

/// Classify the primary (first) face.
///
/// Callers are expected to handle the no-face case before calling; an empty
/// slice is rejected as invalid input.
pub fn classify(annotations: &[FaceAnnotation]) -> Result<EmotionLabel, ClassifyError> {
    let face = annotations.first().ok_or(ClassifyError::NoAnnotations)?;

    if face.detection_confidence.is_nan() {
        return Err(ClassifyError::NanConfidence);
    }
    face.validate().map_err(ClassifyError::InvalidAnnotation)?;

    let joy = face.joy_likelihood.rank();
    let anger = face.anger_likelihood.rank();
    let sorrow = face.sorrow_likelihood.rank();
    let threshold = threshold(joy, anger, sorrow, face.confidence_percent());

    let label = select_label(joy, anger, sorrow, threshold);

    tracing::debug!(
        faces = annotations.len(),
        joy,
        anger,
        sorrow,
        confidence = face.confidence_percent(),
        threshold,
        label = %label,
        "Classified primary face"
    );

    Ok(label)
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("no face annotations to classify")]
    NoAnnotations,

    #[error("detection confidence is NaN")]
    NanConfidence,

    #[error("invalid face annotation: {0}")]
    InvalidAnnotation(garde::Report),
}
