use garde::Validate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Six-rank expression likelihood as reported by the face-detection provider.
///
/// Variant order matters: `rank()` is the ordinal used by the classifier.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    EnumString, Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Likelihood {
    #[default]
    Unknown,
    VeryUnlikely,
    Unlikely,
    Possible,
    Likely,
    VeryLikely,
}

impl Likelihood {
    pub const ALL: [Likelihood; 6] = [
        Likelihood::Unknown,
        Likelihood::VeryUnlikely,
        Likelihood::Unlikely,
        Likelihood::Possible,
        Likelihood::Likely,
        Likelihood::VeryLikely,
    ];

    /// Ordinal rank, 0 (`Unknown`) through 5 (`VeryLikely`).
    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn from_rank(rank: u8) -> Option<Self> {
        Self::ALL.get(usize::from(rank)).copied()
    }
}

/// Expression likelihoods for one detected face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FaceAnnotation {
    #[garde(skip)]
    #[serde(default)]
    pub joy_likelihood: Likelihood,

    #[garde(skip)]
    #[serde(default)]
    pub anger_likelihood: Likelihood,

    #[garde(skip)]
    #[serde(default)]
    pub sorrow_likelihood: Likelihood,

    /// Overall detection confidence in [0, 1].
    #[garde(range(min = 0.0, max = 1.0))]
    #[serde(default)]
    pub detection_confidence: f32,
}

impl FaceAnnotation {
    pub fn new(
        joy: Likelihood,
        anger: Likelihood,
        sorrow: Likelihood,
        detection_confidence: f32,
    ) -> Self {
        Self {
            joy_likelihood: joy,
            anger_likelihood: anger,
            sorrow_likelihood: sorrow,
            detection_confidence,
        }
    }

    /// Detection confidence scaled to 0–100.
    pub fn confidence_percent(&self) -> f64 {
        f64::from(self.detection_confidence * 100.0)
    }
}

/// Categorical emotion derived from the primary face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EmotionLabel {
    Happy,
    Angry,
    Sad,
    Neutral,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_confidence_percent_scales_in_single_precision() {
        let face = |c| FaceAnnotation::new(Likelihood::Unknown, Likelihood::Unknown, Likelihood::Unknown, c);

        // One f32 step above 0.65 still lands on 65 exactly
        assert_eq!(face(0.650_000_04).confidence_percent(), 65.0);
        assert_eq!(face(0.8).confidence_percent(), 80.0);
        assert_eq!(face(1.0).confidence_percent(), 100.0);
    }

    #[test]
    fn test_rank_order() {
        let ranks: Vec<u8> = Likelihood::ALL.iter().map(|l| l.rank()).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(Likelihood::from_rank(4), Some(Likelihood::Likely));
        assert_eq!(Likelihood::from_rank(6), None);
    }

    #[test]
    fn test_annotation_from_provider_json() {
        let json = r#"{
            "detectionConfidence": 0.93,
            "joyLikelihood": "VERY_LIKELY",
            "angerLikelihood": "VERY_UNLIKELY",
            "surpriseLikelihood": "UNLIKELY"
        }"#;
        let face: FaceAnnotation = serde_json::from_str(json).unwrap();
        assert_eq!(face.joy_likelihood, Likelihood::VeryLikely);
        assert_eq!(face.anger_likelihood, Likelihood::VeryUnlikely);
        // Missing field falls back to Unknown
        assert_eq!(face.sorrow_likelihood, Likelihood::Unknown);
    }

    #[test]
    fn test_confidence_range_validation() {
        let ok = FaceAnnotation::new(Likelihood::Likely, Likelihood::Unknown, Likelihood::Unknown, 0.5);
        assert!(ok.validate().is_ok());

        let bad = FaceAnnotation::new(Likelihood::Likely, Likelihood::Unknown, Likelihood::Unknown, 1.5);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_label_strings() {
        assert_eq!(EmotionLabel::Happy.to_string(), "happy");
        assert_eq!(EmotionLabel::from_str("neutral").unwrap(), EmotionLabel::Neutral);
        assert_eq!(serde_json::to_string(&EmotionLabel::Sad).unwrap(), "\"sad\"");
    }
}
