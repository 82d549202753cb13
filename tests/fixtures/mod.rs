//! Canned provider payloads shared by the integration tests

#![allow(dead_code)]

use face_mood::models::face::{FaceAnnotation, Likelihood};

/// Smallest byte string `image::guess_format` accepts as a PNG.
pub const PNG_BYTES: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D', b'R',
];

/// Recognition pipeline still working: no face boxes yet.
pub const NOT_READY: &str = r#"for (;;);{"__ar":1,"payload":[{"faceboxes":[]}]}"#;

/// Recognition pipeline found a face but matched nobody.
pub const EMPTY_MATCH: &str = r#"for (;;);{"__ar":1,"payload":[{"faceboxes":[{"recognitions":[]}]}]}"#;

/// Face box present, nested fields nulled out.
pub const NULL_RECOGNITIONS: &str = r#"for (;;);{"payload":[{"faceboxes":[{"recognitions":null}]}]}"#;

/// Face box with a user whose fields are null.
pub const NULL_USER_FIELDS: &str =
    r#"for (;;);{"payload":[{"faceboxes":[{"recognitions":[{"user":{"fbid":null,"name":null}}]}]}]}"#;

/// Not JSON at all, as returned by a misbehaving proxy.
pub const GARBAGE: &str = "<html><body>502 Bad Gateway</body></html>";

/// Recognition pipeline matched a named user.
pub fn named_match(name: &str, fbid: &str) -> String {
    format!(
        r#"for (;;);{{"__ar":1,"payload":[{{"faceboxes":[{{"recognitions":[{{"certainty":0.98,"user":{{"fbid":"{fbid}","name":"{name}"}}}}]}}]}}]}}"#
    )
}

/// A face with the given likelihood ranks (0–5) and detection confidence.
pub fn face(joy: u8, anger: u8, sorrow: u8, confidence: f32) -> FaceAnnotation {
    FaceAnnotation::new(
        Likelihood::from_rank(joy).expect("joy rank"),
        Likelihood::from_rank(anger).expect("anger rank"),
        Likelihood::from_rank(sorrow).expect("sorrow rank"),
        confidence,
    )
}
