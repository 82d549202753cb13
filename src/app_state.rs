use std::sync::Arc;
use std::time::Duration;

use crate::services::{
    emotion::EmotionService,
    poller::{RecognitionPoller, RetryPolicy},
    provider::{FaceDetectionProvider, IdentityGraphProvider},
};

/// Per-request limits and retry settings.
#[derive(Debug, Clone, Copy)]
pub struct ServiceSettings {
    pub retry: RetryPolicy,
    pub recognition_timeout: Duration,
    pub max_upload_bytes: usize,
}

/// Shared application state passed to all route handlers.
///
/// Holds no per-request data: every request owns its image buffer and its
/// recognition job.
#[derive(Clone)]
pub struct AppState {
    pub emotion: Arc<EmotionService>,
    pub recognition: Arc<RecognitionPoller>,
    /// Client for fetching images by URL.
    pub http: reqwest::Client,
    pub settings: ServiceSettings,
}

impl AppState {
    pub fn new(
        detector: Arc<dyn FaceDetectionProvider>,
        graph: Arc<dyn IdentityGraphProvider>,
        http: reqwest::Client,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            emotion: Arc::new(EmotionService::new(detector)),
            recognition: Arc::new(RecognitionPoller::new(graph, settings.retry)),
            http,
            settings,
        }
    }
}
