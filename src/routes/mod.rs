use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::services::image_source;

pub mod emotion;
pub mod health;
pub mod recognize;

/// Headroom for multipart boundaries and headers on top of the image itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// API routes with their middleware stack.
pub fn router(state: AppState) -> Router {
    let body_limit = state.settings.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/v1/emotion", post(emotion::detect_emotion))
        .route("/api/v1/emotion/url", post(emotion::detect_emotion_from_url))
        .route("/api/v1/recognize", post(recognize::recognize_person))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
}

/// Prometheus scrape endpoint, served from the installed recorder's handle.
pub fn metrics_router(handle: Arc<PrometheusHandle>) -> Router {
    Router::new()
        .route("/metrics", get(prometheus_metrics))
        .with_state(handle)
}

async fn prometheus_metrics(State(handle): State<Arc<PrometheusHandle>>) -> String {
    handle.render()
}

/// Pull the `image` field out of a multipart upload and check its format.
pub(crate) async fn read_image_field(multipart: &mut Multipart) -> Result<Bytes, StatusCode> {
    let mut image = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| e.status())? {
        if field.name() == Some("image") {
            let data = field.bytes().await.map_err(|e| e.status())?;
            image_source::sniff_format(&data).map_err(|_| StatusCode::UNSUPPORTED_MEDIA_TYPE)?;
            image = Some(data);
        }
    }

    image.ok_or(StatusCode::BAD_REQUEST)
}
