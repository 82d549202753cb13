use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::EnvFilter;

use face_mood::app_state::AppState;
use face_mood::config::AppConfig;
use face_mood::routes;
use face_mood::services::{graph::GraphClient, vision::VisionClient};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing face-mood server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    metrics::describe_counter!(
        "emotion_classifications_total",
        "Images classified, by emotion label"
    );
    metrics::describe_counter!(
        "emotion_no_face_total",
        "Images in which no face was detected"
    );
    metrics::describe_counter!(
        "recognition_jobs_total",
        "Recognition jobs finished, by outcome"
    );
    metrics::describe_histogram!(
        "recognition_poll_attempts",
        "Recognition queries made per job"
    );
    metrics::describe_counter!(
        "recognition_query_failures_total",
        "Recognition queries that failed and were counted as a miss"
    );
    metrics::describe_counter!(
        "recognition_cleanup_failures_total",
        "Uploaded photos that could not be deleted"
    );

    let http = reqwest::Client::builder()
        .timeout(config.http_timeout())
        .build()
        .expect("Failed to build HTTP client");

    tracing::info!(endpoint = %config.vision_endpoint, "Initializing face detection client");
    let detector = VisionClient::new(
        http.clone(),
        config.vision_endpoint.clone(),
        config.vision_api_key.clone(),
    );

    tracing::info!(base_url = %config.graph_base_url, "Initializing identity graph client");
    let graph = GraphClient::new(
        http.clone(),
        config.graph_base_url.clone(),
        config.recognition_url.clone(),
        config.graph_access_token.clone(),
    );

    let settings = config.service_settings();
    tracing::info!(
        max_attempts = settings.retry.max_attempts,
        interval_ms = config.poll_interval_ms,
        settle_ms = config.poll_settle_delay_ms,
        "Recognition retry policy"
    );

    let state = AppState::new(Arc::new(detector), Arc::new(graph), http, settings);

    let app = routes::router(state).merge(routes::metrics_router(prometheus_handle));

    tracing::info!("Starting face-mood on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
