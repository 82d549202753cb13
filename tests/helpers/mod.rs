//! Fake providers and server helpers for integration testing

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::time::sleep;

use face_mood::app_state::{AppState, ServiceSettings};
use face_mood::models::face::FaceAnnotation;
use face_mood::routes;
use face_mood::services::poller::RetryPolicy;
use face_mood::services::provider::{FaceDetectionProvider, IdentityGraphProvider, ProviderError};

use crate::fixtures::NOT_READY;

/// What the fake recognition endpoint answers to one query.
#[derive(Debug, Clone)]
pub enum QueryReply {
    Body(String),
    Unavailable,
    Unauthorized,
}

impl QueryReply {
    pub fn body(body: impl Into<String>) -> Self {
        QueryReply::Body(body.into())
    }
}

/// What the fake answers to a delete.
#[derive(Debug, Clone, Copy)]
pub enum DeleteReply {
    Deleted,
    Refused,
    Unavailable,
}

/// Identity-graph fake that plays back a script of query replies.
///
/// Once the script runs out every query answers `NOT_READY`.
pub struct ScriptedGraph {
    script: Mutex<VecDeque<QueryReply>>,
    upload_fails: bool,
    delete_reply: DeleteReply,
    query_delay: Duration,
    upload_delay: Duration,
    uploads: AtomicU32,
    queries: AtomicU32,
    deleted: Mutex<Vec<String>>,
}

impl ScriptedGraph {
    pub fn new(script: Vec<QueryReply>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            upload_fails: false,
            delete_reply: DeleteReply::Deleted,
            query_delay: Duration::ZERO,
            upload_delay: Duration::ZERO,
            uploads: AtomicU32::new(0),
            queries: AtomicU32::new(0),
            deleted: Mutex::new(Vec::new()),
        }
    }

    pub fn never_matching() -> Self {
        Self::new(Vec::new())
    }

    /// Not ready for `attempt - 1` queries, then answers `body`.
    pub fn matching_on(attempt: u32, body: impl Into<String>) -> Self {
        let mut script: Vec<QueryReply> = (1..attempt).map(|_| QueryReply::body(NOT_READY)).collect();
        script.push(QueryReply::body(body));
        Self::new(script)
    }

    pub fn with_failing_upload(mut self) -> Self {
        self.upload_fails = true;
        self
    }

    pub fn with_delete_reply(mut self, reply: DeleteReply) -> Self {
        self.delete_reply = reply;
        self
    }

    pub fn with_query_delay(mut self, delay: Duration) -> Self {
        self.query_delay = delay;
        self
    }

    pub fn with_upload_delay(mut self, delay: Duration) -> Self {
        self.upload_delay = delay;
        self
    }

    pub fn uploads(&self) -> u32 {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> u32 {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deleted.lock().unwrap().len()
    }

    pub fn deleted_ids(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityGraphProvider for ScriptedGraph {
    async fn upload(&self, _image: &[u8]) -> Result<String, ProviderError> {
        if !self.upload_delay.is_zero() {
            sleep(self.upload_delay).await;
        }
        if self.upload_fails {
            return Err(ProviderError::Status {
                status: StatusCode::BAD_REQUEST,
                body: "malformed image".to_string(),
            });
        }
        let n = self.uploads.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("photo-{n}"))
    }

    async fn query(&self, _photo_id: &str) -> Result<String, ProviderError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if !self.query_delay.is_zero() {
            sleep(self.query_delay).await;
        }

        let reply = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| QueryReply::body(NOT_READY));

        match reply {
            QueryReply::Body(body) => Ok(body),
            QueryReply::Unavailable => Err(ProviderError::Status {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: "upstream busy".to_string(),
            }),
            QueryReply::Unauthorized => Err(ProviderError::Status {
                status: StatusCode::UNAUTHORIZED,
                body: "invalid token".to_string(),
            }),
        }
    }

    async fn delete(&self, photo_id: &str) -> Result<bool, ProviderError> {
        self.deleted.lock().unwrap().push(photo_id.to_string());
        match self.delete_reply {
            DeleteReply::Deleted => Ok(true),
            DeleteReply::Refused => Ok(false),
            DeleteReply::Unavailable => Err(ProviderError::Status {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: "try again later".to_string(),
            }),
        }
    }
}

/// Face-detection fake returning a fixed answer.
pub struct FakeDetector {
    faces: Option<Vec<FaceAnnotation>>,
}

impl FakeDetector {
    pub fn returning(faces: Vec<FaceAnnotation>) -> Self {
        Self { faces: Some(faces) }
    }

    pub fn failing() -> Self {
        Self { faces: None }
    }
}

#[async_trait]
impl FaceDetectionProvider for FakeDetector {
    async fn detect(&self, _image: &[u8]) -> Result<Vec<FaceAnnotation>, ProviderError> {
        self.faces.clone().ok_or_else(|| ProviderError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "backend error".to_string(),
        })
    }
}

/// Retry policy without waits, so tests run at query speed.
pub fn instant_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        inter_attempt_delay: Duration::ZERO,
        settle_delay: Duration::ZERO,
    }
}

pub fn test_settings(max_attempts: u32, recognition_timeout: Duration) -> ServiceSettings {
    ServiceSettings {
        retry: instant_policy(max_attempts),
        recognition_timeout,
        max_upload_bytes: 1024 * 1024,
    }
}

pub fn test_state(
    detector: Arc<dyn FaceDetectionProvider>,
    graph: Arc<dyn IdentityGraphProvider>,
    settings: ServiceSettings,
) -> AppState {
    AppState::new(detector, graph, reqwest::Client::new(), settings)
}

/// Serve the API on an ephemeral port and return its base URL.
pub async fn spawn_app(state: AppState) -> String {
    spawn_router(routes::router(state)).await
}

pub async fn spawn_router(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });
    format!("http://{addr}")
}

/// Poll `condition` until it holds or `timeout` elapses.
pub async fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        sleep(Duration::from_millis(10)).await;
    }
    condition()
}
