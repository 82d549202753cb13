//! Bounded-retry recognition polling.
//!
//! A photo is uploaded, the recognition endpoint is queried until a face box
//! appears or the attempt budget runs out, and the photo is then deleted.
//! The delete happens on every path, including when the caller drops the
//! `recognize` future mid-poll.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::models::job::{JobError, JobState, RecognitionJob};
use crate::models::person::Resolution;
use crate::services::graph::parse_recognition;
use crate::services::provider::{IdentityGraphProvider, ProviderError};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Fixed-count retry settings. No backoff growth, no jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Wait between consecutive queries.
    pub inter_attempt_delay: Duration,
    /// One-off wait after upload, before the first query.
    pub settle_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            inter_attempt_delay: Duration::ZERO,
            settle_delay: Duration::from_secs(1),
        }
    }
}

/// Result of deleting the uploaded photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CleanupStatus {
    Deleted,
    Failed { reason: String },
}

impl CleanupStatus {
    pub fn is_deleted(&self) -> bool {
        matches!(self, CleanupStatus::Deleted)
    }
}

/// Everything a finished recognition produced.
///
/// `cleanup` is independent of `outcome`: a failed delete never replaces a
/// resolved person.
#[derive(Debug)]
pub struct RecognitionReport {
    pub photo_id: String,
    pub attempts: u32,
    pub transient_failures: u32,
    pub outcome: Result<Resolution, RecognitionError>,
    pub cleanup: CleanupStatus,
}

impl RecognitionReport {
    pub fn status(&self) -> &'static str {
        match &self.outcome {
            Ok(Resolution::Resolved(_)) => "resolved",
            Ok(Resolution::Unresolved) => "unresolved",
            Err(_) => "failed",
        }
    }
}

pub struct RecognitionPoller {
    graph: Arc<dyn IdentityGraphProvider>,
    policy: RetryPolicy,
}

impl RecognitionPoller {
    pub fn new(graph: Arc<dyn IdentityGraphProvider>, policy: RetryPolicy) -> Self {
        Self { graph, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Upload, poll, and clean up one photo.
    ///
    /// Only an upload failure is returned as `Err`; once a photo exists on
    /// the provider the report always carries a cleanup status.
    pub async fn recognize(&self, image: &[u8]) -> Result<RecognitionReport, RecognitionError> {
        let photo_id = self.upload(image).await?;
        Ok(self.recognize_uploaded(photo_id).await)
    }

    /// Store `image` on the provider and return its photo id.
    pub async fn upload(&self, image: &[u8]) -> Result<String, RecognitionError> {
        let photo_id = self
            .graph
            .upload(image)
            .await
            .map_err(RecognitionError::Upload)?;

        info!(photo_id = %photo_id, bytes = image.len(), "Photo uploaded for recognition");
        Ok(photo_id)
    }

    /// Poll and clean up a photo that is already on the provider.
    ///
    /// The cleanup guard is armed before the future is returned, so dropping
    /// the future unpolled still deletes the photo.
    pub fn recognize_uploaded(
        &self,
        photo_id: String,
    ) -> impl Future<Output = RecognitionReport> + Send + '_ {
        let guard = CleanupGuard::new(Arc::clone(&self.graph), photo_id.clone());
        let mut job = RecognitionJob::new(photo_id, self.policy.max_attempts);

        async move {
            let outcome = self.resolve(&mut job).await;
            let cleanup = guard.run().await;

            let report = RecognitionReport {
                photo_id: job.photo_id.clone(),
                attempts: job.attempts_made(),
                transient_failures: job.transient_failures(),
                outcome,
                cleanup,
            };

            metrics::counter!("recognition_jobs_total", "outcome" => report.status()).increment(1);
            metrics::histogram!("recognition_poll_attempts").record(f64::from(report.attempts));

            info!(
                photo_id = %report.photo_id,
                status = report.status(),
                attempts = report.attempts,
                deleted = report.cleanup.is_deleted(),
                "Recognition finished"
            );

            report
        }
    }

    /// Poll the provider for `job` until it reaches a terminal state.
    pub async fn resolve(&self, job: &mut RecognitionJob) -> Result<Resolution, RecognitionError> {
        job.begin_polling()?;
        sleep(self.policy.settle_delay).await;

        loop {
            let attempt = job.start_attempt()?;

            let state = match self.graph.query(&job.photo_id).await {
                Ok(body) => match parse_recognition(&body) {
                    Ok(Some(person)) => {
                        job.resolve(person.clone())?;
                        info!(
                            photo_id = %job.photo_id,
                            attempt,
                            empty_match = person.is_empty_match(),
                            "Recognition resolved"
                        );
                        return Ok(Resolution::Resolved(person));
                    }
                    Ok(None) => {
                        debug!(photo_id = %job.photo_id, attempt, "No face boxes yet");
                        job.record_miss()?
                    }
                    Err(e) => {
                        warn!(photo_id = %job.photo_id, attempt, error = %e, "Unparsable recognition response");
                        metrics::counter!("recognition_query_failures_total").increment(1);
                        job.record_transient_failure()?
                    }
                },
                Err(e) if e.is_fatal() => {
                    job.abort()?;
                    error!(photo_id = %job.photo_id, attempt, error = %e, "Recognition query rejected, giving up");
                    return Err(RecognitionError::Query(e));
                }
                Err(e) => {
                    warn!(photo_id = %job.photo_id, attempt, error = %e, "Recognition query failed, counting as miss");
                    metrics::counter!("recognition_query_failures_total").increment(1);
                    job.record_transient_failure()?
                }
            };

            if state == JobState::Exhausted {
                warn!(
                    photo_id = %job.photo_id,
                    attempts = job.attempts_made(),
                    "Recognition attempts exhausted"
                );
                return Ok(Resolution::Unresolved);
            }

            sleep(self.policy.inter_attempt_delay).await;
        }
    }

    /// Delete an uploaded photo, reporting rather than raising failures.
    pub async fn cleanup(&self, photo_id: &str) -> CleanupStatus {
        delete_photo(self.graph.as_ref(), photo_id).await
    }
}

async fn delete_photo(graph: &dyn IdentityGraphProvider, photo_id: &str) -> CleanupStatus {
    let status = match graph.delete(photo_id).await {
        Ok(true) => CleanupStatus::Deleted,
        Ok(false) => CleanupStatus::Failed {
            reason: "provider refused to delete the photo".to_string(),
        },
        Err(e) => CleanupStatus::Failed {
            reason: e.to_string(),
        },
    };

    match &status {
        CleanupStatus::Deleted => debug!(photo_id, "Uploaded photo deleted"),
        CleanupStatus::Failed { reason } => {
            metrics::counter!("recognition_cleanup_failures_total").increment(1);
            warn!(photo_id, reason = %reason, "Failed to delete uploaded photo, remote resource leaked");
        }
    }

    status
}

/// Deletes the uploaded photo exactly once.
///
/// `run` performs the delete on a spawned task and waits for it. If the
/// guard is dropped without `run` (the owning future was cancelled), `Drop`
/// spawns the delete in the background instead.
struct CleanupGuard {
    graph: Arc<dyn IdentityGraphProvider>,
    photo_id: Option<String>,
}

impl CleanupGuard {
    fn new(graph: Arc<dyn IdentityGraphProvider>, photo_id: String) -> Self {
        Self {
            graph,
            photo_id: Some(photo_id),
        }
    }

    async fn run(mut self) -> CleanupStatus {
        match self.spawn_delete() {
            Some(task) => task.await.unwrap_or_else(|e| CleanupStatus::Failed {
                reason: format!("cleanup task failed: {e}"),
            }),
            None => CleanupStatus::Failed {
                reason: "no runtime available for cleanup".to_string(),
            },
        }
    }

    fn spawn_delete(&mut self) -> Option<JoinHandle<CleanupStatus>> {
        let photo_id = self.photo_id.take()?;
        let graph = Arc::clone(&self.graph);

        match Handle::try_current() {
            Ok(handle) => Some(handle.spawn(async move {
                delete_photo(graph.as_ref(), &photo_id).await
            })),
            Err(_) => {
                error!(photo_id = %photo_id, "No async runtime for cleanup, uploaded photo leaked");
                metrics::counter!("recognition_cleanup_failures_total").increment(1);
                None
            }
        }
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        if let Some(photo_id) = &self.photo_id {
            warn!(photo_id = %photo_id, "Recognition cancelled, deleting uploaded photo in background");
            let _ = self.spawn_delete();
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecognitionError {
    #[error("photo upload failed: {0}")]
    Upload(#[source] ProviderError),

    #[error("recognition query failed: {0}")]
    Query(#[source] ProviderError),

    #[error("recognition job state error: {0}")]
    State(#[from] JobError),
}
