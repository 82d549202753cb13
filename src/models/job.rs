use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::models::person::{PersonRecord, Resolution};

/// Lifecycle state of a recognition job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobState {
    Uploaded,
    Polling,
    Resolved,
    Exhausted,
    /// Polling stopped on a non-retryable provider error.
    Aborted,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Resolved | JobState::Exhausted | JobState::Aborted)
    }
}

/// One uploaded photo being polled for a recognition match.
#[derive(Debug, Clone, Serialize)]
pub struct RecognitionJob {
    pub photo_id: String,
    pub uploaded_at: DateTime<Utc>,
    attempts_made: u32,
    max_attempts: u32,
    transient_failures: u32,
    state: JobState,
    person: Option<PersonRecord>,
}

impl RecognitionJob {
    pub fn new(photo_id: impl Into<String>, max_attempts: u32) -> Self {
        Self {
            photo_id: photo_id.into(),
            uploaded_at: Utc::now(),
            attempts_made: 0,
            max_attempts,
            transient_failures: 0,
            state: JobState::Uploaded,
            person: None,
        }
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn attempts_made(&self) -> u32 {
        self.attempts_made
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Query attempts that failed at the transport or parse level.
    pub fn transient_failures(&self) -> u32 {
        self.transient_failures
    }

    /// `Uploaded → Polling`. Allowed exactly once.
    pub fn begin_polling(&mut self) -> Result<(), JobError> {
        self.expect_state(JobState::Uploaded, "begin_polling")?;
        self.state = JobState::Polling;
        Ok(())
    }

    /// Claim the next attempt. Returns the 1-based attempt number.
    pub fn start_attempt(&mut self) -> Result<u32, JobError> {
        self.expect_state(JobState::Polling, "start_attempt")?;
        if self.attempts_made >= self.max_attempts {
            return Err(JobError::BudgetSpent {
                max_attempts: self.max_attempts,
            });
        }
        self.attempts_made += 1;
        Ok(self.attempts_made)
    }

    /// The current attempt found a face box. Terminal.
    pub fn resolve(&mut self, person: PersonRecord) -> Result<(), JobError> {
        self.expect_state(JobState::Polling, "resolve")?;
        self.person = Some(person);
        self.state = JobState::Resolved;
        Ok(())
    }

    /// The current attempt found nothing. Moves to `Exhausted` once the
    /// budget is spent, otherwise stays in `Polling`.
    pub fn record_miss(&mut self) -> Result<JobState, JobError> {
        self.expect_state(JobState::Polling, "record_miss")?;
        if self.attempts_made == self.max_attempts {
            self.state = JobState::Exhausted;
        }
        Ok(self.state)
    }

    /// Same as `record_miss`, for an attempt whose query itself failed.
    pub fn record_transient_failure(&mut self) -> Result<JobState, JobError> {
        let state = self.record_miss()?;
        self.transient_failures += 1;
        Ok(state)
    }

    /// Non-retryable error while polling. Terminal.
    pub fn abort(&mut self) -> Result<(), JobError> {
        self.expect_state(JobState::Polling, "abort")?;
        self.state = JobState::Aborted;
        Ok(())
    }

    /// The terminal answer, or `None` while polling or after an abort.
    pub fn resolution(&self) -> Option<Resolution> {
        match self.state {
            JobState::Resolved => self.person.clone().map(Resolution::Resolved),
            JobState::Exhausted => Some(Resolution::Unresolved),
            _ => None,
        }
    }

    fn expect_state(&self, expected: JobState, event: &'static str) -> Result<(), JobError> {
        if self.state != expected {
            return Err(JobError::InvalidTransition {
                from: self.state,
                event,
            });
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum JobError {
    #[error("cannot {event} while job is {from}")]
    InvalidTransition { from: JobState, event: &'static str },

    #[error("all {max_attempts} attempts already made")]
    BudgetSpent { max_attempts: u32 },
}
