//! Error types for the anti-captcha client.

use crate::models::{CaptchaVariant, TaskId};
use std::time::Duration;
use thiserror::Error;

/// Main error type for the anti-captcha client.
#[derive(Error, Debug)]
pub enum AntiCaptchaError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] rquest::Error),

    /// Transport failed outside of the HTTP stack
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body could not be parsed as JSON
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Well-formed response missing an expected field
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The service reported an error (`errorId != 0`)
    #[error("anti-captcha error {error_id} ({code}): {description}")]
    Api {
        error_id: i64,
        code: String,
        description: String,
    },

    /// Task is ready but its solution payload could not be decoded
    #[error("Malformed {variant} result: {message}")]
    MalformedResult {
        variant: CaptchaVariant,
        message: String,
    },

    /// Deadline elapsed while the task was still processing
    #[error("Timed out after {elapsed:?} waiting for task {task_id}")]
    TimedOut { task_id: TaskId, elapsed: Duration },

    /// Solve was aborted through a cancellation token; `task_id` is `None`
    /// when it fired before the task was created
    #[error("Solve was cancelled {}", cancelled_stage(.task_id))]
    Cancelled { task_id: Option<TaskId> },

    /// Rejected task parameters
    #[error("Invalid task parameters: {0}")]
    InvalidInput(String),

    /// No client key available
    #[error("Missing client key: {0}")]
    MissingCredential(String),
}

fn cancelled_stage(task_id: &Option<TaskId>) -> String {
    match task_id {
        Some(id) => format!("while polling task {}", id),
        None => "before the task was created".to_string(),
    }
}

impl AntiCaptchaError {
    /// True when the request could not be sent or its response was unreadable.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            AntiCaptchaError::Http(_) | AntiCaptchaError::Transport(_) | AntiCaptchaError::Json(_)
        )
    }

    /// True when the task was still processing when the deadline elapsed.
    pub fn is_timeout(&self) -> bool {
        matches!(self, AntiCaptchaError::TimedOut { .. })
    }
}

/// Result type alias for anti-captcha operations.
pub type Result<T> = std::result::Result<T, AntiCaptchaError>;
