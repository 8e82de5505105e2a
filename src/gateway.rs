//! Request/response exchange with the anti-captcha API.
//!
//! One attempt per call. The gateway encodes the request, decodes the
//! response and checks only what `/createTask` must return; interpreting a
//! task result is left to the poller and the decoder.

use crate::error::{AntiCaptchaError, Result};
use crate::models::{
    CreateTaskRequest, CreateTaskResponse, TaskId, TaskResultRequest, TaskResultResponse,
};
use crate::task::TaskDescriptor;
use crate::transport::Transport;
use serde::de::DeserializeOwned;
use serde::Serialize;

const CREATE_TASK: &str = "/createTask";
const GET_TASK_RESULT: &str = "/getTaskResult";

/// Gateway bound to one client key.
pub struct Gateway<T> {
    transport: T,
    client_key: String,
}

impl<T: Transport> Gateway<T> {
    /// Bind `transport` to the account's client key.
    pub fn new(transport: T, client_key: impl Into<String>) -> Self {
        Self {
            transport,
            client_key: client_key.into(),
        }
    }

    /// The transport requests go through.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn exchange<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let payload = serde_json::to_vec(body)?;
        let response = self.transport.post(path, payload).await?;
        Ok(serde_json::from_slice(&response)?)
    }

    /// Submit a task and return the identifier the service assigned to it.
    pub async fn create_task(&self, task: &TaskDescriptor) -> Result<TaskId> {
        let request = CreateTaskRequest {
            client_key: &self.client_key,
            task,
        };
        let response: CreateTaskResponse = self.exchange(CREATE_TASK, &request).await?;

        if response.api.is_error() {
            return Err(response.api.to_error());
        }

        let task_id = response.task_id.ok_or_else(|| {
            AntiCaptchaError::Protocol("task number not found in server response".into())
        })?;

        parse_task_id(&task_id).ok_or_else(|| {
            AntiCaptchaError::Protocol(format!("task number of irregular format: {}", task_id))
        })
    }

    /// Query the current state of a task.
    pub async fn get_task_result(&self, task_id: TaskId) -> Result<TaskResultResponse> {
        let request = TaskResultRequest {
            client_key: &self.client_key,
            task_id,
        };
        self.exchange(GET_TASK_RESULT, &request).await
    }
}

/// Accepts integral JSON numbers, including ones encoded as floats.
fn parse_task_id(value: &serde_json::Value) -> Option<TaskId> {
    if let Some(id) = value.as_u64() {
        return Some(TaskId(id));
    }
    let id = value.as_f64()?;
    if id >= 0.0 && id.fract() == 0.0 && id <= u64::MAX as f64 {
        Some(TaskId(id as u64))
    } else {
        None
    }
}
