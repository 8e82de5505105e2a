//! Scripted in-memory transport for unit tests.

use crate::error::{AntiCaptchaError, Result};
use crate::transport::Transport;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::time::Instant;

type ResultScript = Box<dyn Fn(u64, usize) -> Option<Value> + Send + Sync>;

/// One request seen by the stub.
#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub path: String,
    pub body: Value,
    pub at: Instant,
}

/// Answers `/createTask` with sequential task ids (or a fixed response) and
/// `/getTaskResult` from a script keyed by task id and per-task query index.
/// A script returning `None` simulates a transport failure; `hanging_on`
/// simulates a request that never completes.
pub(crate) struct StubTransport {
    next_task_id: AtomicU64,
    create_response: Option<Value>,
    hang_on: Option<&'static str>,
    results: ResultScript,
    calls: Mutex<Vec<Call>>,
}

impl StubTransport {
    pub fn new(results: impl Fn(u64, usize) -> Option<Value> + Send + Sync + 'static) -> Self {
        Self {
            next_task_id: AtomicU64::new(1000),
            create_response: None,
            hang_on: None,
            results: Box::new(results),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Ready on the first query with `solution`.
    pub fn ready(solution: Value) -> Self {
        Self::new(move |_, _| Some(json!({"errorId": 0, "status": "ready", "solution": solution})))
    }

    /// `processing` for `ticks` queries, then ready with `solution`.
    pub fn ready_after(ticks: usize, solution: Value) -> Self {
        Self::new(move |_, n| {
            if n < ticks {
                Some(processing())
            } else {
                Some(json!({"errorId": 0, "status": "ready", "solution": solution}))
            }
        })
    }

    pub fn always_processing() -> Self {
        Self::new(|_, _| Some(processing()))
    }

    pub fn with_create_response(mut self, response: Value) -> Self {
        self.create_response = Some(response);
        self
    }

    /// Requests to `path` are recorded but never answered.
    pub fn hanging_on(mut self, path: &'static str) -> Self {
        self.hang_on = Some(path);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.path == path).collect()
    }
}

pub(crate) fn processing() -> Value {
    json!({"errorId": 0, "status": "processing"})
}

#[async_trait]
impl Transport for StubTransport {
    async fn post(&self, path: &str, body: Vec<u8>) -> Result<Vec<u8>> {
        let body: Value = serde_json::from_slice(&body)?;
        if self.hang_on == Some(path) {
            self.calls.lock().unwrap().push(Call {
                path: path.to_string(),
                body,
                at: Instant::now(),
            });
            return std::future::pending().await;
        }
        let response = {
            let mut calls = self.calls.lock().unwrap();
            let response = match path {
                "/createTask" => Some(self.create_response.clone().unwrap_or_else(|| {
                    let id = self.next_task_id.fetch_add(1, Ordering::SeqCst);
                    json!({"errorId": 0, "taskId": id})
                })),
                "/getTaskResult" => {
                    let task_id = body["taskId"].as_u64().unwrap_or_default();
                    let seen = calls
                        .iter()
                        .filter(|c| c.path == path && c.body["taskId"].as_u64() == Some(task_id))
                        .count();
                    (self.results)(task_id, seen)
                }
                other => panic!("unexpected path {}", other),
            };
            calls.push(Call {
                path: path.to_string(),
                body,
                at: Instant::now(),
            });
            response
        };

        match response {
            Some(value) => Ok(serde_json::to_vec(&value)?),
            None => Err(AntiCaptchaError::Transport("connection reset by peer".into())),
        }
    }
}
