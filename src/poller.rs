//! Polling controller.
//!
//! After a task is created the poller waits `initial_delay`, then queries the
//! task every `poll_interval` until it is ready, the service reports an
//! error, the gateway fails, the deadline elapses or the session is
//! cancelled. Queries for one task never overlap.
//!
//! A session owns exactly two timers: the deadline and the next tick. The
//! tick timer is reset in place between queries and both are dropped on
//! every exit path.

use crate::decode::decode;
use crate::error::{AntiCaptchaError, Result};
use crate::gateway::Gateway;
use crate::models::{CaptchaVariant, Solution, TaskId, TaskStatus};
use crate::transport::Transport;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Default wait before the first query.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(10);

/// Default wait between subsequent queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Poll cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub initial_delay: Duration,
    pub poll_interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_delay: DEFAULT_INITIAL_DELAY,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Time budget for one polling session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// Give up once this much time has passed since polling started.
    After(Duration),
    /// Poll until the task finishes or the session is cancelled.
    Never,
}

impl Timeout {
    fn deadline_from(self, start: Instant) -> Option<Instant> {
        match self {
            Timeout::After(budget) => start.checked_add(budget),
            Timeout::Never => None,
        }
    }
}

impl From<Duration> for Timeout {
    fn from(budget: Duration) -> Self {
        Timeout::After(budget)
    }
}

impl From<Option<Duration>> for Timeout {
    fn from(budget: Option<Duration>) -> Self {
        budget.map_or(Timeout::Never, Timeout::After)
    }
}

/// Far enough ahead to never fire, matching what `tokio::time::sleep` uses
/// for durations that overflow `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// `now + delay`, saturating to a far-future instant instead of overflowing.
fn after(delay: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(delay).unwrap_or_else(|| now + FAR_FUTURE)
}

async fn expire_at(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Drives one task to a terminal state.
#[derive(Debug, Clone, Copy, Default)]
pub struct Poller {
    config: PollConfig,
}

impl Poller {
    /// Poller running at `config`'s cadence.
    pub fn new(config: PollConfig) -> Self {
        Self { config }
    }

    /// The cadence this poller runs with.
    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Poll `task_id` until it resolves into a [`Solution`] for `variant`.
    pub async fn poll<T: Transport>(
        &self,
        gateway: &Gateway<T>,
        task_id: TaskId,
        variant: CaptchaVariant,
        timeout: Timeout,
        cancel: &CancellationToken,
    ) -> Result<Solution> {
        let started = Instant::now();
        let expiry = expire_at(timeout.deadline_from(started));
        let tick = tokio::time::sleep_until(after(self.config.initial_delay));
        tokio::pin!(expiry, tick);

        let timed_out = || AntiCaptchaError::TimedOut {
            task_id,
            elapsed: started.elapsed(),
        };

        let mut attempt: u32 = 0;
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(AntiCaptchaError::Cancelled { task_id: Some(task_id) }),
                _ = &mut expiry => return Err(timed_out()),
                _ = &mut tick => {}
            }

            attempt += 1;
            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(AntiCaptchaError::Cancelled { task_id: Some(task_id) }),
                _ = &mut expiry => return Err(timed_out()),
                response = gateway.get_task_result(task_id) => response?,
            };

            let status = response.status();
            tracing::debug!(%task_id, %variant, attempt, ?status, "Polled task");

            match status {
                TaskStatus::Ready => return decode(variant, &response),
                TaskStatus::Error => return Err(response.api.to_error()),
                TaskStatus::Processing => {
                    tick.as_mut().reset(after(self.config.poll_interval));
                }
            }
        }
    }
}
