//! Retry Governor
//!
//! Rate-limit backoff state machine around a [`Transport`].
//!
//! ## State machine
//!
//! `Attempting(n)` → on `Success` → done; on `RateLimited` with attempts
//! remaining → sleep `retry_after ?? 2^n` seconds → `Attempting(n+1)`; on
//! `RateLimited` with the budget spent → `RetriesExhausted`; on `ApiError`
//! or `TransportFailure` → terminal immediately, those are not transient.
//!
//! The machine is a loop over an explicit state value rather than a
//! recursive call, and both suspension points (the in-flight request and
//! the backoff sleep) race against a [`CancelHandle`]. A progress event is
//! emitted before every sleep so callers can tell a user what is going on.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::transport::Transport;
use super::{ModelOutcome, ModelRequest, ProgressEvent, ProgressSink};
use crate::config::RetryConfig;
use crate::types::{Result, TreeError};

// =============================================================================
// Cancellation
// =============================================================================

/// Cooperative cancellation signal shared between a caller and one or more
/// in-flight generations.
#[derive(Clone, Default)]
pub struct CancelHandle {
    notify: Arc<Notify>,
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation. Idempotent; wakes every pending wait.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Resolve once cancellation is signalled. The notified future is
    /// registered before the flag check, so a concurrent `cancel` cannot
    /// slip between the two.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

// =============================================================================
// Retry Policy
// =============================================================================

/// Attempt budget and backoff schedule.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_base_secs: u64,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            backoff_base_secs: config.backoff_base_secs,
            max_backoff: Duration::from_secs(config.max_backoff_secs),
        }
    }

    /// Delay before the attempt after `attempt` (1-indexed). A server hint
    /// takes precedence; otherwise `base^attempt` seconds, capped.
    pub fn backoff_delay(&self, attempt: u32, server_hint_secs: Option<u64>) -> Duration {
        let secs = match server_hint_secs {
            Some(secs) => secs,
            None => self
                .backoff_base_secs
                .checked_pow(attempt)
                .unwrap_or(self.max_backoff.as_secs()),
        };
        Duration::from_secs(secs).min(self.max_backoff)
    }
}

// =============================================================================
// Retry Governor
// =============================================================================

enum RetryState {
    Attempting(u32),
}

pub struct RetryGovernor {
    policy: RetryPolicy,
}

impl RetryGovernor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Drive a request through the transport until it succeeds, the
    /// attempt budget is spent, a non-transient failure occurs, or the
    /// caller cancels.
    pub async fn call_with_retry(
        &self,
        transport: &dyn Transport,
        request: &ModelRequest,
        progress: &dyn ProgressSink,
        cancel: &CancelHandle,
    ) -> Result<String> {
        let max_attempts = self.policy.max_attempts;
        let mut state = RetryState::Attempting(1);

        loop {
            let RetryState::Attempting(attempt) = state;

            if cancel.is_cancelled() {
                return Err(TreeError::Cancelled);
            }

            progress.notify(ProgressEvent::Attempting {
                model: request.model,
                attempt,
                max_attempts,
            });
            debug!(attempt, max_attempts, model = %request.model, "Model attempt");

            let outcome = tokio::select! {
                outcome = transport.send(request) => outcome,
                _ = cancel.cancelled() => return Err(TreeError::Cancelled),
            };

            state = match outcome {
                ModelOutcome::Success { raw_text } => {
                    info!(attempt, "Model responded");
                    return Ok(raw_text);
                }
                ModelOutcome::RateLimited { retry_after_secs } => {
                    if attempt >= max_attempts {
                        warn!(attempt, "Rate limit attempt budget exhausted");
                        return Err(TreeError::RetriesExhausted { attempts: attempt });
                    }

                    let wait = self.policy.backoff_delay(attempt, retry_after_secs);
                    progress.notify(ProgressEvent::Backoff { attempt, wait });
                    warn!(attempt, wait_secs = wait.as_secs(), "Rate limited, backing off");

                    tokio::select! {
                        _ = sleep(wait) => {}
                        _ = cancel.cancelled() => return Err(TreeError::Cancelled),
                    }

                    RetryState::Attempting(attempt + 1)
                }
                ModelOutcome::ApiError { message } => {
                    warn!(attempt, %message, "API error, not retrying");
                    return Err(TreeError::Api(message));
                }
                ModelOutcome::TransportFailure { message } => {
                    warn!(attempt, %message, "Transport failure, not retrying");
                    return Err(TreeError::Transport(message));
                }
            };
        }
    }
}
