//! Resilient caller.
//!
//! Drives one request through the transport:
//!
//! ```text
//! Idle -> Attempting -> Succeeded
//!                    -> Blocked -> Attempting (rephrase, once) -> Blocked
//!                    -> RetryWaiting -> Attempting
//!                    -> FailedPermanently
//! ```
//!
//! Rate limits are retried with exponential backoff up to the policy's
//! attempt budget. A content block triggers exactly one rephrase attempt with
//! [`ChatRequest::with_rephrase_directive`]. Every other error is terminal.
//! No sleep follows the final attempt.

use std::sync::Arc;
use std::time::Duration;

use advisor_core::ChatRequest;
use advisor_core::result::{CallResult, MAX_RETRIES_EXCEEDED, NO_USABLE_RESPONSE};
use strum::Display;

use crate::normalize::{Normalized, normalize};
use crate::retry::{RetryPolicy, Sleeper, TokioSleeper};
use crate::transport::ChatTransport;

/// States of one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum CallState {
    Idle,
    Attempting,
    RetryWaiting,
    Succeeded,
    Blocked,
    FailedPermanently,
}

impl CallState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::Blocked | Self::FailedPermanently
        )
    }
}

/// The result of a call together with how it got there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallReport {
    pub result: CallResult,
    /// Transport invocations, the rephrase attempt included.
    pub attempts: u32,
    /// Sum of all backoff waits.
    pub total_backoff: Duration,
    /// Every state entered, starting with [`CallState::Idle`].
    pub transitions: Vec<CallState>,
}

impl CallReport {
    pub fn final_state(&self) -> CallState {
        self.transitions.last().copied().unwrap_or(CallState::Idle)
    }
}

struct Progress {
    attempts: u32,
    total_backoff: Duration,
    transitions: Vec<CallState>,
}

impl Progress {
    fn new() -> Self {
        Self {
            attempts: 0,
            total_backoff: Duration::ZERO,
            transitions: vec![CallState::Idle],
        }
    }

    fn enter(&mut self, state: CallState) {
        tracing::trace!(%state, "Call state");
        if state == CallState::Attempting {
            self.attempts += 1;
        }
        self.transitions.push(state);
    }

    fn finish(self, result: CallResult) -> CallReport {
        CallReport {
            result,
            attempts: self.attempts,
            total_backoff: self.total_backoff,
            transitions: self.transitions,
        }
    }
}

enum Outcome {
    Text(String),
    Blocked(String),
    Failed(String),
}

/// Calls a [`ChatTransport`] with backoff and a single rephrase retry.
#[derive(Clone)]
pub struct ResilientCaller {
    transport: Arc<dyn ChatTransport>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl ResilientCaller {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            transport,
            policy: RetryPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the timer, e.g. with a recording one in tests.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn transport_name(&self) -> &str {
        self.transport.name()
    }

    /// Runs the call and returns only its result.
    pub async fn call(&self, request: &ChatRequest) -> CallResult {
        self.call_with_report(request).await.result
    }

    pub async fn call_with_report(&self, request: &ChatRequest) -> CallReport {
        let mut progress = Progress::new();

        let result = match self.attempt_with_backoff(request, &mut progress).await {
            Outcome::Text(text) => {
                progress.enter(CallState::Succeeded);
                CallResult::success(text)
            }
            Outcome::Blocked(reason) => {
                progress.enter(CallState::Blocked);
                tracing::warn!(
                    transport = self.transport.name(),
                    %reason,
                    "Response blocked, retrying once with a neutral rephrase"
                );
                let rephrased = self.rephrase(request, &mut progress).await;
                progress.enter(CallState::Blocked);
                CallResult::blocked(reason, rephrased)
            }
            Outcome::Failed(detail) => {
                progress.enter(CallState::FailedPermanently);
                tracing::error!(
                    transport = self.transport.name(),
                    error = %detail,
                    "Model call failed"
                );
                CallResult::failure(detail)
            }
        };

        let report = progress.finish(result);
        tracing::debug!(
            transport = self.transport.name(),
            attempts = report.attempts,
            backoff_ms = report.total_backoff.as_millis() as u64,
            state = %report.final_state(),
            "Model call finished"
        );
        report
    }

    async fn attempt_with_backoff(&self, request: &ChatRequest, progress: &mut Progress) -> Outcome {
        let mut attempt_index = 0u32;
        loop {
            progress.enter(CallState::Attempting);
            tracing::debug!(
                transport = self.transport.name(),
                model = %request.model,
                attempt = attempt_index + 1,
                max_attempts = self.policy.max_attempts,
                "Sending request"
            );

            match self.transport.send_conversation(request).await {
                Ok(reply) => {
                    return match normalize(&reply) {
                        Normalized::Text(text) => Outcome::Text(text),
                        Normalized::Blocked { reason } => Outcome::Blocked(reason),
                        Normalized::Unusable => Outcome::Failed(NO_USABLE_RESPONSE.to_string()),
                    };
                }
                Err(err) if err.is_rate_limited() => {
                    if !self.policy.can_retry_after(attempt_index) {
                        tracing::warn!(
                            transport = self.transport.name(),
                            attempts = attempt_index + 1,
                            "Rate limited on the final attempt"
                        );
                        return Outcome::Failed(MAX_RETRIES_EXCEEDED.to_string());
                    }

                    let delay = self.policy.backoff(attempt_index);
                    tracing::warn!(
                        transport = self.transport.name(),
                        attempt = attempt_index + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Rate limited, backing off"
                    );
                    progress.enter(CallState::RetryWaiting);
                    progress.total_backoff += delay;
                    self.sleeper.sleep(delay).await;
                    attempt_index += 1;
                }
                Err(err) => return Outcome::Failed(err.to_string()),
            }
        }
    }

    /// One attempt with the rephrase directive; never retried.
    async fn rephrase(&self, request: &ChatRequest, progress: &mut Progress) -> Option<String> {
        progress.enter(CallState::Attempting);
        let rephrased = request.with_rephrase_directive();

        match self.transport.send_conversation(&rephrased).await {
            Ok(reply) => match normalize(&reply) {
                Normalized::Text(text) => Some(text),
                Normalized::Blocked { reason } => {
                    tracing::warn!(%reason, "Rephrased request was blocked as well");
                    None
                }
                Normalized::Unusable => None,
            },
            Err(err) => {
                tracing::warn!(error = %err, "Rephrase attempt failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(CallState::Succeeded.is_terminal());
        assert!(CallState::Blocked.is_terminal());
        assert!(CallState::FailedPermanently.is_terminal());
        assert!(!CallState::RetryWaiting.is_terminal());
        assert!(!CallState::Attempting.is_terminal());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(CallState::RetryWaiting.to_string(), "retry_waiting");
        assert_eq!(CallState::FailedPermanently.to_string(), "failed_permanently");
    }
}
