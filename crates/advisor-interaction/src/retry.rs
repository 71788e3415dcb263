//! Backoff policy for rate-limited calls.

use std::time::Duration;

use advisor_core::config::RetrySettings;
use async_trait::async_trait;

/// Exponential backoff: the wait after the n-th rate-limited attempt
/// (zero-based) is `2^n` units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included. Never zero.
    pub max_attempts: u32,
    pub unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_settings(&RetrySettings::default())
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, unit: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            unit,
        }
    }

    pub fn from_settings(settings: &RetrySettings) -> Self {
        Self::new(
            settings.max_attempts,
            Duration::from_millis(settings.backoff_unit_ms),
        )
    }

    /// Wait before retrying after attempt `attempt_index` was rate limited.
    pub fn backoff(&self, attempt_index: u32) -> Duration {
        let factor = 1u32 << attempt_index.min(16);
        self.unit.saturating_mul(factor)
    }

    /// Whether another attempt may follow attempt `attempt_index`.
    pub fn can_retry_after(&self, attempt_index: u32) -> bool {
        attempt_index + 1 < self.max_attempts
    }
}

/// Suspends the current task between attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
