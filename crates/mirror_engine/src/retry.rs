use std::time::Duration;

use async_trait::async_trait;

/// Number of transfer attempts before a download is declared failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

/// Wait between transfer attempts, injectable so tests exercise the retry
/// loop without real waiting.
#[async_trait]
pub trait Delay: Send + Sync {
    /// Called before retry `attempt` (zero-based over the retries, so the
    /// first re-attempt sees 0).
    async fn wait(&self, attempt: u32);
}

/// Base delay doubling on each attempt: base, 2x base, 4x base, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExponentialBackoff {
    pub base: Duration,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(1),
        }
    }
}

#[async_trait]
impl Delay for ExponentialBackoff {
    async fn wait(&self, attempt: u32) {
        let factor = 2u32.saturating_pow(attempt);
        tokio::time::sleep(self.base.saturating_mul(factor)).await;
    }
}

/// No waiting at all; for tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoDelay;

#[async_trait]
impl Delay for NoDelay {
    async fn wait(&self, _attempt: u32) {}
}
