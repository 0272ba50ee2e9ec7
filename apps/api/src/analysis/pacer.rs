//! Rate-limit pacing between external embedding calls.

use std::time::Duration;

use async_trait::async_trait;

/// Delay inserted between consecutive embedding calls within one batch.
/// The provider has no published quota; this stays well under its observed
/// request-frequency tolerance.
pub const EMBED_CALL_DELAY: Duration = Duration::from_millis(1500);

/// Pacing policy between consecutive calls to the embedding provider.
///
/// Carried as `Arc<dyn Pacer>` so tests can swap in `NoDelayPacer` and run
/// the pipeline without real sleeps.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self);
}

/// Production policy: a fixed sleep before each call after the first.
pub struct FixedDelayPacer {
    delay: Duration,
}

impl FixedDelayPacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for FixedDelayPacer {
    fn default() -> Self {
        Self::new(EMBED_CALL_DELAY)
    }
}

#[async_trait]
impl Pacer for FixedDelayPacer {
    async fn pause(&self) {
        tokio::time::sleep(self.delay).await;
    }
}

/// Test policy: no waiting.
pub struct NoDelayPacer;

#[async_trait]
impl Pacer for NoDelayPacer {
    async fn pause(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_pacer_waits_configured_duration() {
        let pacer = FixedDelayPacer::default();
        let before = tokio::time::Instant::now();
        pacer.pause().await;
        assert_eq!(before.elapsed(), EMBED_CALL_DELAY);
    }

    #[tokio::test]
    async fn test_no_delay_pacer_returns_immediately() {
        let before = std::time::Instant::now();
        NoDelayPacer.pause().await;
        assert!(before.elapsed() < Duration::from_millis(50));
    }
}
