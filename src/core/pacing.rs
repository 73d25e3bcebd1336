use crate::domain::ports::{ApiClient, Clock};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Keeps at least `interval` between consecutive permits.
pub struct RateLimiter<K: Clock> {
    interval: Duration,
    clock: K,
    last: Mutex<Option<Instant>>,
}

impl<K: Clock> RateLimiter<K> {
    pub fn new(interval: Duration, clock: K) -> Self {
        Self {
            interval,
            clock,
            last: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits until the next request may go out. The first call never waits.
    pub async fn acquire(&self) {
        let mut last = self.last.lock().await;
        if let Some(previous) = *last {
            let elapsed = self.clock.now().saturating_duration_since(previous);
            if elapsed < self.interval {
                let wait = self.interval - elapsed;
                tracing::debug!("⏳ Pacing: waiting {:?} before next request", wait);
                self.clock.sleep(wait).await;
            }
        }
        *last = Some(self.clock.now());
    }
}

/// Client wrapper that passes every request through a [`RateLimiter`].
pub struct PacedClient<C: ApiClient, K: Clock> {
    inner: C,
    limiter: RateLimiter<K>,
}

impl<C: ApiClient, K: Clock> PacedClient<C, K> {
    pub fn new(inner: C, limiter: RateLimiter<K>) -> Self {
        Self { inner, limiter }
    }
}

#[async_trait]
impl<C: ApiClient, K: Clock> ApiClient for PacedClient<C, K> {
    async fn get_json(&self, path: &str, params: &[(String, String)]) -> Result<serde_json::Value> {
        self.limiter.acquire().await;
        self.inner.get_json(path, params).await
    }
}
