//! Rate limiting middleware
//!
//! Sliding-window-log admission control keyed by client identity. Every
//! client has an ordered log of admitted-request timestamps; the log is
//! pruned to the trailing window before the count is checked, so at any
//! evaluation instant it holds only timestamps within `[now - window, now]`.
//! Rejected attempts are not recorded.
//!
//! The whole keyed collection sits behind one async mutex, which makes the
//! read-prune-check-append sequence atomic per key and covers the
//! lazy-create race of two concurrent first requests from the same client.

use axum::{
    body::Body,
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

use crate::error::ApiError;
use crate::middleware::client_ip;

/// Sliding-window rate limiter state
#[derive(Clone)]
pub struct SlidingWindow {
    windows: Arc<Mutex<HashMap<String, VecDeque<Instant>>>>,
    max_requests: usize,
    window: Duration,
}

impl SlidingWindow {
    /// Create a new limiter admitting at most `max_requests` per client in
    /// any trailing interval of `window`.
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            windows: Arc::new(Mutex::new(HashMap::new())),
            max_requests,
            window,
        }
    }

    /// Decide admit/reject for a request arriving now.
    pub async fn check(&self, key: &str) -> Result<(), ApiError> {
        self.check_at(key, Instant::now()).await
    }

    /// Decide admit/reject at an explicit evaluation instant.
    ///
    /// The boundary is inclusive of the maximum: with exactly `max_requests`
    /// timestamps already in the window the request is rejected, so the
    /// `max_requests`-th admission is the last one the window allows.
    pub async fn check_at(&self, key: &str, now: Instant) -> Result<(), ApiError> {
        let mut windows = self.windows.lock().await;
        let log = windows.entry(key.to_string()).or_default();

        Self::prune(log, now, self.window);

        if log.len() >= self.max_requests {
            return Err(ApiError::RateLimited {
                limit: self.max_requests,
                window_secs: self.window.as_secs(),
            });
        }

        log.push_back(now);
        Ok(())
    }

    /// Drop client entries whose every timestamp has aged out of the window.
    pub async fn evict_idle(&self) {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        windows.retain(|_, log| {
            Self::prune(log, now, self.window);
            !log.is_empty()
        });
    }

    /// Number of tracked client entries
    pub async fn tracked_clients(&self) -> usize {
        self.windows.lock().await.len()
    }

    fn prune(log: &mut VecDeque<Instant>, now: Instant, window: Duration) {
        while let Some(&oldest) = log.front() {
            if now.duration_since(oldest) > window {
                log.pop_front();
            } else {
                break;
            }
        }
    }
}

/// Spawn the periodic eviction task for idle client entries.
pub fn spawn_eviction(limiter: SlidingWindow, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately; skip it.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            limiter.evict_idle().await;
        }
    });
}

/// Create rate limiting middleware layer
pub fn rate_limit_layer(
    limiter: SlidingWindow,
) -> impl Fn(
    Request<Body>,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Response> + Send>>
       + Clone
       + Send {
    move |request: Request<Body>, next: Next| {
        let limiter = limiter.clone();
        Box::pin(async move {
            let client_key = client_ip(&request);

            if let Err(err) = limiter.check(&client_key).await {
                tracing::warn!(client = %client_key, "rate limit exceeded");
                return err.into_response();
            }

            next.run(request).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max: usize, window_secs: u64) -> SlidingWindow {
        SlidingWindow::new(max, Duration::from_secs(window_secs))
    }

    #[tokio::test]
    async fn test_admits_up_to_maximum() {
        let limiter = limiter(3, 60);
        let t0 = Instant::now();

        assert!(limiter.check_at("client", t0).await.is_ok());
        assert!(limiter.check_at("client", t0 + Duration::from_secs(1)).await.is_ok());
        assert!(limiter.check_at("client", t0 + Duration::from_secs(2)).await.is_ok());

        let rejected = limiter.check_at("client", t0 + Duration::from_secs(3)).await;
        assert!(matches!(
            rejected,
            Err(ApiError::RateLimited { limit: 3, window_secs: 60 })
        ));
    }

    #[tokio::test]
    async fn test_window_slides() {
        let limiter = limiter(2, 60);
        let t0 = Instant::now();

        assert!(limiter.check_at("client", t0).await.is_ok());
        assert!(limiter.check_at("client", t0 + Duration::from_secs(30)).await.is_ok());
        assert!(limiter.check_at("client", t0 + Duration::from_secs(40)).await.is_err());

        // At t0+61 the first admission has aged out.
        assert!(limiter.check_at("client", t0 + Duration::from_secs(61)).await.is_ok());
    }

    #[tokio::test]
    async fn test_rejected_attempts_not_recorded() {
        let limiter = limiter(1, 60);
        let t0 = Instant::now();

        assert!(limiter.check_at("client", t0).await.is_ok());
        for i in 1..10 {
            assert!(limiter.check_at("client", t0 + Duration::from_secs(i)).await.is_err());
        }

        // Only the single admitted timestamp ages out; the rejections left
        // no trace, so the next attempt after the window is admitted.
        assert!(limiter.check_at("client", t0 + Duration::from_secs(61)).await.is_ok());
    }

    #[tokio::test]
    async fn test_sliding_window_invariant() {
        // No trailing window of the configured duration ever contains more
        // than the maximum number of admissions.
        let limiter = limiter(5, 10);
        let t0 = Instant::now();
        let mut admitted: Vec<Duration> = Vec::new();

        for tick in 0..120u64 {
            let offset = Duration::from_millis(tick * 500);
            if limiter.check_at("client", t0 + offset).await.is_ok() {
                admitted.push(offset);
            }
        }

        for &end in &admitted {
            let start = end.saturating_sub(Duration::from_secs(10));
            let in_window = admitted
                .iter()
                .filter(|&&t| t >= start && t <= end)
                .count();
            assert!(in_window <= 5, "window ending at {:?} held {}", end, in_window);
        }
    }

    #[tokio::test]
    async fn test_clients_are_independent() {
        let limiter = limiter(1, 60);
        let t0 = Instant::now();

        assert!(limiter.check_at("client-a", t0).await.is_ok());
        assert!(limiter.check_at("client-b", t0).await.is_ok());
        assert!(limiter.check_at("client-a", t0).await.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_admissions_never_exceed_maximum() {
        let limiter = limiter(5, 60);

        let mut handles = Vec::new();
        for _ in 0..50 {
            let limiter = limiter.clone();
            handles.push(tokio::spawn(async move {
                limiter.check("hot-client").await.is_ok()
            }));
        }

        let mut admitted = 0;
        for handle in handles {
            if handle.await.expect("task panicked") {
                admitted += 1;
            }
        }

        assert_eq!(admitted, 5);
    }

    #[tokio::test]
    async fn test_eviction_removes_idle_clients() {
        let limiter = limiter(10, 0);

        assert!(limiter.check("short-lived").await.is_ok());
        assert_eq!(limiter.tracked_clients().await, 1);

        // With a zero-length window every entry is instantly stale.
        tokio::time::sleep(Duration::from_millis(5)).await;
        limiter.evict_idle().await;
        assert_eq!(limiter.tracked_clients().await, 0);
    }
}
