//! Shared application state
//!
//! Everything the guard chain needs is constructed once at startup and
//! injected here; no guard captures ambient globals. The rate limiter and
//! the maintenance flag are the only pieces of state shared across
//! concurrent requests.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::audit::AuditSink;
use crate::config::Config;
use crate::middleware::SlidingWindow;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub rate_limiter: SlidingWindow,
    pub audit: AuditSink,
    /// Runtime maintenance switch, toggled by the admin endpoints.
    pub maintenance: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(config: Config, audit: AuditSink) -> Self {
        let rate_limiter =
            SlidingWindow::new(config.rate_limit_requests, config.rate_limit_window());
        let maintenance = Arc::new(AtomicBool::new(config.maintenance_mode));

        AppState {
            config: Arc::new(config),
            rate_limiter,
            audit,
            maintenance,
        }
    }
}
