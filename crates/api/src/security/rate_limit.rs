//! Contact-endpoint rate limiter.
//!
//! Fixed window per IP+email composite, so one IP cycling through emails is
//! tracked separately from one email being hammered from one IP. Defaults to
//! 3 requests per hour.

use std::sync::Arc;
use std::time::Duration;

use leadgate_core::store::{KvStore, StoreError, WindowDecision};

#[derive(Clone)]
pub struct ContactRateLimiter {
    store: Arc<dyn KvStore>,
    limit: u32,
    window: Duration,
}

fn identifier(ip: &str, email: Option<&str>) -> String {
    match email.map(|e| e.trim().to_lowercase()).filter(|e| !e.is_empty()) {
        Some(email) => format!("rl:contact:{ip}:{email}"),
        None => format!("rl:contact:{ip}"),
    }
}

impl ContactRateLimiter {
    pub fn new(store: Arc<dyn KvStore>, limit: u32, window: Duration) -> Self {
        Self {
            store,
            limit,
            window,
        }
    }

    pub async fn check(&self, ip: &str, email: Option<&str>) -> Result<WindowDecision, StoreError> {
        self.store
            .fixed_window_hit(&identifier(ip, email), self.limit, self.window)
            .await
    }
}
