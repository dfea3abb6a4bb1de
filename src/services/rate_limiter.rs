//! Per-source rate limiting
//!
//! One limiter instance is shared by every concurrent fetch task. The
//! last-call table is keyed by source name and guarded by a single
//! mutex that stays held across the sleep: check, wait, and record are
//! one atomic sequence, so two near-simultaneous callers of the same
//! source can never both observe "no wait needed".

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

pub struct RateLimiter {
    last_request: Mutex<HashMap<String, Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(HashMap::new()),
            min_interval,
        }
    }

    /// Wait until at least `min_interval` has passed since the previous
    /// call for `source_name`, then record this call.
    pub async fn throttle(&self, source_name: &str) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = last.get(source_name) {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!(source = source_name, "Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        last.insert(source_name.to_string(), Instant::now());
    }
}
