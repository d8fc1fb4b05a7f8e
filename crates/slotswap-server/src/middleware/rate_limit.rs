use std::hash::Hash;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Fixed-window rate limiter keyed by caller identity.
pub struct RateLimiter<K> {
    /// Map from key to (window_start, request_count)
    requests: DashMap<K, (Instant, u32)>,
    /// Maximum requests per window
    max_requests: u32,
    window: Duration,
}

impl<K: Eq + Hash> RateLimiter<K> {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            requests: DashMap::new(),
            max_requests,
            window,
        }
    }

    /// Check if a request from this caller is allowed.
    /// Returns Ok(()) if allowed, Err(remaining_wait_time) if rate limited.
    pub fn check(&self, key: K) -> Result<(), Duration> {
        let now = Instant::now();

        let mut entry = self.requests.entry(key).or_insert((now, 0));
        let (window_start, count) = entry.value_mut();

        // Reset if window has passed
        if now.duration_since(*window_start) >= self.window {
            *window_start = now;
            *count = 1;
            return Ok(());
        }

        if *count >= self.max_requests {
            return Err(self.window - now.duration_since(*window_start));
        }

        *count += 1;
        Ok(())
    }

    /// Drop callers idle for more than two windows.
    pub fn cleanup(&self) {
        let now = Instant::now();
        self.requests
            .retain(|_, (window_start, _)| now.duration_since(*window_start) < self.window * 2);
    }

    pub fn tracked(&self) -> usize {
        self.requests.len()
    }
}
