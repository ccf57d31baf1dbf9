use dashmap::DashMap;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

// Sliding-window rate limiter - tracks request timestamps per sender
//
// A trailing window avoids the burst-at-boundary problem of fixed
// buckets (quota requests at 0:59 plus quota more at 1:01 would both
// pass a fixed counter). Timestamps are appended in non-decreasing
// order, so evicting from the front always removes the oldest first.
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    calls: DashMap<String, VecDeque<Instant>>,
}

impl RateLimiter {
    // Production window is one minute
    pub fn new(max_requests_per_minute: usize) -> Self {
        Self::with_window(max_requests_per_minute, Duration::from_secs(60))
    }

    // Window injectable so tests don't have to wait out 60 seconds
    pub fn with_window(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            calls: DashMap::new(),
        }
    }

    // Admit or deny a request for this key at the current time.
    // Denied attempts are not recorded - rejections consume no quota.
    pub fn is_allowed(&self, key: &str) -> bool {
        let now = Instant::now();

        // entry() holds the shard lock, serializing racing calls on one key
        let mut window = self.calls.entry(key.to_string()).or_default();
        Self::evict_expired(&mut window, now, self.window);

        if window.len() >= self.max_requests {
            return false;
        }

        window.push_back(now);
        true
    }

    // Slots left for this key right now. Evicts stale entries but
    // never appends. Unknown key has the full quota.
    pub fn remaining(&self, key: &str) -> usize {
        let now = Instant::now();

        let Some(mut window) = self.calls.get_mut(key) else {
            return self.max_requests;
        };
        Self::evict_expired(&mut window, now, self.window);

        self.max_requests.saturating_sub(window.len())
    }

    // Drop everything older than the trailing window. checked_sub can
    // underflow very early in process life; skip eviction rather than panic.
    fn evict_expired(window: &mut VecDeque<Instant>, now: Instant, span: Duration) {
        let Some(cutoff) = now.checked_sub(span) else {
            return;
        };
        while window.front().is_some_and(|&t| t < cutoff) {
            window.pop_front();
        }
    }
}
