use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use loancore_api::{LoanCoreError, LoanCoreResult};

struct Window {
    started_at: Instant,
    count: u32,
}

/// Fixed-window rate limiter, one window per key (e.g. per login email or
/// per client IP). A key's window resets the first time it is touched
/// after `window` has elapsed since the previous reset, rather than on a
/// rolling basis — simpler to reason about and adequate for throttling
/// login attempts.
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Records one attempt for `key`. Returns `Ok(())` if it is within the
    /// limit, or `LoanCoreError::RateLimited` carrying the remaining
    /// seconds until the window resets.
    pub fn check(&self, key: &str) -> LoanCoreResult<()> {
        let now = Instant::now();
        let mut windows = self.windows.lock().expect("rate limiter mutex poisoned");
        let entry = windows.entry(key.to_string()).or_insert_with(|| Window {
            started_at: now,
            count: 0,
        });

        if now.duration_since(entry.started_at) >= self.window {
            entry.started_at = now;
            entry.count = 0;
        }

        entry.count += 1;
        if entry.count > self.max_requests {
            let elapsed = now.duration_since(entry.started_at);
            let retry_after_secs = self.window.saturating_sub(elapsed).as_secs().max(1);
            return Err(LoanCoreError::RateLimited { retry_after_secs });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_requests_up_to_the_limit() {
        let limiter = RateLimiter::new(5, Duration::from_secs(300));
        for _ in 0..5 {
            assert!(limiter.check("alice@example.com").is_ok());
        }
    }

    #[test]
    fn rejects_the_request_past_the_limit() {
        let limiter = RateLimiter::new(5, Duration::from_secs(300));
        for _ in 0..5 {
            limiter.check("alice@example.com").unwrap();
        }
        let err = limiter.check("alice@example.com").unwrap_err();
        assert!(matches!(err, LoanCoreError::RateLimited { .. }));
    }

    #[test]
    fn tracks_each_key_independently() {
        let limiter = RateLimiter::new(1, Duration::from_secs(300));
        assert!(limiter.check("alice@example.com").is_ok());
        assert!(limiter.check("bob@example.com").is_ok());
    }
}
