//! Process-wide token-bucket rate limiter.
//!
//! One bucket is shared by every client and route. A noisy client can
//! drain it for everyone.

use std::sync::{Mutex, PoisonError};
use std::time::Instant;

/// Token bucket with capacity `burst`, refilling at `rate` tokens per second.
#[derive(Debug)]
pub struct RateLimiter {
    rate: f64,
    burst: u32,
    bucket: Mutex<Bucket>,
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl Bucket {
    fn refill(&mut self, now: Instant, rate: f64, burst: f64) {
        // Instants earlier than the last refill add nothing.
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        if elapsed > 0.0 {
            self.tokens = (self.tokens + elapsed * rate).min(burst);
            self.last_refill = now;
        }
    }
}

impl RateLimiter {
    /// Create a full bucket.
    pub fn new(rate: f64, burst: u32) -> Self {
        Self::new_at(rate, burst, Instant::now())
    }

    /// Create a full bucket whose refill clock starts at `now`.
    pub fn new_at(rate: f64, burst: u32, now: Instant) -> Self {
        Self {
            rate,
            burst,
            bucket: Mutex::new(Bucket {
                tokens: f64::from(burst),
                last_refill: now,
            }),
        }
    }

    /// Refill rate in tokens per second.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Bucket capacity.
    pub fn burst(&self) -> u32 {
        self.burst
    }

    /// Take one token if available.
    pub fn allow(&self) -> bool {
        self.allow_at(Instant::now())
    }

    /// Take one token if available, treating `now` as the current time.
    ///
    /// Refill, check and consume happen under a single lock acquisition.
    pub fn allow_at(&self, now: Instant) -> bool {
        let mut bucket = self.bucket.lock().unwrap_or_else(PoisonError::into_inner);
        bucket.refill(now, self.rate, f64::from(self.burst));
        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Tokens available at `now`, after refilling.
    pub fn available_at(&self, now: Instant) -> f64 {
        let mut bucket = self.bucket.lock().unwrap_or_else(PoisonError::into_inner);
        bucket.refill(now, self.rate, f64::from(self.burst));
        bucket.tokens
    }
}
