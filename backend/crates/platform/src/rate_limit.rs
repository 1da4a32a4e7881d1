//! Rate Limiting Infrastructure
//!
//! Fixed-window admission control. Counters are process-local: a
//! multi-instance deployment gets per-instance quotas, not a global one.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Purge stale windows every N checks to bound memory
const PURGE_INTERVAL: u32 = 1024;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    pub fn window_ms(&self) -> i64 {
        self.window.as_millis() as i64
    }
}

/// Rate limit check result
#[derive(Debug, Clone)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_at_ms: i64,
}

impl RateLimitResult {
    /// Seconds until the window resets, rounded up, never negative
    pub fn retry_after_secs(&self, now_ms: i64) -> i64 {
        ((self.reset_at_ms - now_ms).max(0) + 999) / 1000
    }
}

// ============================================================================
// In-memory fixed-window limiter
// ============================================================================

#[derive(Debug)]
struct WindowSlot {
    window_start_ms: i64,
    /// Window length this slot was opened under. The limiter is shared by
    /// callers with different windows, so purging must honor each slot's
    /// own length rather than the current caller's.
    window_ms: i64,
    count: u32,
}

#[derive(Debug, Default)]
struct LimiterState {
    windows: HashMap<String, WindowSlot>,
    checks_since_purge: u32,
}

/// Process-local fixed-window counter set
///
/// A rejected request does not consume quota; the counter resets only at the
/// window boundary (no token-bucket smoothing).
#[derive(Debug, Default)]
pub struct FixedWindowLimiter {
    state: Mutex<LimiterState>,
}

impl FixedWindowLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check the counter for `key` against the current wall clock
    pub fn check(&self, key: &str, config: &RateLimitConfig) -> RateLimitResult {
        self.check_at(key, config, now_epoch_ms())
    }

    /// Check the counter for `key` at a supplied clock (deterministic tests)
    pub fn check_at(&self, key: &str, config: &RateLimitConfig, now_ms: i64) -> RateLimitResult {
        let window_ms = config.window_ms();
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        state.checks_since_purge += 1;
        if state.checks_since_purge >= PURGE_INTERVAL {
            state.checks_since_purge = 0;
            state
                .windows
                .retain(|_, slot| now_ms - slot.window_start_ms < slot.window_ms);
        }

        let slot = state
            .windows
            .entry(key.to_string())
            .or_insert(WindowSlot {
                window_start_ms: now_ms,
                window_ms,
                count: 0,
            });

        // Hard reset at the window boundary
        if now_ms - slot.window_start_ms >= window_ms {
            slot.window_start_ms = now_ms;
            slot.window_ms = window_ms;
            slot.count = 0;
        }

        let reset_at_ms = slot.window_start_ms + window_ms;

        if slot.count >= config.max_requests {
            // Rejected requests leave the counter untouched
            return RateLimitResult {
                allowed: false,
                limit: config.max_requests,
                remaining: 0,
                reset_at_ms,
            };
        }

        slot.count += 1;

        RateLimitResult {
            allowed: true,
            limit: config.max_requests,
            remaining: config.max_requests - slot.count,
            reset_at_ms,
        }
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
